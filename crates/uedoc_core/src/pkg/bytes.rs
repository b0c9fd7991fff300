use std::fmt;

use crate::pkg::{PackageError, Result};

/// Physical file an offset falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFile {
	/// Primary header file (`.uasset` / `.umap`).
	Primary,
	/// Appended overflow file (`.uexp`).
	Bulk,
}

impl SourceFile {
	/// Stable lowercase label used in diagnostics.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Primary => "uasset",
			Self::Bulk => "uexp",
		}
	}
}

/// Offset attributed to the physical file it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOffset {
	/// File the offset falls in.
	pub file: SourceFile,
	/// Offset relative to the start of that file.
	pub offset: usize,
}

impl SourceOffset {
	/// Attribute a logical offset given the optional start of appended bulk bytes.
	pub fn locate(pos: usize, bulk_start: Option<usize>) -> Self {
		match bulk_start {
			Some(start) if pos >= start => Self {
				file: SourceFile::Bulk,
				offset: pos - start,
			},
			_ => Self {
				file: SourceFile::Primary,
				offset: pos,
			},
		}
	}
}

impl fmt::Display for SourceOffset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{:08X}", self.file.as_str(), self.offset)
	}
}

/// 128-bit engine guid stored as four little-endian words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Guid(pub [u32; 4]);

impl Guid {
	/// Whether all words are zero.
	pub fn is_zero(&self) -> bool {
		self.0 == [0; 4]
	}
}

impl fmt::Display for Guid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let [a, b, c, d] = self.0;
		write!(f, "{a:08X}-{b:08X}-{c:08X}-{d:08X}")
	}
}

/// Bounded little-endian cursor over an immutable byte slice.
#[derive(Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	bulk_start: Option<usize>,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes,
			pos: 0,
			bulk_start: None,
		}
	}

	/// Create a cursor whose offsets past `bulk_start` are attributed to the overflow file.
	pub fn with_bulk_start(bytes: &'a [u8], bulk_start: Option<usize>) -> Self {
		Self { bytes, pos: 0, bulk_start }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return current offset labeled by physical file.
	pub fn offset(&self) -> SourceOffset {
		self.locate(self.pos)
	}

	/// Label an arbitrary logical offset of this buffer.
	pub fn locate(&self, pos: usize) -> SourceOffset {
		SourceOffset::locate(pos, self.bulk_start)
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to an absolute position inside the buffer.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(PackageError::TruncatedData {
				at: self.locate(self.bytes.len()),
				need: pos - self.bytes.len(),
				rem: 0,
			});
		}
		self.pos = pos;
		Ok(())
	}

	/// Advance by `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		let _ = self.read_exact(n)?;
		Ok(())
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(PackageError::TruncatedData {
				at: self.offset(),
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read one signed byte.
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(i8::from_le_bytes(self.read_array()?))
	}

	/// Read a one-byte boolean (any non-zero value is true).
	pub fn read_bool(&mut self) -> Result<bool> {
		Ok(self.read_u8()? != 0)
	}

	/// Read a little-endian `u16`.
	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i16`.
	pub fn read_i16(&mut self) -> Result<i16> {
		Ok(i16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64(&mut self) -> Result<u64> {
		Ok(u64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i64`.
	pub fn read_i64(&mut self) -> Result<i64> {
		Ok(i64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `f32`.
	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(f32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `f64`.
	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.read_array()?))
	}

	/// Read a 16-byte guid.
	pub fn read_guid(&mut self) -> Result<Guid> {
		Ok(Guid([self.read_u32()?, self.read_u32()?, self.read_u32()?, self.read_u32()?]))
	}

	/// Read a length-prefixed engine string.
	///
	/// A positive length selects single-byte units, a negative one UTF-16 units;
	/// the trailing terminator is dropped in both cases.
	pub fn read_fstring(&mut self) -> Result<String> {
		let len = self.read_i32()?;
		if len >= 0 {
			let raw = self.read_exact(len as usize)?;
			let raw = raw.strip_suffix(&[0]).unwrap_or(raw);
			return Ok(String::from_utf8_lossy(raw).into_owned());
		}

		let units = len.unsigned_abs() as usize;
		let need = units.checked_mul(2).ok_or(PackageError::TruncatedData {
			at: self.offset(),
			need: usize::MAX,
			rem: self.remaining(),
		})?;
		let raw = self.read_exact(need)?;
		let mut wide: Vec<u16> = raw.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();
		if wide.last() == Some(&0) {
			wide.pop();
		}
		Ok(char::decode_utf16(wide).filter_map(|unit| unit.ok()).collect())
	}
}

#[cfg(test)]
mod tests {
	use crate::pkg::{Cursor, PackageError, SourceFile, SourceOffset};

	#[test]
	fn reads_little_endian_scalars() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&0x1234_u16.to_le_bytes());
		bytes.extend_from_slice(&(-7_i32).to_le_bytes());
		bytes.extend_from_slice(&1.5_f32.to_le_bytes());
		bytes.extend_from_slice(&u64::MAX.to_le_bytes());
		bytes.push(2);

		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_u16().expect("u16"), 0x1234);
		assert_eq!(cursor.read_i32().expect("i32"), -7);
		assert_eq!(cursor.read_f32().expect("f32"), 1.5);
		assert_eq!(cursor.read_u64().expect("u64"), u64::MAX);
		assert!(cursor.read_bool().expect("bool"));
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn reads_narrow_and_wide_strings() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&6_i32.to_le_bytes());
		bytes.extend_from_slice(b"Hello\0");
		bytes.extend_from_slice(&(-3_i32).to_le_bytes());
		for unit in [0x00E9_u16, 0x0041, 0] {
			bytes.extend_from_slice(&unit.to_le_bytes());
		}
		bytes.extend_from_slice(&0_i32.to_le_bytes());

		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_fstring().expect("narrow"), "Hello");
		assert_eq!(cursor.read_fstring().expect("wide"), "\u{e9}A");
		assert_eq!(cursor.read_fstring().expect("empty"), "");
	}

	#[test]
	fn wide_string_drops_unpaired_surrogates() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&(-3_i32).to_le_bytes());
		for unit in [0xD800_u16, 0x0042, 0] {
			bytes.extend_from_slice(&unit.to_le_bytes());
		}

		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_fstring().expect("wide"), "B");
	}

	#[test]
	fn short_read_reports_bulk_offset() {
		let bytes = [0_u8; 10];
		let mut cursor = Cursor::with_bulk_start(&bytes, Some(4));
		cursor.seek(8).expect("seek inside buffer");
		let err = cursor.read_u32().expect_err("only two bytes remain");
		match err {
			PackageError::TruncatedData { at, need, rem } => {
				assert_eq!(
					at,
					SourceOffset {
						file: SourceFile::Bulk,
						offset: 4
					}
				);
				assert_eq!(at.to_string(), "uexp:00000004");
				assert_eq!(need, 4);
				assert_eq!(rem, 2);
			}
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn seek_past_end_fails() {
		let bytes = [0_u8; 3];
		let mut cursor = Cursor::new(&bytes);
		assert!(matches!(cursor.seek(4), Err(PackageError::TruncatedData { .. })));
		assert_eq!(cursor.offset().to_string(), "uasset:00000000");
	}
}
