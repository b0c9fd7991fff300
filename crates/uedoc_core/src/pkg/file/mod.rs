use std::fs;
use std::path::Path;

use crate::pkg::bytes::Cursor;
use crate::pkg::decode::decode_export;
use crate::pkg::{DecodeOptions, FieldSet, PackageSummary, PackageTables, Result};

/// Extension of the overflow file holding export data.
pub const BULK_EXTENSION: &str = "uexp";

/// One package held fully in memory: summary, tables, and raw bytes.
#[derive(Debug, Clone)]
pub struct PackageFile {
	/// Parsed summary.
	pub summary: PackageSummary,
	/// Parsed name, export, and import tables.
	pub tables: PackageTables,
	bytes: Vec<u8>,
	bulk_start: Option<usize>,
}

impl PackageFile {
	/// Read a package from disk, appending a sibling `.uexp` when present.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let primary = fs::read(path)?;

		let is_package = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| ext.eq_ignore_ascii_case("uasset") || ext.eq_ignore_ascii_case("umap"));
		let bulk_path = path.with_extension(BULK_EXTENSION);
		let bulk = if is_package && bulk_path.is_file() { Some(fs::read(&bulk_path)?) } else { None };

		log::debug!(
			"open {} ({} bytes{})",
			path.display(),
			primary.len(),
			bulk.as_ref().map(|bytes| format!(" + {} overflow", bytes.len())).unwrap_or_default()
		);
		Self::from_parts(primary, bulk)
	}

	/// Parse a package from one contiguous buffer.
	pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
		Self::from_parts(bytes, None)
	}

	/// Parse a package from primary bytes plus optional overflow bytes appended after them.
	pub fn from_parts(mut primary: Vec<u8>, bulk: Option<Vec<u8>>) -> Result<Self> {
		let bulk_start = bulk.map(|bulk| {
			let start = primary.len();
			primary.extend_from_slice(&bulk);
			start
		});

		let mut cursor = Cursor::with_bulk_start(&primary, bulk_start);
		let summary = PackageSummary::parse(&mut cursor)?;
		let tables = PackageTables::parse(&mut cursor, &summary)?;

		Ok(Self {
			summary,
			tables,
			bytes: primary,
			bulk_start,
		})
	}

	/// Logical bytes (primary followed by overflow).
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Logical offset where overflow bytes begin, if any were appended.
	pub fn bulk_start(&self) -> Option<usize> {
		self.bulk_start
	}

	/// Cursor over the logical bytes positioned at `pos`.
	pub fn cursor_at(&self, pos: usize) -> Result<Cursor<'_>> {
		let mut cursor = Cursor::with_bulk_start(&self.bytes, self.bulk_start);
		cursor.seek(pos)?;
		Ok(cursor)
	}

	/// Decode the field list of export `slot`.
	pub fn decode_export(&self, slot: usize, opt: &DecodeOptions) -> Result<FieldSet> {
		let mut cursor = self.cursor_at(0)?;
		decode_export(&mut cursor, &self.tables, slot, opt)
	}
}
