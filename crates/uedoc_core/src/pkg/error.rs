use thiserror::Error;

use crate::pkg::SourceOffset;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Errors produced while reading, decoding, and resolving package data.
#[derive(Debug, Error)]
pub enum PackageError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Leading package tag did not match the package file magic.
	#[error("not a package file (magic=0x{magic:08X})")]
	InvalidMagic {
		/// First four bytes read as a little-endian `u32`.
		magic: u32,
	},
	/// Legacy file version outside the supported range.
	#[error("unsupported legacy file version {legacy_version}")]
	UnsupportedVersion {
		/// Parsed legacy file version discriminant.
		legacy_version: i32,
	},
	/// Not enough bytes remained for a requested read.
	#[error("truncated data at {at}: need {need} bytes, remaining {rem}")]
	TruncatedData {
		/// Offset where the read was attempted.
		at: SourceOffset,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Table index outside the table bounds.
	#[error("{kind} index out of range: idx={index}, valid=0..{len}")]
	IndexOutOfRange {
		/// Logical table being indexed.
		kind: &'static str,
		/// Offending index value.
		index: i64,
		/// Number of entries in the table.
		len: usize,
	},
	/// Disambiguated field name already present in a field set.
	#[error("duplicate field {name}")]
	DuplicateField {
		/// Final field key that collided.
		name: String,
	},
	/// Reference target could not be located or opened.
	#[error("unresolved reference: {path}")]
	UnresolvedReference {
		/// Full name of the referenced object.
		path: String,
	},
	/// Property type tag without a decoder.
	#[error("unhandled property type {type_name} at {at}")]
	UnhandledPropertyType {
		/// Raw type name from the tag.
		type_name: String,
		/// Offset of the value start.
		at: SourceOffset,
	},
	/// Outer chain did not terminate within the table size.
	#[error("outer chain of object {index} does not terminate")]
	OuterChainCycle {
		/// Object index whose chain was walked.
		index: i32,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Decoded bytes did not end at the declared end offset.
	#[error("layout mismatch in {context}: expected end {expected}, got {actual}")]
	LayoutMismatch {
		/// Property or export being decoded.
		context: String,
		/// Declared end offset.
		expected: SourceOffset,
		/// Actual cursor offset.
		actual: SourceOffset,
	},
	/// Requested export name does not exist in the package.
	#[error("export not found: {name}")]
	ExportNotFound {
		/// Requested export name.
		name: String,
	},
}
