use crate::pkg::{FieldSet, ObjectIndex};

/// Handle to a package registered in an [`crate::pkg::AssetManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub usize);

/// Handle to one export of a registered package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExportId {
	/// Owning package.
	pub package: PackageId,
	/// 0-based export slot.
	pub slot: usize,
}

/// Object reference as decoded, and after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectRef {
	/// Null reference.
	Null,
	/// Package-local index, not yet resolved.
	Index(ObjectIndex),
	/// Resolved export in the manager arena.
	Export(ExportId),
	/// Target could not be located; carries its full name.
	Unresolved(String),
}

/// Localized text history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextHistory {
	/// No history; optional culture-invariant string.
	None {
		/// Culture-invariant source string.
		culture_invariant: Option<String>,
	},
	/// Namespace + key + source string.
	Base {
		/// Localization namespace.
		namespace: String,
		/// Localization key.
		key: String,
		/// Source string.
		source: String,
	},
	/// String table entry.
	StringTable {
		/// String table id.
		table_id: String,
		/// Entry key.
		key: String,
	},
	/// History type without a decoder; payload skipped.
	Unsupported {
		/// Raw history type.
		history_type: i8,
	},
}

/// Decoded `TextProperty` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValue {
	/// Text flags.
	pub flags: i32,
	/// History payload.
	pub history: TextHistory,
}

impl TextValue {
	/// Best display string: source, invariant string, or table key.
	pub fn display(&self) -> Option<&str> {
		match &self.history {
			TextHistory::None { culture_invariant } => culture_invariant.as_deref(),
			TextHistory::Base { source, .. } => Some(source),
			TextHistory::StringTable { key, .. } => Some(key),
			TextHistory::Unsupported { .. } => None,
		}
	}
}

/// Soft reference stored as an asset path plus sub-object path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftObjectPath {
	/// Asset path name, e.g. `/Game/Weapons/Rifle.Rifle`.
	pub asset_path: String,
	/// Sub-object path inside the asset.
	pub sub_path: String,
}

/// Decoded `FieldPathProperty` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
	/// Path segments, innermost last.
	pub path: Vec<String>,
	/// Owning struct object.
	pub owner: ObjectRef,
}

/// Nested struct value.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
	/// Struct type name (empty for untyped container elements).
	pub type_name: String,
	/// Decoded by a fixed-layout decoder rather than from tagged fields.
	pub fixed: bool,
	/// Decoded fields.
	pub fields: FieldSet,
}

/// One map entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
	/// Entry key.
	pub key: Value,
	/// Entry value.
	pub value: Value,
}

/// Decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar.
	I64(i64),
	/// Unsigned integer scalar.
	U64(u64),
	/// 32-bit float scalar.
	F32(f32),
	/// 64-bit float scalar.
	F64(f64),
	/// String.
	Str(String),
	/// Name.
	Name(String),
	/// Enum symbol.
	Enum(String),
	/// Localized text.
	Text(TextValue),
	/// Nested struct.
	Struct(StructValue),
	/// Array or set elements in stream order.
	List(Vec<Value>),
	/// Map entries in stream order.
	Map(Vec<MapEntry>),
	/// Object reference.
	Object(ObjectRef),
	/// Soft object reference.
	SoftObject(SoftObjectPath),
	/// Field path.
	FieldPath(FieldPath),
	/// Struct whose payload was skipped by declared size.
	Skipped {
		/// Struct type name.
		struct_name: String,
	},
	/// Property type without a decoder; payload skipped.
	Unhandled {
		/// Raw property type name.
		type_name: String,
	},
}

impl Value {
	/// Boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Integer payload widened to `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::I64(value) => Some(*value),
			Self::U64(value) => i64::try_from(*value).ok(),
			_ => None,
		}
	}

	/// 32-bit float payload.
	pub fn as_f32(&self) -> Option<f32> {
		match self {
			Self::F32(value) => Some(*value),
			_ => None,
		}
	}

	/// String-like payload: string, name, or enum symbol.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(value) | Self::Name(value) | Self::Enum(value) => Some(value),
			_ => None,
		}
	}

	/// Name payload.
	pub fn as_name(&self) -> Option<&str> {
		match self {
			Self::Name(value) => Some(value),
			_ => None,
		}
	}

	/// Struct payload.
	pub fn as_struct(&self) -> Option<&StructValue> {
		match self {
			Self::Struct(value) => Some(value),
			_ => None,
		}
	}

	/// Fields of a struct payload.
	pub fn as_fields(&self) -> Option<&FieldSet> {
		self.as_struct().map(|value| &value.fields)
	}

	/// List payload.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Map payload.
	pub fn as_map(&self) -> Option<&[MapEntry]> {
		match self {
			Self::Map(entries) => Some(entries),
			_ => None,
		}
	}

	/// Object reference payload.
	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Self::Object(reference) => Some(reference),
			_ => None,
		}
	}

	/// Map value whose string-like key equals `key`.
	pub fn map_get(&self, key: &str) -> Option<&Value> {
		self.as_map()?
			.iter()
			.find(|entry| entry.key.as_str() == Some(key))
			.map(|entry| &entry.value)
	}
}
