use crate::pkg::bytes::Cursor;
use crate::pkg::{Guid, NameTable, Result};

/// Field-list terminator name.
pub const NONE_NAME: &str = "None";

/// Type-specific data carried by a property tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagData {
	/// No extra fields.
	None,
	/// `StructProperty`: struct type name and struct guid.
	Struct {
		/// Struct type name (empty for synthetic container tags).
		struct_name: String,
		/// Struct guid.
		guid: Guid,
	},
	/// `BoolProperty`: value stored in the tag.
	Bool(bool),
	/// `ByteProperty` / `EnumProperty`: enum type name (`"None"` for plain bytes).
	Enum(String),
	/// `ArrayProperty` / `SetProperty`: element type name.
	Inner(String),
	/// `MapProperty`: key and value type names.
	Map {
		/// Key type name.
		key: String,
		/// Value type name.
		value: String,
	},
}

/// Header preceding one serialized property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTag {
	/// Property name.
	pub name: String,
	/// Property type name, e.g. `IntProperty`.
	pub type_name: String,
	/// Declared value size in bytes.
	pub size: u32,
	/// Static array index.
	pub array_index: u32,
	/// Type-specific fields.
	pub data: TagData,
	/// Property guid when present.
	pub guid: Option<Guid>,
	/// Built for a container element rather than read from the stream.
	pub synthetic: bool,
}

impl PropertyTag {
	/// Read one tag; returns `None` on the field-list terminator.
	pub fn read(cursor: &mut Cursor<'_>, names: &NameTable) -> Result<Option<Self>> {
		let name = names.read(cursor)?;
		if name == NONE_NAME {
			return Ok(None);
		}

		let type_name = names.read(cursor)?;
		let size = cursor.read_u32()?;
		let array_index = cursor.read_u32()?;

		let data = match type_name.as_str() {
			"StructProperty" => TagData::Struct {
				struct_name: names.read(cursor)?,
				guid: cursor.read_guid()?,
			},
			"BoolProperty" => TagData::Bool(cursor.read_bool()?),
			"ByteProperty" | "EnumProperty" => TagData::Enum(names.read(cursor)?),
			"ArrayProperty" | "SetProperty" => TagData::Inner(names.read(cursor)?),
			"MapProperty" => TagData::Map {
				key: names.read(cursor)?,
				value: names.read(cursor)?,
			},
			_ => TagData::None,
		};

		let guid = if cursor.read_bool()? { Some(cursor.read_guid()?) } else { None };

		Ok(Some(Self {
			name,
			type_name,
			size,
			array_index,
			data,
			guid,
			synthetic: false,
		}))
	}

	/// Tag for a tagless container element of `type_name`.
	///
	/// Struct elements get an empty struct name and decode as a tagged field list.
	pub fn synthetic(name: &str, type_name: &str) -> Self {
		let data = match type_name {
			"StructProperty" => TagData::Struct {
				struct_name: String::new(),
				guid: Guid::default(),
			},
			_ => TagData::None,
		};
		Self {
			name: name.to_owned(),
			type_name: type_name.to_owned(),
			size: 0,
			array_index: 0,
			data,
			guid: None,
			synthetic: true,
		}
	}

	/// Struct type name for `StructProperty` tags.
	pub fn struct_name(&self) -> Option<&str> {
		match &self.data {
			TagData::Struct { struct_name, .. } => Some(struct_name),
			_ => None,
		}
	}

	/// Enum type name, ignoring the `"None"` placeholder written for plain bytes.
	pub fn enum_name(&self) -> Option<&str> {
		match &self.data {
			TagData::Enum(name) if name != NONE_NAME => Some(name),
			_ => None,
		}
	}

	/// Element type for arrays and sets.
	pub fn inner_type(&self) -> Option<&str> {
		match &self.data {
			TagData::Inner(inner) => Some(inner),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use uedoc_testkit::{Names, PropertyWriter, TagData as WriteTag};

	use super::{PropertyTag, TagData};
	use crate::pkg::bytes::Cursor;
	use crate::pkg::{NameEntry, NameTable};

	fn table(names: &Names) -> NameTable {
		NameTable::new(
			names
				.entries()
				.iter()
				.map(|name| NameEntry {
					name: name.clone(),
					non_case_preserving_hash: 0,
					case_preserving_hash: 0,
				})
				.collect(),
		)
	}

	#[test]
	fn reads_type_specific_fields() {
		let mut names = Names::default();
		let mut w = PropertyWriter::new(&mut names);
		w.raw_tag("Location", "StructProperty", 12, 0, WriteTag::Struct("Vector"));
		w.raw_tag("bHidden", "BoolProperty", 0, 0, WriteTag::Bool(true));
		w.raw_tag("Tags", "MapProperty", 4, 2, WriteTag::Map("NameProperty", "IntProperty"));
		w.none();
		let bytes = w.finish();
		let names = table(&names);

		let mut cursor = Cursor::new(&bytes);
		let location = PropertyTag::read(&mut cursor, &names).expect("tag reads").expect("not terminator");
		assert_eq!(location.struct_name(), Some("Vector"));
		assert_eq!(location.size, 12);

		let hidden = PropertyTag::read(&mut cursor, &names).expect("tag reads").expect("not terminator");
		assert_eq!(hidden.data, TagData::Bool(true));
		assert_eq!(hidden.size, 0);

		let tags = PropertyTag::read(&mut cursor, &names).expect("tag reads").expect("not terminator");
		assert_eq!(tags.array_index, 2);
		assert!(matches!(&tags.data, TagData::Map { key, value } if key == "NameProperty" && value == "IntProperty"));
		assert!(tags.guid.is_none());

		assert!(PropertyTag::read(&mut cursor, &names).expect("terminator reads").is_none());
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn reads_optional_property_guid() {
		let mut names = Names::default();
		let mut w = PropertyWriter::new(&mut names);
		w.raw_name("Count").raw_name("IntProperty").raw_u32(4).raw_u32(0);
		w.raw_u8(1).raw_bytes(&[0xAB; 16]);
		let bytes = w.finish();
		let names = table(&names);

		let mut cursor = Cursor::new(&bytes);
		let tag = PropertyTag::read(&mut cursor, &names).expect("tag reads").expect("not terminator");
		assert!(tag.guid.is_some_and(|guid| !guid.is_zero()));
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn synthetic_struct_tag_has_empty_struct_name() {
		let tag = PropertyTag::synthetic("Key", "StructProperty");
		assert!(tag.synthetic);
		assert_eq!(tag.struct_name(), Some(""));
		assert_eq!(PropertyTag::synthetic("Key", "ByteProperty").enum_name(), None);
	}
}
