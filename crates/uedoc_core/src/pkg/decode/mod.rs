use crate::pkg::bytes::Cursor;
use crate::pkg::structs::{self, StructLayout};
use crate::pkg::tag::{PropertyTag, TagData};
use crate::pkg::{
	FieldPath, FieldSet, MapEntry, NameTable, ObjectIndex, ObjectRef, PackageError, PackageTables, RawField, Result, SoftObjectPath,
	StructValue, TextHistory, TextValue, Value,
};

/// Runtime limits and behavior switches for property decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
	/// Maximum nested field-list depth.
	pub max_depth: u32,
	/// Fail on layout mismatches and unknown property types instead of recovering.
	pub strict: bool,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self { max_depth: 32, strict: false }
	}
}

impl DecodeOptions {
	/// Preset that turns every recoverable decode problem into an error.
	pub fn strict() -> Self {
		Self {
			strict: true,
			..Self::default()
		}
	}
}

/// Class whose exports carry a row map after their field list.
const DATA_TABLE_CLASS: &str = "DataTable";
/// Field holding decoded data table rows.
pub const ROW_MAP_FIELD: &str = "RowMap";

/// Decode the field list of export `slot`.
///
/// The cursor must span the whole logical package (primary plus overflow bytes).
pub fn decode_export(cursor: &mut Cursor<'_>, tables: &PackageTables, slot: usize, opt: &DecodeOptions) -> Result<FieldSet> {
	let export = tables.export(slot)?;
	let start = export.serial_offset as usize;
	let end = start.saturating_add(export.serial_size as usize);

	// Both ends must lie inside the buffer before any field is read.
	cursor.seek(end)?;
	cursor.seek(start)?;

	log::debug!("export {} @ {} size {}", export.object_name, cursor.offset(), export.serial_size);

	let mut decoder = Decoder::new(cursor, &tables.names, opt);
	let mut fields = decoder.read_fields(0)?;

	if tables.object_class_name(ObjectIndex::export(slot))? == DATA_TABLE_CLASS {
		let rows = decoder.read_data_table_rows()?;
		fields.insert(ROW_MAP_FIELD, rows)?;
	}

	decoder.check_end(&export.object_name, end)?;
	Ok(fields)
}

/// Tag-driven property decoder over one cursor.
pub struct Decoder<'c, 'a> {
	cursor: &'c mut Cursor<'a>,
	names: &'c NameTable,
	opt: &'c DecodeOptions,
}

impl<'c, 'a> Decoder<'c, 'a> {
	/// Decoder reading from `cursor` with names resolved against `names`.
	pub fn new(cursor: &'c mut Cursor<'a>, names: &'c NameTable, opt: &'c DecodeOptions) -> Self {
		Self { cursor, names, opt }
	}

	/// Read tagged properties until the `None` terminator.
	pub fn read_fields(&mut self, depth: u32) -> Result<FieldSet> {
		if depth >= self.opt.max_depth {
			return Err(PackageError::DepthExceeded { max_depth: self.opt.max_depth });
		}

		let mut raw = Vec::new();
		while let Some(tag) = PropertyTag::read(self.cursor, self.names)? {
			let value = self.read_tagged(&tag, depth)?;
			raw.push(RawField {
				name: tag.name,
				array_index: tag.array_index,
				value,
			});
		}
		FieldSet::from_raw(raw)
	}

	/// Read the value following `tag` and leave the cursor at its declared end.
	fn read_tagged(&mut self, tag: &PropertyTag, depth: u32) -> Result<Value> {
		let start = self.cursor.pos();
		let end = start.saturating_add(tag.size as usize);
		match tag.struct_name() {
			Some(struct_name) => log::debug!("property struct {} {} @ {} size {}", struct_name, tag.name, self.cursor.offset(), tag.size),
			None => log::debug!("property {} {} @ {} size {}", tag.type_name, tag.name, self.cursor.offset(), tag.size),
		}

		let value = self.read_value(tag, Some(end), depth)?;
		self.check_end(&tag.name, end)?;
		Ok(value)
	}

	fn read_value(&mut self, tag: &PropertyTag, end: Option<usize>, depth: u32) -> Result<Value> {
		let value = match tag.type_name.as_str() {
			"BoolProperty" => match tag.data {
				TagData::Bool(value) if !tag.synthetic => Value::Bool(value),
				_ => Value::Bool(self.cursor.read_bool()?),
			},
			"Int8Property" => Value::I64(i64::from(self.cursor.read_i8()?)),
			"Int16Property" => Value::I64(i64::from(self.cursor.read_i16()?)),
			"IntProperty" => Value::I64(i64::from(self.cursor.read_i32()?)),
			"Int64Property" => Value::I64(self.cursor.read_i64()?),
			"ByteProperty" => {
				if tag.enum_name().is_some() || (!tag.synthetic && tag.size == 8) {
					Value::Enum(self.names.read(self.cursor)?)
				} else {
					Value::U64(u64::from(self.cursor.read_u8()?))
				}
			}
			"UInt16Property" => Value::U64(u64::from(self.cursor.read_u16()?)),
			"UInt32Property" => Value::U64(u64::from(self.cursor.read_u32()?)),
			"UInt64Property" => Value::U64(self.cursor.read_u64()?),
			"FloatProperty" => Value::F32(self.cursor.read_f32()?),
			"DoubleProperty" => Value::F64(self.cursor.read_f64()?),
			"StrProperty" => Value::Str(self.cursor.read_fstring()?),
			"NameProperty" => Value::Name(self.names.read(self.cursor)?),
			"EnumProperty" => Value::Enum(self.names.read(self.cursor)?),
			"ObjectProperty" | "ClassProperty" | "WeakObjectProperty" | "LazyObjectProperty" | "InterfaceProperty" => {
				Value::Object(self.read_object_ref()?)
			}
			"SoftObjectProperty" | "SoftClassProperty" => Value::SoftObject(SoftObjectPath {
				asset_path: self.names.read(self.cursor)?,
				sub_path: self.cursor.read_fstring()?,
			}),
			"TextProperty" => Value::Text(self.read_text(end)?),
			"FieldPathProperty" => Value::FieldPath(self.read_field_path()?),
			"StructProperty" => self.read_struct(tag, end, depth)?,
			"ArrayProperty" => self.read_array(tag, end, depth)?,
			"SetProperty" => self.read_set(tag, end, depth)?,
			"MapProperty" => self.read_map(tag, end, depth)?,
			other => self.unhandled(other, end)?,
		};
		Ok(value)
	}

	fn read_object_ref(&mut self) -> Result<ObjectRef> {
		let index = ObjectIndex(self.cursor.read_i32()?);
		Ok(if index.is_null() { ObjectRef::Null } else { ObjectRef::Index(index) })
	}

	fn read_text(&mut self, end: Option<usize>) -> Result<TextValue> {
		let flags = self.cursor.read_i32()?;
		let history = match self.cursor.read_i8()? {
			-1 => {
				let has_invariant = self.cursor.read_u32()? != 0;
				TextHistory::None {
					culture_invariant: if has_invariant { Some(self.cursor.read_fstring()?) } else { None },
				}
			}
			0 => TextHistory::Base {
				namespace: self.cursor.read_fstring()?,
				key: self.cursor.read_fstring()?,
				source: self.cursor.read_fstring()?,
			},
			11 => TextHistory::StringTable {
				table_id: self.names.read(self.cursor)?,
				key: self.cursor.read_fstring()?,
			},
			history_type => {
				log::warn!("text history type {history_type} at {} not decoded", self.cursor.offset());
				if let Some(end) = end {
					self.cursor.seek(end)?;
				}
				TextHistory::Unsupported { history_type }
			}
		};
		Ok(TextValue { flags, history })
	}

	fn read_field_path(&mut self) -> Result<FieldPath> {
		let count = self.cursor.read_i32()?.max(0);
		let mut path = Vec::new();
		for _ in 0..count {
			path.push(self.names.read(self.cursor)?);
		}
		Ok(FieldPath {
			path,
			owner: self.read_object_ref()?,
		})
	}

	fn read_struct(&mut self, tag: &PropertyTag, end: Option<usize>, depth: u32) -> Result<Value> {
		let struct_name = tag.struct_name().unwrap_or_default();
		match structs::lookup(struct_name) {
			Some(StructLayout::Fixed(layout)) => Ok(Value::Struct(layout.decode(self.cursor, self.names, struct_name)?)),
			Some(StructLayout::Skip) => {
				let Some(end) = end else {
					return Err(PackageError::UnhandledPropertyType {
						type_name: struct_name.to_owned(),
						at: self.cursor.offset(),
					});
				};
				self.cursor.seek(end)?;
				Ok(Value::Skipped {
					struct_name: struct_name.to_owned(),
				})
			}
			None => Ok(Value::Struct(StructValue {
				type_name: struct_name.to_owned(),
				fixed: false,
				fields: self.read_fields(depth + 1)?,
			})),
		}
	}

	fn read_array(&mut self, tag: &PropertyTag, end: Option<usize>, depth: u32) -> Result<Value> {
		let inner = tag.inner_type().unwrap_or_default();
		if inner != "StructProperty" && inner != "ByteProperty" && !is_element_type(inner) {
			return self.unhandled(inner, end);
		}

		let count = self.read_count()?;
		match inner {
			"StructProperty" => self.read_struct_elements(count, depth),
			"ByteProperty" => {
				let as_names = !tag.synthetic && count.checked_mul(8).is_some_and(|need| tag.size as usize == need + 4);
				let mut items = Vec::with_capacity(count.min(self.cursor.remaining()));
				for _ in 0..count {
					items.push(if as_names {
						Value::Name(self.names.read(self.cursor)?)
					} else {
						Value::U64(u64::from(self.cursor.read_u8()?))
					});
				}
				Ok(Value::List(items))
			}
			_ => self.read_elements(&PropertyTag::synthetic(&tag.name, inner), count, depth),
		}
	}

	/// Struct arrays carry one element tag whose struct name applies to every element.
	fn read_struct_elements(&mut self, count: usize, depth: u32) -> Result<Value> {
		let Some(inner_tag) = PropertyTag::read(self.cursor, self.names)? else {
			return Ok(Value::List(Vec::new()));
		};
		let elems_end = self.cursor.pos().saturating_add(inner_tag.size as usize);
		let struct_name = inner_tag.struct_name().unwrap_or_default().to_owned();

		let items = if structs::lookup(&struct_name) == Some(StructLayout::Skip) {
			self.cursor.seek(elems_end)?;
			let skipped = Value::Skipped {
				struct_name: struct_name.clone(),
			};
			let kept = count.min(inner_tag.size as usize);
			if kept < count {
				log::warn!("{} claims {count} {struct_name} elements in {} bytes; keeping {kept}", inner_tag.name, inner_tag.size);
			}
			vec![skipped; kept]
		} else {
			let mut items = Vec::with_capacity(count.min(self.cursor.remaining()));
			for _ in 0..count {
				items.push(self.read_struct(&inner_tag, None, depth)?);
			}
			items
		};

		self.check_end(&inner_tag.name, elems_end)?;
		Ok(Value::List(items))
	}

	fn read_elements(&mut self, elem: &PropertyTag, count: usize, depth: u32) -> Result<Value> {
		let mut items = Vec::with_capacity(count.min(self.cursor.remaining()));
		for _ in 0..count {
			items.push(self.read_value(elem, None, depth)?);
		}
		Ok(Value::List(items))
	}

	/// On disk: `i32` removed count, removed elements, then `i32` count and elements.
	fn read_set(&mut self, tag: &PropertyTag, end: Option<usize>, depth: u32) -> Result<Value> {
		let inner = tag.inner_type().unwrap_or_default();
		if !is_element_type(inner) {
			return self.unhandled(inner, end);
		}
		let elem = PropertyTag::synthetic(&tag.name, inner);

		let removed = self.read_count()?;
		for _ in 0..removed {
			self.read_value(&elem, None, depth)?;
		}
		let count = self.read_count()?;
		self.read_elements(&elem, count, depth)
	}

	fn read_map(&mut self, tag: &PropertyTag, end: Option<usize>, depth: u32) -> Result<Value> {
		let TagData::Map { key, value } = &tag.data else {
			return self.unhandled(&tag.type_name, end);
		};
		for type_name in [key, value] {
			if !is_element_type(type_name) {
				return self.unhandled(type_name, end);
			}
		}
		let key_tag = PropertyTag::synthetic(&tag.name, key);
		let value_tag = PropertyTag::synthetic(&tag.name, value);

		let tombstones = self.read_count()?;
		for _ in 0..tombstones {
			self.read_value(&key_tag, None, depth)?;
		}

		let count = self.read_count()?;
		log::debug!("map {} key {key} value {value} entries {count} removed {tombstones}", tag.name);
		let mut entries = Vec::with_capacity(count.min(self.cursor.remaining()));
		for _ in 0..count {
			let key = self.read_value(&key_tag, None, depth)?;
			let value = self.read_value(&value_tag, None, depth)?;
			entries.push(MapEntry { key, value });
		}
		Ok(Value::Map(entries))
	}

	/// Row count followed by `(name, field list)` rows.
	fn read_data_table_rows(&mut self) -> Result<Value> {
		let _ = self.cursor.read_i32()?;
		let count = self.read_count()?;
		let mut rows = Vec::with_capacity(count.min(self.cursor.remaining()));
		for _ in 0..count {
			let key = Value::Name(self.names.read(self.cursor)?);
			let fields = self.read_fields(1)?;
			rows.push(MapEntry {
				key,
				value: Value::Struct(StructValue {
					type_name: String::new(),
					fixed: false,
					fields,
				}),
			});
		}
		Ok(Value::Map(rows))
	}

	fn read_count(&mut self) -> Result<usize> {
		Ok(self.cursor.read_i32()?.max(0) as usize)
	}

	fn unhandled(&mut self, type_name: &str, end: Option<usize>) -> Result<Value> {
		let at = self.cursor.offset();
		let Some(end) = end.filter(|_| !self.opt.strict) else {
			return Err(PackageError::UnhandledPropertyType {
				type_name: type_name.to_owned(),
				at,
			});
		};
		log::warn!("unhandled property type {type_name} at {at}");
		self.cursor.seek(end)?;
		Ok(Value::Unhandled {
			type_name: type_name.to_owned(),
		})
	}

	/// Resynchronise to `end`, or fail in strict mode.
	fn check_end(&mut self, context: &str, end: usize) -> Result<()> {
		let actual = self.cursor.pos();
		if actual == end {
			return Ok(());
		}
		let expected_at = self.cursor.locate(end);
		let actual_at = self.cursor.offset();
		if self.opt.strict {
			return Err(PackageError::LayoutMismatch {
				context: context.to_owned(),
				expected: expected_at,
				actual: actual_at,
			});
		}
		log::warn!("{context}: expected end {expected_at}, got {actual_at}; resyncing");
		self.cursor.seek(end)
	}
}

/// Types decodable without a tag of their own, as container elements.
fn is_element_type(type_name: &str) -> bool {
	matches!(
		type_name,
		"BoolProperty"
			| "Int8Property"
			| "Int16Property"
			| "IntProperty"
			| "Int64Property"
			| "ByteProperty"
			| "UInt16Property"
			| "UInt32Property"
			| "UInt64Property"
			| "FloatProperty"
			| "DoubleProperty"
			| "StrProperty"
			| "NameProperty"
			| "EnumProperty"
			| "ObjectProperty"
			| "ClassProperty"
			| "WeakObjectProperty"
			| "LazyObjectProperty"
			| "InterfaceProperty"
			| "SoftObjectProperty"
			| "SoftClassProperty"
			| "TextProperty"
			| "FieldPathProperty"
			| "StructProperty"
	)
}
