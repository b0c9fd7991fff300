//! Shared test helpers for workspace crates: synthetic package builders and scratch dirs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Package file tag written at offset 0.
pub const PACKAGE_FILE_TAG: u32 = 0x9E2A_83C1;
/// Package flag marking editor-only data as stripped.
pub const PKG_FILTER_EDITOR_ONLY: u32 = 0x8000_0000;

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Create an empty, process-unique directory under the system temp dir.
pub fn scratch_dir(label: &str) -> PathBuf {
	let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
	let dir = std::env::temp_dir().join(format!("uedoc-{label}-{}-{n}", std::process::id()));
	let _ = fs::remove_dir_all(&dir);
	fs::create_dir_all(&dir).expect("scratch dir is creatable");
	dir
}

/// Name table under construction; indices are assigned on first use.
#[derive(Debug, Default, Clone)]
pub struct Names {
	entries: Vec<String>,
}

impl Names {
	/// Return the index of `name`, appending it when new.
	pub fn index(&mut self, name: &str) -> u32 {
		if let Some(found) = self.entries.iter().position(|entry| entry == name) {
			return found as u32;
		}
		self.entries.push(name.to_owned());
		(self.entries.len() - 1) as u32
	}

	/// Interned names in index order.
	pub fn entries(&self) -> &[String] {
		&self.entries
	}
}

/// Type-specific tag payload.
#[derive(Debug, Clone, Copy)]
pub enum TagData<'a> {
	/// No extra tag fields.
	Plain,
	/// Struct type name plus zero guid.
	Struct(&'a str),
	/// Bool value stored in the tag.
	Bool(bool),
	/// Enum type name (`ByteProperty` / `EnumProperty`).
	Enum(&'a str),
	/// Inner element type (`ArrayProperty` / `SetProperty`).
	Inner(&'a str),
	/// Key and value types (`MapProperty`).
	Map(&'a str, &'a str),
}

/// Little-endian writer for tagged property streams and raw values.
pub struct PropertyWriter<'n> {
	names: &'n mut Names,
	buf: Vec<u8>,
}

impl<'n> PropertyWriter<'n> {
	/// Start an empty stream interning names into `names`.
	pub fn new(names: &'n mut Names) -> Self {
		Self { names, buf: Vec::new() }
	}

	/// Bytes written so far.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// Whether nothing was written.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Consume the writer and return its bytes.
	pub fn finish(self) -> Vec<u8> {
		self.buf
	}

	/// Write raw bytes.
	pub fn raw_bytes(&mut self, bytes: &[u8]) -> &mut Self {
		self.buf.extend_from_slice(bytes);
		self
	}

	/// Write one byte.
	pub fn raw_u8(&mut self, value: u8) -> &mut Self {
		self.raw_bytes(&[value])
	}

	/// Write a little-endian `u16`.
	pub fn raw_u16(&mut self, value: u16) -> &mut Self {
		self.raw_bytes(&value.to_le_bytes())
	}

	/// Write a little-endian `i32`.
	pub fn raw_i32(&mut self, value: i32) -> &mut Self {
		self.raw_bytes(&value.to_le_bytes())
	}

	/// Write a little-endian `u32`.
	pub fn raw_u32(&mut self, value: u32) -> &mut Self {
		self.raw_bytes(&value.to_le_bytes())
	}

	/// Write a little-endian `i64`.
	pub fn raw_i64(&mut self, value: i64) -> &mut Self {
		self.raw_bytes(&value.to_le_bytes())
	}

	/// Write a little-endian `u64`.
	pub fn raw_u64(&mut self, value: u64) -> &mut Self {
		self.raw_bytes(&value.to_le_bytes())
	}

	/// Write a little-endian `f32`.
	pub fn raw_f32(&mut self, value: f32) -> &mut Self {
		self.raw_bytes(&value.to_le_bytes())
	}

	/// Write a little-endian `f64`.
	pub fn raw_f64(&mut self, value: f64) -> &mut Self {
		self.raw_bytes(&value.to_le_bytes())
	}

	/// Write a zero guid.
	pub fn raw_guid(&mut self) -> &mut Self {
		self.raw_bytes(&[0_u8; 16])
	}

	/// Write a single-byte engine string with terminator (empty strings use length 0).
	pub fn raw_fstring(&mut self, value: &str) -> &mut Self {
		if value.is_empty() {
			return self.raw_i32(0);
		}
		self.raw_i32(value.len() as i32 + 1);
		self.raw_bytes(value.as_bytes());
		self.raw_u8(0)
	}

	/// Write a name reference with number `0`.
	pub fn raw_name(&mut self, name: &str) -> &mut Self {
		self.raw_name_number(name, 0)
	}

	/// Write a name reference with an explicit number suffix.
	pub fn raw_name_number(&mut self, name: &str, number: u32) -> &mut Self {
		let index = self.names.index(name);
		self.raw_u32(index);
		self.raw_u32(number)
	}

	/// Write a property tag header.
	pub fn raw_tag(&mut self, name: &str, type_name: &str, size: u32, array_index: u32, data: TagData<'_>) -> &mut Self {
		self.raw_name(name);
		self.raw_name(type_name);
		self.raw_u32(size);
		self.raw_u32(array_index);
		match data {
			TagData::Plain => {}
			TagData::Struct(struct_name) => {
				self.raw_name(struct_name);
				self.raw_guid();
			}
			TagData::Bool(value) => {
				self.raw_u8(u8::from(value));
			}
			TagData::Enum(enum_name) => {
				self.raw_name(enum_name);
			}
			TagData::Inner(inner) => {
				self.raw_name(inner);
			}
			TagData::Map(key, value) => {
				self.raw_name(key);
				self.raw_name(value);
			}
		}
		self.raw_u8(0)
	}

	/// Write the `None` field-list terminator.
	pub fn none(&mut self) -> &mut Self {
		self.raw_name("None")
	}

	/// Write one tagged property whose payload is produced by `body`; the tag size is computed.
	pub fn property(
		&mut self,
		name: &str,
		type_name: &str,
		array_index: u32,
		data: TagData<'_>,
		body: impl FnOnce(&mut PropertyWriter<'_>),
	) -> &mut Self {
		let mut inner = PropertyWriter::new(&mut *self.names);
		body(&mut inner);
		let payload = inner.finish();
		self.raw_tag(name, type_name, payload.len() as u32, array_index, data);
		self.raw_bytes(&payload)
	}

	/// `IntProperty` at array index 0.
	pub fn int(&mut self, name: &str, value: i32) -> &mut Self {
		self.int_at(name, 0, value)
	}

	/// `IntProperty` at an explicit array index.
	pub fn int_at(&mut self, name: &str, array_index: u32, value: i32) -> &mut Self {
		self.property(name, "IntProperty", array_index, TagData::Plain, |w| {
			w.raw_i32(value);
		})
	}

	/// `FloatProperty`.
	pub fn float(&mut self, name: &str, value: f32) -> &mut Self {
		self.property(name, "FloatProperty", 0, TagData::Plain, |w| {
			w.raw_f32(value);
		})
	}

	/// `BoolProperty` (value lives in the tag, size 0).
	pub fn boolean(&mut self, name: &str, value: bool) -> &mut Self {
		self.raw_tag(name, "BoolProperty", 0, 0, TagData::Bool(value))
	}

	/// `StrProperty`.
	pub fn string(&mut self, name: &str, value: &str) -> &mut Self {
		self.property(name, "StrProperty", 0, TagData::Plain, |w| {
			w.raw_fstring(value);
		})
	}

	/// `NameProperty`.
	pub fn name(&mut self, name: &str, value: &str) -> &mut Self {
		self.property(name, "NameProperty", 0, TagData::Plain, |w| {
			w.raw_name(value);
		})
	}

	/// `EnumProperty` holding a symbol name.
	pub fn enumeration(&mut self, name: &str, enum_name: &str, value: &str) -> &mut Self {
		self.property(name, "EnumProperty", 0, TagData::Enum(enum_name), |w| {
			w.raw_name(value);
		})
	}

	/// `ObjectProperty` holding a raw object index.
	pub fn object(&mut self, name: &str, index: i32) -> &mut Self {
		self.property(name, "ObjectProperty", 0, TagData::Plain, |w| {
			w.raw_i32(index);
		})
	}

	/// Tagged `StructProperty`; `body` writes the nested fields, the terminator is appended.
	pub fn structure(&mut self, name: &str, struct_name: &str, body: impl FnOnce(&mut PropertyWriter<'_>)) -> &mut Self {
		self.property(name, "StructProperty", 0, TagData::Struct(struct_name), |w| {
			body(w);
			w.none();
		})
	}

	/// Fixed-layout `StructProperty`; `body` writes the raw struct bytes.
	pub fn fixed_struct(&mut self, name: &str, struct_name: &str, body: impl FnOnce(&mut PropertyWriter<'_>)) -> &mut Self {
		self.property(name, "StructProperty", 0, TagData::Struct(struct_name), body)
	}

	/// `ArrayProperty` of non-struct elements; `body` writes `count` raw elements.
	pub fn array(&mut self, name: &str, inner_type: &str, count: i32, body: impl FnOnce(&mut PropertyWriter<'_>)) -> &mut Self {
		self.property(name, "ArrayProperty", 0, TagData::Inner(inner_type), |w| {
			w.raw_i32(count);
			body(w);
		})
	}

	/// `ArrayProperty` of structs; writes the inner element tag, `body` writes `count` elements.
	pub fn struct_array(&mut self, name: &str, struct_name: &str, count: i32, body: impl FnOnce(&mut PropertyWriter<'_>)) -> &mut Self {
		self.property(name, "ArrayProperty", 0, TagData::Inner("StructProperty"), |w| {
			w.raw_i32(count);
			let mut elems = PropertyWriter::new(&mut *w.names);
			body(&mut elems);
			let bytes = elems.finish();
			w.raw_tag(name, "StructProperty", bytes.len() as u32, 0, TagData::Struct(struct_name));
			w.raw_bytes(&bytes);
		})
	}

	/// `MapProperty`; `body` writes the removal count, removed keys, entry count, and entries.
	pub fn map(&mut self, name: &str, key_type: &str, value_type: &str, body: impl FnOnce(&mut PropertyWriter<'_>)) -> &mut Self {
		self.property(name, "MapProperty", 0, TagData::Map(key_type, value_type), body)
	}
}

/// Version and flag knobs for the written summary.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
	/// Legacy version discriminant (`-2..=-8`).
	pub legacy_version: i32,
	/// UE4 object version.
	pub file_version_ue4: i32,
	/// UE5 object version, written only when `legacy_version <= -8`.
	pub file_version_ue5: i32,
	/// Package flags.
	pub package_flags: u32,
	/// Number of zero custom-version entries to write.
	pub custom_versions: u32,
	/// Folder name string.
	pub folder_name: String,
	/// Localization id, written only when the version and flags allow it.
	pub localization_id: String,
}

impl Default for SummaryOptions {
	fn default() -> Self {
		Self {
			legacy_version: -7,
			file_version_ue4: 522,
			file_version_ue5: 0,
			package_flags: PKG_FILTER_EDITOR_ONLY,
			custom_versions: 0,
			folder_name: "None".to_owned(),
			localization_id: String::new(),
		}
	}
}

impl SummaryOptions {
	/// UE5 layout with optional-resource flags in the tables.
	pub fn ue5() -> Self {
		Self {
			legacy_version: -8,
			file_version_ue5: 1004,
			..Self::default()
		}
	}

	fn has_ue3_version(&self) -> bool {
		self.legacy_version != -4
	}

	fn has_ue5_version(&self) -> bool {
		self.legacy_version <= -8
	}

	fn filter_editor_only(&self) -> bool {
		self.package_flags & PKG_FILTER_EDITOR_ONLY != 0
	}

	fn ue5_version(&self) -> i32 {
		if self.has_ue5_version() { self.file_version_ue5 } else { -1 }
	}
}

/// One import table record.
#[derive(Debug, Clone)]
pub struct ImportSpec {
	/// Class package name.
	pub class_package: String,
	/// Class name.
	pub class_name: String,
	/// Outer object index.
	pub outer_index: i32,
	/// Object name.
	pub object_name: String,
}

impl ImportSpec {
	/// Import record with all fields given.
	pub fn new(class_package: &str, class_name: &str, outer_index: i32, object_name: &str) -> Self {
		Self {
			class_package: class_package.to_owned(),
			class_name: class_name.to_owned(),
			outer_index,
			object_name: object_name.to_owned(),
		}
	}

	/// `Package` import with no outer, e.g. `/Game/Weapons/Rifle`.
	pub fn package(path: &str) -> Self {
		Self::new("/Script/CoreUObject", "Package", 0, path)
	}
}

/// One export table record with its serialized property bytes.
#[derive(Debug, Clone)]
pub struct ExportSpec {
	/// Object name.
	pub object_name: String,
	/// Class object index.
	pub class_index: i32,
	/// Super struct object index.
	pub super_index: i32,
	/// Template object index.
	pub template_index: i32,
	/// Outer object index.
	pub outer_index: i32,
	/// Serialized property data.
	pub data: Vec<u8>,
}

impl ExportSpec {
	/// Export with the given class and data and null super/template/outer.
	pub fn new(object_name: &str, class_index: i32, data: Vec<u8>) -> Self {
		Self {
			object_name: object_name.to_owned(),
			class_index,
			super_index: 0,
			template_index: 0,
			outer_index: 0,
			data,
		}
	}

	/// Set the super struct index.
	pub fn with_super(mut self, super_index: i32) -> Self {
		self.super_index = super_index;
		self
	}

	/// Set the outer index.
	pub fn with_outer(mut self, outer_index: i32) -> Self {
		self.outer_index = outer_index;
		self
	}
}

/// Synthetic package assembled from names, imports, and exports.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
	summary: SummaryOptions,
	names: Names,
	imports: Vec<ImportSpec>,
	exports: Vec<ExportSpec>,
}

/// Sizes and offsets of one built package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltLayout {
	/// Header region length (summary + tables).
	pub header_len: usize,
	/// Name table offset.
	pub name_offset: usize,
	/// Import table offset.
	pub import_offset: usize,
	/// Export table offset.
	pub export_offset: usize,
}

impl PackageBuilder {
	/// Empty package with default summary options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty package with explicit summary options.
	pub fn with_summary(summary: SummaryOptions) -> Self {
		Self {
			summary,
			..Self::default()
		}
	}

	/// Start a property stream sharing this package's name table.
	pub fn writer(&mut self) -> PropertyWriter<'_> {
		PropertyWriter::new(&mut self.names)
	}

	/// Mutable access to the name table.
	pub fn names_mut(&mut self) -> &mut Names {
		&mut self.names
	}

	/// Append an import and return its negative object index.
	pub fn import(&mut self, spec: ImportSpec) -> i32 {
		self.names.index(&spec.class_package);
		self.names.index(&spec.class_name);
		self.names.index(&spec.object_name);
		self.imports.push(spec);
		-(self.imports.len() as i32)
	}

	/// Append an export and return its positive object index.
	pub fn export(&mut self, spec: ExportSpec) -> i32 {
		self.names.index(&spec.object_name);
		self.exports.push(spec);
		self.exports.len() as i32
	}

	/// Replace the data of an already appended export.
	pub fn set_export_data(&mut self, index: i32, data: Vec<u8>) {
		self.exports[(index - 1) as usize].data = data;
	}

	/// Build one contiguous buffer (header followed by export data).
	pub fn build(&self) -> Vec<u8> {
		self.build_with_layout().0
	}

	/// Build split buffers: header bytes and appended overflow bytes.
	pub fn build_split(&self) -> (Vec<u8>, Vec<u8>) {
		let (mut bytes, layout) = self.build_with_layout();
		let bulk = bytes.split_off(layout.header_len);
		(bytes, bulk)
	}

	/// Build one contiguous buffer and report its layout.
	pub fn build_with_layout(&self) -> (Vec<u8>, BuiltLayout) {
		let mut names = self.names.clone();
		names.index("None");

		// Table sizes do not depend on the offsets, so one measuring pass is enough.
		let zero = BuiltLayout {
			header_len: 0,
			name_offset: 0,
			import_offset: 0,
			export_offset: 0,
		};
		let summary_len = self.write_summary(&mut names.clone(), &zero, 0).len();
		let name_len = write_name_table(&names).len();
		let import_len = self.write_imports(&mut names.clone()).len();
		let export_len = self.write_exports(&mut names.clone(), 0).len();

		let layout = BuiltLayout {
			header_len: summary_len + name_len + import_len + export_len,
			name_offset: summary_len,
			import_offset: summary_len + name_len,
			export_offset: summary_len + name_len + import_len,
		};

		let mut out = self.write_summary(&mut names.clone(), &layout, names.entries().len() as u32);
		out.extend(write_name_table(&names));
		out.extend(self.write_imports(&mut names.clone()));
		out.extend(self.write_exports(&mut names.clone(), layout.header_len));
		for export in &self.exports {
			out.extend_from_slice(&export.data);
		}
		(out, layout)
	}

	/// Write split `.uasset` + `.uexp` files named `stem` into `dir`; returns the `.uasset` path.
	pub fn write_split(&self, dir: &Path, stem: &str) -> PathBuf {
		let (header, bulk) = self.build_split();
		fs::create_dir_all(dir).expect("package dir is creatable");
		let asset = dir.join(format!("{stem}.uasset"));
		fs::write(&asset, header).expect("uasset writes");
		fs::write(dir.join(format!("{stem}.uexp")), bulk).expect("uexp writes");
		asset
	}

	fn write_summary(&self, names: &mut Names, layout: &BuiltLayout, name_count: u32) -> Vec<u8> {
		let opts = &self.summary;
		let mut w = PropertyWriter::new(names);
		w.raw_u32(PACKAGE_FILE_TAG);
		w.raw_i32(opts.legacy_version);
		if opts.has_ue3_version() {
			w.raw_i32(864);
		}
		w.raw_i32(opts.file_version_ue4);
		if opts.has_ue5_version() {
			w.raw_i32(opts.file_version_ue5);
		}
		w.raw_i32(0);
		w.raw_u32(opts.custom_versions);
		for _ in 0..opts.custom_versions {
			w.raw_guid();
			w.raw_i32(1);
		}
		w.raw_u32(layout.header_len as u32);
		w.raw_fstring(&opts.folder_name);
		w.raw_u32(opts.package_flags);
		w.raw_u32(name_count);
		w.raw_u32(layout.name_offset as u32);
		if opts.file_version_ue4 >= 516 && !opts.filter_editor_only() {
			w.raw_fstring(&opts.localization_id);
		}
		if opts.file_version_ue4 >= 459 {
			w.raw_u32(0);
			w.raw_u32(0);
		}
		w.raw_u32(self.exports.len() as u32);
		w.raw_u32(layout.export_offset as u32);
		w.raw_u32(self.imports.len() as u32);
		w.raw_u32(layout.import_offset as u32);
		w.raw_u32(0);
		w.finish()
	}

	fn write_imports(&self, names: &mut Names) -> Vec<u8> {
		let opts = &self.summary;
		let mut w = PropertyWriter::new(names);
		for import in &self.imports {
			w.raw_name(&import.class_package);
			w.raw_name(&import.class_name);
			w.raw_i32(import.outer_index);
			w.raw_name(&import.object_name);
			if !opts.filter_editor_only() && opts.file_version_ue4 >= 520 {
				w.raw_name("None");
			}
			if opts.ue5_version() >= 1003 {
				w.raw_u32(0);
			}
		}
		w.finish()
	}

	fn write_exports(&self, names: &mut Names, data_start: usize) -> Vec<u8> {
		let opts = &self.summary;
		let mut w = PropertyWriter::new(names);
		let mut offset = data_start as u64;
		for export in &self.exports {
			w.raw_i32(export.class_index);
			w.raw_i32(export.super_index);
			w.raw_i32(export.template_index);
			w.raw_i32(export.outer_index);
			w.raw_name(&export.object_name);
			w.raw_u32(0);
			w.raw_u64(export.data.len() as u64);
			w.raw_u64(offset);
			w.raw_u32(0);
			w.raw_u32(0);
			w.raw_u32(0);
			w.raw_guid();
			w.raw_u32(0);
			w.raw_u32(0);
			w.raw_u32(1);
			if opts.ue5_version() >= 1003 {
				w.raw_u32(0);
			}
			w.raw_i32(-1);
			for _ in 0..4 {
				w.raw_i32(0);
			}
			offset += export.data.len() as u64;
		}
		w.finish()
	}
}

fn write_name_table(names: &Names) -> Vec<u8> {
	let mut scratch = names.clone();
	let mut w = PropertyWriter::new(&mut scratch);
	for entry in names.entries() {
		w.raw_fstring(entry);
		w.raw_u16(0);
		w.raw_u16(0);
	}
	w.finish()
}
