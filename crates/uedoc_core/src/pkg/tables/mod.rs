use crate::pkg::bytes::Cursor;
use crate::pkg::summary::{VER_UE4_NON_OUTER_PACKAGE_IMPORT, VER_UE5_OPTIONAL_RESOURCES};
use crate::pkg::{Guid, ObjectIndex, PackageError, PackageSummary, Result};

/// One name table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
	/// Name text.
	pub name: String,
	/// Case-insensitive hash (kept, unused).
	pub non_case_preserving_hash: u16,
	/// Case-preserving hash (kept, unused).
	pub case_preserving_hash: u16,
}

/// Package name table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
	entries: Vec<NameEntry>,
}

impl NameTable {
	/// Build a table from already parsed entries.
	pub fn new(entries: Vec<NameEntry>) -> Self {
		Self { entries }
	}

	/// Read `count` entries at the cursor position.
	pub fn parse(cursor: &mut Cursor<'_>, count: u32) -> Result<Self> {
		let mut entries = Vec::new();
		for _ in 0..count {
			entries.push(NameEntry {
				name: cursor.read_fstring()?,
				non_case_preserving_hash: cursor.read_u16()?,
				case_preserving_hash: cursor.read_u16()?,
			});
		}
		Ok(Self { entries })
	}

	/// Raw entries in index order.
	pub fn entries(&self) -> &[NameEntry] {
		&self.entries
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Resolve `index` plus number suffix; `number == 0` means no suffix, otherwise `_<number-1>` is appended.
	pub fn resolve(&self, index: u32, number: u32) -> Result<String> {
		let entry = self.entries.get(index as usize).ok_or(PackageError::IndexOutOfRange {
			kind: "name",
			index: i64::from(index),
			len: self.entries.len(),
		})?;
		if number == 0 {
			return Ok(entry.name.clone());
		}
		Ok(format!("{}_{}", entry.name, number - 1))
	}

	/// Read an on-disk name reference (`u32` index + `u32` number) and resolve it.
	pub fn read(&self, cursor: &mut Cursor<'_>) -> Result<String> {
		let index = cursor.read_u32()?;
		let number = cursor.read_u32()?;
		self.resolve(index, number)
	}
}

/// One export table record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectExport {
	/// Class of the exported object.
	pub class_index: ObjectIndex,
	/// Super struct (parent class) of the exported object.
	pub super_index: ObjectIndex,
	/// Archetype template.
	pub template_index: ObjectIndex,
	/// Containing object.
	pub outer_index: ObjectIndex,
	/// Resolved object name.
	pub object_name: String,
	/// Object flags.
	pub object_flags: u32,
	/// Serialized property data size.
	pub serial_size: u64,
	/// Serialized property data offset (logical, across primary and overflow bytes).
	pub serial_offset: u64,
	/// Forced export flag.
	pub forced_export: bool,
	/// Not-for-client flag.
	pub not_for_client: bool,
	/// Not-for-server flag.
	pub not_for_server: bool,
	/// Package guid.
	pub package_guid: Guid,
	/// Package flags.
	pub package_flags: u32,
	/// Not-always-loaded-for-editor-game flag.
	pub not_always_loaded_for_editor_game: bool,
	/// Asset flag.
	pub is_asset: bool,
	/// Public hash flag (UE5 optional resources).
	pub generate_public_hash: bool,
	/// First dependency index into the dependency map.
	pub first_export_dependency: i32,
	/// Dependency counts in serialization order.
	pub dependency_counts: [i32; 4],
}

impl ObjectExport {
	fn parse(cursor: &mut Cursor<'_>, summary: &PackageSummary, names: &NameTable) -> Result<Self> {
		Ok(Self {
			class_index: ObjectIndex(cursor.read_i32()?),
			super_index: ObjectIndex(cursor.read_i32()?),
			template_index: ObjectIndex(cursor.read_i32()?),
			outer_index: ObjectIndex(cursor.read_i32()?),
			object_name: names.read(cursor)?,
			object_flags: cursor.read_u32()?,
			serial_size: cursor.read_u64()?,
			serial_offset: cursor.read_u64()?,
			forced_export: cursor.read_u32()? != 0,
			not_for_client: cursor.read_u32()? != 0,
			not_for_server: cursor.read_u32()? != 0,
			package_guid: cursor.read_guid()?,
			package_flags: cursor.read_u32()?,
			not_always_loaded_for_editor_game: cursor.read_u32()? != 0,
			is_asset: cursor.read_u32()? != 0,
			generate_public_hash: summary.ue5_version() >= VER_UE5_OPTIONAL_RESOURCES && cursor.read_u32()? != 0,
			first_export_dependency: cursor.read_i32()?,
			dependency_counts: [cursor.read_i32()?, cursor.read_i32()?, cursor.read_i32()?, cursor.read_i32()?],
		})
	}
}

/// One import table record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectImport {
	/// Package holding the class.
	pub class_package: String,
	/// Class name.
	pub class_name: String,
	/// Containing object.
	pub outer_index: ObjectIndex,
	/// Object name.
	pub object_name: String,
	/// Explicit package name, present only in unfiltered packages from UE4 520 on.
	pub package_name: Option<String>,
	/// Optional-import flag (UE5 optional resources).
	pub import_optional: bool,
}

impl ObjectImport {
	fn parse(cursor: &mut Cursor<'_>, summary: &PackageSummary, names: &NameTable) -> Result<Self> {
		let class_package = names.read(cursor)?;
		let class_name = names.read(cursor)?;
		let outer_index = ObjectIndex(cursor.read_i32()?);
		let object_name = names.read(cursor)?;
		let package_name = if !summary.is_filter_editor_only() && summary.file_version_ue4 >= VER_UE4_NON_OUTER_PACKAGE_IMPORT {
			Some(names.read(cursor)?)
		} else {
			None
		};
		let import_optional = summary.ue5_version() >= VER_UE5_OPTIONAL_RESOURCES && cursor.read_u32()? != 0;

		Ok(Self {
			class_package,
			class_name,
			outer_index,
			object_name,
			package_name,
			import_optional,
		})
	}
}

/// Name, export, and import tables of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageTables {
	/// Name table.
	pub names: NameTable,
	/// Export table.
	pub exports: Vec<ObjectExport>,
	/// Import table.
	pub imports: Vec<ObjectImport>,
}

impl PackageTables {
	/// Seek to each table offset declared in `summary` and read its records.
	pub fn parse(cursor: &mut Cursor<'_>, summary: &PackageSummary) -> Result<Self> {
		cursor.seek(summary.name_offset as usize)?;
		let names = NameTable::parse(cursor, summary.name_count)?;

		cursor.seek(summary.export_offset as usize)?;
		let mut exports = Vec::new();
		for _ in 0..summary.export_count {
			exports.push(ObjectExport::parse(cursor, summary, &names)?);
		}

		cursor.seek(summary.import_offset as usize)?;
		let mut imports = Vec::new();
		for _ in 0..summary.import_count {
			imports.push(ObjectImport::parse(cursor, summary, &names)?);
		}

		Ok(Self { names, exports, imports })
	}

	/// Look up an export by 0-based slot.
	pub fn export(&self, slot: usize) -> Result<&ObjectExport> {
		self.exports.get(slot).ok_or(PackageError::IndexOutOfRange {
			kind: "export",
			index: slot as i64,
			len: self.exports.len(),
		})
	}

	/// Look up an import by 0-based slot.
	pub fn import(&self, slot: usize) -> Result<&ObjectImport> {
		self.imports.get(slot).ok_or(PackageError::IndexOutOfRange {
			kind: "import",
			index: slot as i64,
			len: self.imports.len(),
		})
	}

	/// Find the first export slot named `name`.
	pub fn find_export(&self, name: &str) -> Option<usize> {
		self.exports.iter().position(|export| export.object_name == name)
	}
}
