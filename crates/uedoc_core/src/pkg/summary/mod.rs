use crate::pkg::bytes::Cursor;
use crate::pkg::{Guid, PackageError, Result};

/// Package file tag stored in the first four bytes.
pub const PACKAGE_FILE_TAG: u32 = 0x9E2A_83C1;
/// Package flag set when editor-only data was stripped.
pub const PKG_FILTER_EDITOR_ONLY: u32 = 0x8000_0000;

/// UE4 version that added gatherable text table fields.
pub const VER_UE4_SERIALIZE_TEXT_IN_PACKAGES: i32 = 459;
/// UE4 version that added the localization id.
pub const VER_UE4_ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID: i32 = 516;
/// UE4 version that added the import package name.
pub const VER_UE4_NON_OUTER_PACKAGE_IMPORT: i32 = 520;
/// UE5 version that added optional-resource flags to export/import records.
pub const VER_UE5_OPTIONAL_RESOURCES: i32 = 1003;

/// One custom version entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomVersion {
	/// Version key.
	pub key: Guid,
	/// Version number.
	pub version: i32,
}

/// Parsed package file summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
	/// Package file tag.
	pub tag: u32,
	/// Legacy file version discriminant (negative for UE4+).
	pub legacy_version: i32,
	/// UE3 version, absent when `legacy_version == -4`.
	pub legacy_ue3_version: Option<i32>,
	/// UE4 object version.
	pub file_version_ue4: i32,
	/// UE5 object version, present from legacy version `-8`.
	pub file_version_ue5: Option<i32>,
	/// Licensee version.
	pub licensee_version: i32,
	/// Custom version container.
	pub custom_versions: Vec<CustomVersion>,
	/// Total size of the header region.
	pub total_header_size: u32,
	/// Package folder / group name.
	pub folder_name: String,
	/// Package flags.
	pub package_flags: u32,
	/// Name table entry count.
	pub name_count: u32,
	/// Name table offset.
	pub name_offset: u32,
	/// Localization id when present.
	pub localization_id: Option<String>,
	/// Gatherable text table entry count.
	pub gatherable_text_data_count: u32,
	/// Gatherable text table offset.
	pub gatherable_text_data_offset: u32,
	/// Export table entry count.
	pub export_count: u32,
	/// Export table offset.
	pub export_offset: u32,
	/// Import table entry count.
	pub import_count: u32,
	/// Import table offset.
	pub import_offset: u32,
	/// Depends map offset.
	pub depends_offset: u32,
}

impl PackageSummary {
	/// Oldest supported legacy version.
	pub const MIN_LEGACY_VERSION: i32 = -8;
	/// Newest supported legacy version.
	pub const MAX_LEGACY_VERSION: i32 = -2;

	/// Parse the summary at the cursor position.
	pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
		let tag = cursor.read_u32()?;
		if tag != PACKAGE_FILE_TAG {
			return Err(PackageError::InvalidMagic { magic: tag });
		}

		let legacy_version = cursor.read_i32()?;
		if !(Self::MIN_LEGACY_VERSION..=Self::MAX_LEGACY_VERSION).contains(&legacy_version) {
			return Err(PackageError::UnsupportedVersion { legacy_version });
		}

		let legacy_ue3_version = if legacy_version != -4 { Some(cursor.read_i32()?) } else { None };
		let file_version_ue4 = cursor.read_i32()?;
		let file_version_ue5 = if legacy_version <= -8 { Some(cursor.read_i32()?) } else { None };
		let licensee_version = cursor.read_i32()?;

		let mut custom_versions = Vec::new();
		if legacy_version <= -2 {
			let count = cursor.read_u32()?;
			for _ in 0..count {
				custom_versions.push(CustomVersion {
					key: cursor.read_guid()?,
					version: cursor.read_i32()?,
				});
			}
		}

		let total_header_size = cursor.read_u32()?;
		let folder_name = cursor.read_fstring()?;
		let package_flags = cursor.read_u32()?;
		let name_count = cursor.read_u32()?;
		let name_offset = cursor.read_u32()?;

		let filter_editor_only = package_flags & PKG_FILTER_EDITOR_ONLY != 0;
		let localization_id = if file_version_ue4 >= VER_UE4_ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID && !filter_editor_only {
			Some(cursor.read_fstring()?)
		} else {
			None
		};

		let (gatherable_text_data_count, gatherable_text_data_offset) = if file_version_ue4 >= VER_UE4_SERIALIZE_TEXT_IN_PACKAGES {
			(cursor.read_u32()?, cursor.read_u32()?)
		} else {
			(0, 0)
		};

		Ok(Self {
			tag,
			legacy_version,
			legacy_ue3_version,
			file_version_ue4,
			file_version_ue5,
			licensee_version,
			custom_versions,
			total_header_size,
			folder_name,
			package_flags,
			name_count,
			name_offset,
			localization_id,
			gatherable_text_data_count,
			gatherable_text_data_offset,
			export_count: cursor.read_u32()?,
			export_offset: cursor.read_u32()?,
			import_count: cursor.read_u32()?,
			import_offset: cursor.read_u32()?,
			depends_offset: cursor.read_u32()?,
		})
	}

	/// Whether editor-only data was filtered out of this package.
	pub fn is_filter_editor_only(&self) -> bool {
		self.package_flags & PKG_FILTER_EDITOR_ONLY != 0
	}

	/// UE5 object version, or `-1` for pre-UE5 packages.
	pub fn ue5_version(&self) -> i32 {
		self.file_version_ue5.unwrap_or(-1)
	}
}
