mod bytes;
mod decode;
mod error;
mod fields;
mod file;
mod inherit;
mod manager;
mod resolve;
mod structs;
mod summary;
mod tables;
mod tag;
mod value;

/// Byte cursor, source offsets, and GUIDs.
pub use bytes::{Cursor, Guid, SourceFile, SourceOffset};
/// Export decoding entry points and options.
pub use decode::{DecodeOptions, Decoder, ROW_MAP_FIELD, decode_export};
/// Error and result aliases.
pub use error::{PackageError, Result};
/// Ordered, disambiguated field collections.
pub use fields::{FieldSet, RawField};
/// Package file abstraction.
pub use file::{BULK_EXTENSION, PackageFile};
/// Inheritance-aware merge and component lookup.
pub use inherit::{find_component, merge};
/// Package arena and cross-package reference resolution.
pub use manager::{AssetManager, DEFAULT_OBJECT_PREFIX, ExportObject, ManagerOptions, ResolutionContext};
/// Object index classification.
pub use resolve::{ObjectIndex, ObjectKind};
/// Fixed-layout struct registry.
pub use structs::{FixedStruct, StructLayout, lookup as struct_layout};
/// Package summary header.
pub use summary::{CustomVersion, PACKAGE_FILE_TAG, PKG_FILTER_EDITOR_ONLY, PackageSummary};
/// Name, import, and export tables.
pub use tables::{NameEntry, NameTable, ObjectExport, ObjectImport, PackageTables};
/// Property tag headers.
pub use tag::{NONE_NAME, PropertyTag, TagData};
/// Decoded value types.
pub use value::{ExportId, FieldPath, MapEntry, ObjectRef, PackageId, SoftObjectPath, StructValue, TextHistory, TextValue, Value};
