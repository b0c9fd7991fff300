use std::collections::{HashMap, HashSet};
use std::fs;
use std::mem;
use std::path::{Component, Path, PathBuf};

use crate::pkg::{DecodeOptions, ExportId, FieldSet, ObjectIndex, ObjectKind, ObjectRef, PackageError, PackageFile, PackageId, Result, Value};

/// Prefix of exports holding a class's default object.
pub const DEFAULT_OBJECT_PREFIX: &str = "Default__";

/// Content root, mount point, and decode settings for an [`AssetManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
	/// Directory that game-relative import paths resolve under.
	pub content_root: PathBuf,
	/// Package-name prefix mapped onto `content_root`.
	pub mount_point: String,
	/// Extensions probed, in order, when resolving an import package.
	pub extensions: Vec<String>,
	/// Decode options used for every export.
	pub decode: DecodeOptions,
}

impl Default for ManagerOptions {
	fn default() -> Self {
		Self {
			content_root: PathBuf::from("."),
			mount_point: "/Game/".to_owned(),
			extensions: vec!["uasset".to_owned(), "umap".to_owned()],
			decode: DecodeOptions::default(),
		}
	}
}

impl ManagerOptions {
	/// Default options rooted at `content_root`.
	pub fn with_content_root(content_root: impl Into<PathBuf>) -> Self {
		Self {
			content_root: content_root.into(),
			..Self::default()
		}
	}
}

/// Exports already entered during one resolution pass, and those that failed to decode.
#[derive(Debug, Default)]
pub struct ResolutionContext {
	visited: HashSet<ExportId>,
	failed: HashSet<ExportId>,
}

impl ResolutionContext {
	/// Fresh, empty pass.
	pub fn new() -> Self {
		Self::default()
	}

	/// Mark `id` visited; returns `false` if it already was.
	pub fn visit(&mut self, id: ExportId) -> bool {
		self.visited.insert(id)
	}

	/// Whether `id` was entered in this pass.
	pub fn is_visited(&self, id: ExportId) -> bool {
		self.visited.contains(&id)
	}

	/// Record that `id` could not be decoded in this pass.
	pub fn fail(&mut self, id: ExportId) {
		self.failed.insert(id);
	}

	/// Whether decoding `id` failed in this pass.
	pub fn is_failed(&self, id: ExportId) -> bool {
		self.failed.contains(&id)
	}

	/// Number of exports entered.
	pub fn len(&self) -> usize {
		self.visited.len()
	}

	/// Whether nothing was entered yet.
	pub fn is_empty(&self) -> bool {
		self.visited.is_empty()
	}
}

/// Decoded export plus the links established during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportObject {
	/// Decoded fields; references are rewritten in place by resolution.
	pub fields: FieldSet,
	/// `Default__<name>` export of the same package.
	pub default: Option<ExportId>,
	/// Resolved super reference.
	pub outer: ObjectRef,
	resolved: bool,
}

#[derive(Debug)]
struct PackageEntry {
	path: PathBuf,
	file: PackageFile,
	exports: Vec<Option<ExportObject>>,
}

/// Package arena: opens and memoizes packages, decodes exports once, and resolves references.
#[derive(Debug, Default)]
pub struct AssetManager {
	options: ManagerOptions,
	packages: Vec<PackageEntry>,
	by_path: HashMap<PathBuf, PackageId>,
	decoded: usize,
}

impl AssetManager {
	/// Empty manager.
	pub fn new(options: ManagerOptions) -> Self {
		Self {
			options,
			..Self::default()
		}
	}

	/// Active options.
	pub fn options(&self) -> &ManagerOptions {
		&self.options
	}

	/// Open `path` once; later calls with the same canonical path return the cached id.
	pub fn open_package(&mut self, path: impl AsRef<Path>) -> Result<PackageId> {
		let key = fs::canonicalize(path.as_ref())?;
		if let Some(id) = self.by_path.get(&key) {
			return Ok(*id);
		}
		let file = PackageFile::open(&key)?;
		Ok(self.register(key, file))
	}

	/// Register an already parsed package under `path`.
	pub fn insert_package(&mut self, path: impl AsRef<Path>, file: PackageFile) -> PackageId {
		let path = path.as_ref();
		let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
		self.register(key, file)
	}

	fn register(&mut self, key: PathBuf, file: PackageFile) -> PackageId {
		let id = PackageId(self.packages.len());
		let exports = vec![None; file.tables.exports.len()];
		log::debug!("package {} registered as #{}", key.display(), id.0);
		self.by_path.insert(key.clone(), id);
		self.packages.push(PackageEntry { path: key, file, exports });
		id
	}

	fn entry(&self, id: PackageId) -> Result<&PackageEntry> {
		self.packages.get(id.0).ok_or(PackageError::IndexOutOfRange {
			kind: "package",
			index: id.0 as i64,
			len: self.packages.len(),
		})
	}

	/// Parsed package `id`.
	pub fn package(&self, id: PackageId) -> Result<&PackageFile> {
		Ok(&self.entry(id)?.file)
	}

	/// Path `id` was registered under.
	pub fn package_path(&self, id: PackageId) -> Result<&Path> {
		Ok(&self.entry(id)?.path)
	}

	/// Number of exports decoded so far across all packages.
	pub fn decoded_count(&self) -> usize {
		self.decoded
	}

	/// Export of `package` named `name`, without decoding it.
	pub fn find_export(&self, package: PackageId, name: &str) -> Result<Option<ExportId>> {
		let tables = &self.package(package)?.tables;
		Ok(tables.find_export(name).map(|slot| ExportId { package, slot }))
	}

	/// First export of `package` whose class is named `class_name`.
	pub fn find_export_by_class(&self, package: PackageId, class_name: &str) -> Result<Option<ExportId>> {
		let tables = &self.package(package)?.tables;
		for slot in 0..tables.exports.len() {
			if tables.object_class_name(ObjectIndex::export(slot))? == class_name {
				return Ok(Some(ExportId { package, slot }));
			}
		}
		Ok(None)
	}

	/// Decode export `name` of `package` and resolve everything it references in one fresh pass.
	pub fn read_export(&mut self, package: PackageId, name: &str) -> Result<Option<ExportId>> {
		let Some(id) = self.find_export(package, name)? else {
			return Ok(None);
		};
		let mut ctx = ResolutionContext::new();
		self.resolve_export(id, &mut ctx)?;
		log::debug!("resolved {} ({} exports visited)", self.full_name(id)?, ctx.len());
		Ok(Some(id))
	}

	/// Decode `id` if needed and rewrite its reference leaves, descending into targets.
	///
	/// Exports already visited in `ctx` are left as they are; an export that failed to
	/// decode keeps failing for the rest of the pass.
	pub fn resolve_export(&mut self, id: ExportId, ctx: &mut ResolutionContext) -> Result<()> {
		if ctx.is_failed(id) {
			return Err(PackageError::UnresolvedReference { path: self.full_name(id)? });
		}
		if !ctx.visit(id) {
			return Ok(());
		}
		if let Err(err) = self.ensure_decoded(id) {
			ctx.fail(id);
			return Err(err);
		}

		let tables = &self.package(id.package)?.tables;
		let export = tables.export(id.slot)?;
		let super_index = export.super_index;
		let default_name = format!("{DEFAULT_OBJECT_PREFIX}{}", export.object_name);
		let default_slot = tables.find_export(&default_name).filter(|slot| *slot != id.slot);

		let Some(object) = self.object_mut(id) else {
			return Ok(());
		};
		if object.resolved {
			return Ok(());
		}
		let mut fields = mem::take(&mut object.fields);

		for value in fields.values_mut() {
			self.resolve_value(id.package, value, ctx);
		}

		let default = default_slot.map(|slot| ExportId { package: id.package, slot }).filter(|default| {
			match self.resolve_export(*default, ctx) {
				Ok(()) => true,
				Err(err) => {
					log::warn!("default object {default_name} not decoded: {err}");
					false
				}
			}
		});
		let outer = self.resolve_index(id.package, super_index, ctx);

		if let Some(object) = self.object_mut(id) {
			object.fields = fields;
			object.default = default;
			object.outer = outer;
			object.resolved = true;
		}
		Ok(())
	}

	fn ensure_decoded(&mut self, id: ExportId) -> Result<()> {
		let entry = self.entry(id.package)?;
		if entry.exports.get(id.slot).is_some_and(Option::is_some) {
			return Ok(());
		}
		let fields = entry.file.decode_export(id.slot, &self.options.decode)?;
		self.decoded += 1;
		if let Some(slot) = self.packages.get_mut(id.package.0).and_then(|entry| entry.exports.get_mut(id.slot)) {
			*slot = Some(ExportObject {
				fields,
				default: None,
				outer: ObjectRef::Null,
				resolved: false,
			});
		}
		Ok(())
	}

	fn resolve_value(&mut self, package: PackageId, value: &mut Value, ctx: &mut ResolutionContext) {
		match value {
			Value::Object(reference) => {
				if let ObjectRef::Index(index) = *reference {
					*reference = self.resolve_index(package, index, ctx);
				}
			}
			Value::Struct(inner) => {
				for field in inner.fields.values_mut() {
					self.resolve_value(package, field, ctx);
				}
			}
			Value::List(items) => {
				for item in items {
					self.resolve_value(package, item, ctx);
				}
			}
			Value::Map(entries) => {
				for entry in entries {
					self.resolve_value(package, &mut entry.value, ctx);
				}
			}
			_ => {}
		}
	}

	/// Resolve a package-local index; failures become [`ObjectRef::Unresolved`].
	fn resolve_index(&mut self, package: PackageId, index: ObjectIndex, ctx: &mut ResolutionContext) -> ObjectRef {
		if index.is_null() {
			return ObjectRef::Null;
		}
		let full_name = match self.package(package).and_then(|file| file.tables.object_full_name(index)) {
			Ok(full_name) => full_name,
			Err(err) => {
				log::warn!("reference {index} not resolvable: {err}");
				return ObjectRef::Unresolved(index.to_string());
			}
		};

		let target = match index.kind() {
			ObjectKind::Null => return ObjectRef::Null,
			ObjectKind::Export(slot) => Ok(ExportId { package, slot }),
			ObjectKind::Import(_) => self.locate_import(package, index),
		};
		let result = target.and_then(|id| self.resolve_export(id, ctx).map(|()| id));
		match result {
			Ok(id) => ObjectRef::Export(id),
			Err(PackageError::UnresolvedReference { path }) => {
				log::debug!("unresolved {full_name}: {path}");
				ObjectRef::Unresolved(full_name)
			}
			Err(err) => {
				log::warn!("unresolved {full_name}: {err}");
				ObjectRef::Unresolved(full_name)
			}
		}
	}

	/// Open the package owning import `index` and find the matching export there.
	fn locate_import(&mut self, package: PackageId, index: ObjectIndex) -> Result<ExportId> {
		let tables = &self.package(package)?.tables;
		let object_name = tables.object_name(index)?;
		let package_name = tables.object_package(index)?;

		let path = self.import_path(&package_name).ok_or(PackageError::UnresolvedReference {
			path: package_name.clone(),
		})?;
		let target = self.open_package(&path)?;
		let slot = self
			.package(target)?
			.tables
			.find_export(&object_name)
			.ok_or(PackageError::ExportNotFound { name: object_name })?;
		Ok(ExportId { package: target, slot })
	}

	/// File under the content root holding `package_name`, if it is mounted and exists.
	pub fn import_path(&self, package_name: &str) -> Option<PathBuf> {
		let relative = Path::new(package_name.strip_prefix(&self.options.mount_point)?);
		if !relative.components().all(|part| matches!(part, Component::Normal(_))) {
			log::warn!("package {package_name} leaves the content root");
			return None;
		}
		self.options
			.extensions
			.iter()
			.map(|ext| self.options.content_root.join(format!("{}.{ext}", relative.display())))
			.find(|candidate| candidate.is_file())
	}

	/// Decoded export `id`, if it was decoded.
	pub fn object(&self, id: ExportId) -> Option<&ExportObject> {
		self.packages.get(id.package.0)?.exports.get(id.slot)?.as_ref()
	}

	fn object_mut(&mut self, id: ExportId) -> Option<&mut ExportObject> {
		self.packages.get_mut(id.package.0)?.exports.get_mut(id.slot)?.as_mut()
	}

	/// Decoded fields of `id`.
	pub fn fields(&self, id: ExportId) -> Option<&FieldSet> {
		self.object(id).map(|object| &object.fields)
	}

	/// Fields behind a resolved reference or an inline struct value.
	pub fn deref<'m>(&'m self, value: &'m Value) -> Option<&'m FieldSet> {
		match value {
			Value::Object(ObjectRef::Export(id)) => self.fields(*id),
			Value::Struct(inner) => Some(&inner.fields),
			_ => None,
		}
	}

	/// `"<class> <path>"` of `id`.
	pub fn full_name(&self, id: ExportId) -> Result<String> {
		self.package(id.package)?.tables.object_full_name(ObjectIndex::export(id.slot))
	}

	/// Full name of `id` plus its super or template path.
	pub fn decl_name(&self, id: ExportId) -> Result<String> {
		self.package(id.package)?.tables.object_decl_name(ObjectIndex::export(id.slot))
	}
}
