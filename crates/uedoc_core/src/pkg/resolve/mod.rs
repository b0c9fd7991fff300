use std::fmt;

use crate::pkg::{PackageError, PackageTables, Result};

/// Signed object reference: `>0` export, `<0` import, `0` null (both 1-based).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIndex(pub i32);

/// Decoded target table of an [`ObjectIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
	/// Null reference.
	Null,
	/// 0-based export slot.
	Export(usize),
	/// 0-based import slot.
	Import(usize),
}

impl ObjectIndex {
	/// Null reference.
	pub const NULL: Self = Self(0);

	/// Reference to a 0-based export slot.
	pub fn export(slot: usize) -> Self {
		Self(slot as i32 + 1)
	}

	/// Reference to a 0-based import slot.
	pub fn import(slot: usize) -> Self {
		Self(-(slot as i32) - 1)
	}

	/// Split into table and 0-based slot.
	pub fn kind(self) -> ObjectKind {
		match self.0 {
			0 => ObjectKind::Null,
			value if value > 0 => ObjectKind::Export((value - 1) as usize),
			value => ObjectKind::Import((-(i64::from(value)) - 1) as usize),
		}
	}

	/// Whether this is the null reference.
	pub fn is_null(self) -> bool {
		self.0 == 0
	}
}

impl fmt::Display for ObjectIndex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

const NONE: &str = "None";

impl PackageTables {
	/// Object name of `index` (`"None"` for null).
	pub fn object_name(&self, index: ObjectIndex) -> Result<String> {
		match index.kind() {
			ObjectKind::Null => Ok(NONE.to_owned()),
			ObjectKind::Export(slot) => Ok(self.export(slot)?.object_name.clone()),
			ObjectKind::Import(slot) => Ok(self.import(slot)?.object_name.clone()),
		}
	}

	/// Outer reference of `index` (null for null).
	pub fn object_outer(&self, index: ObjectIndex) -> Result<ObjectIndex> {
		match index.kind() {
			ObjectKind::Null => Ok(ObjectIndex::NULL),
			ObjectKind::Export(slot) => Ok(self.export(slot)?.outer_index),
			ObjectKind::Import(slot) => Ok(self.import(slot)?.outer_index),
		}
	}

	/// Class name of `index`: the import's class name, or the name of the export's class object.
	pub fn object_class_name(&self, index: ObjectIndex) -> Result<String> {
		match index.kind() {
			ObjectKind::Null => Ok(NONE.to_owned()),
			ObjectKind::Export(slot) => self.object_name(self.export(slot)?.class_index),
			ObjectKind::Import(slot) => Ok(self.import(slot)?.class_name.clone()),
		}
	}

	/// Dot-separated path from the outermost object down to `index`.
	pub fn object_path(&self, index: ObjectIndex) -> Result<String> {
		if index.is_null() {
			return Ok(NONE.to_owned());
		}
		let chain = self.outer_chain(index)?;
		let mut parts = Vec::with_capacity(chain.len());
		for item in chain.iter().rev() {
			parts.push(self.object_name(*item)?);
		}
		Ok(parts.join("."))
	}

	/// `"<class> <path>"` for `index`.
	pub fn object_full_name(&self, index: ObjectIndex) -> Result<String> {
		if index.is_null() {
			return Ok(NONE.to_owned());
		}
		Ok(format!("{} {}", self.object_class_name(index)?, self.object_path(index)?))
	}

	/// Full name plus `" : <super>"` (or `" : <template>"`) for exports.
	pub fn object_decl_name(&self, index: ObjectIndex) -> Result<String> {
		let mut name = self.object_full_name(index)?;
		if let ObjectKind::Export(slot) = index.kind() {
			let export = self.export(slot)?;
			if !export.super_index.is_null() {
				name.push_str(&format!(" : {}", self.object_path(export.super_index)?));
			} else if !export.template_index.is_null() && export.template_index != index {
				name.push_str(&format!(" : {}", self.object_path(export.template_index)?));
			}
		}
		Ok(name)
	}

	/// Name of the outermost object containing `index` (usually its package).
	pub fn object_package(&self, index: ObjectIndex) -> Result<String> {
		let chain = self.outer_chain(index)?;
		match chain.last() {
			Some(outermost) => self.object_name(*outermost),
			None => Ok(NONE.to_owned()),
		}
	}

	/// `index` followed by each outer up to (excluding) null.
	///
	/// A chain longer than the combined table sizes cannot terminate.
	fn outer_chain(&self, index: ObjectIndex) -> Result<Vec<ObjectIndex>> {
		let limit = self.exports.len() + self.imports.len();
		let mut chain = Vec::new();
		let mut current = index;
		while !current.is_null() {
			let outer = self.object_outer(current)?;
			chain.push(current);
			if chain.len() > limit {
				return Err(PackageError::OuterChainCycle { index: index.0 });
			}
			current = outer;
		}
		Ok(chain)
	}
}
