use std::collections::HashMap;

use crate::pkg::{PackageError, Result, Value};

/// One decoded field before name disambiguation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
	/// Property name from the tag.
	pub name: String,
	/// Static array index from the tag.
	pub array_index: u32,
	/// Decoded value.
	pub value: Value,
}

/// Ordered field mapping with unique, disambiguated names.
///
/// A field is keyed `Name[i]` when another field shares its base name or its
/// array index is non-zero, otherwise `Name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
	entries: Vec<(String, Value)>,
}

impl FieldSet {
	/// Empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from raw fields in stream order.
	pub fn from_raw(raw: Vec<RawField>) -> Result<Self> {
		let mut counts: HashMap<&str, usize> = HashMap::new();
		for field in &raw {
			*counts.entry(field.name.as_str()).or_default() += 1;
		}
		let keys: Vec<String> = raw
			.iter()
			.map(|field| {
				if counts.get(field.name.as_str()).copied().unwrap_or(0) > 1 || field.array_index != 0 {
					format!("{}[{}]", field.name, field.array_index)
				} else {
					field.name.clone()
				}
			})
			.collect();

		let mut set = Self {
			entries: Vec::with_capacity(raw.len()),
		};
		for (key, field) in keys.into_iter().zip(raw) {
			set.insert(key, field.value)?;
		}
		Ok(set)
	}

	/// Value stored under `name`.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.entries.iter().find(|(key, _)| key == name).map(|(_, value)| value)
	}

	/// Mutable value stored under `name`.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.entries.iter_mut().find(|(key, _)| key == name).map(|(_, value)| value)
	}

	/// Value stored under `name`, or `default` when absent.
	pub fn get_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
		self.get(name).unwrap_or(default)
	}

	/// Whether `name` is present.
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Append a field; fails when the key is already present.
	pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
		let name = name.into();
		if self.contains(&name) {
			return Err(PackageError::DuplicateField { name });
		}
		self.entries.push((name, value));
		Ok(())
	}

	/// Replace the value under `name`, or append it; returns the previous value.
	pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
		let name = name.into();
		match self.get_mut(&name) {
			Some(slot) => Some(std::mem::replace(slot, value)),
			None => {
				self.entries.push((name, value));
				None
			}
		}
	}

	/// Fields in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Mutable values in insertion order.
	pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
		self.entries.iter_mut().map(|(_, value)| value)
	}

	/// Field names in insertion order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(key, _)| key.as_str())
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the set has no fields.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl IntoIterator for FieldSet {
	type Item = (String, Value);
	type IntoIter = std::vec::IntoIter<(String, Value)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

#[cfg(test)]
mod tests;
