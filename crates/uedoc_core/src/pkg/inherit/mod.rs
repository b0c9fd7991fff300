use std::collections::HashSet;

use crate::pkg::{AssetManager, ExportId, FieldSet, MapEntry, ObjectRef, StructValue, Value};

/// Overlay `sub` on `base`.
///
/// Base-only and sub-only fields are copied. Fields present in both are merged
/// recursively when both are tagged structs of the same type or both are maps;
/// every other pair keeps the `sub` value, references and lists included.
pub fn merge(sub: &FieldSet, base: &FieldSet) -> FieldSet {
	let mut out = base.clone();
	for (name, sub_value) in sub.iter() {
		let value = match base.get(name) {
			Some(base_value) => merge_value(sub_value, base_value),
			None => sub_value.clone(),
		};
		out.set(name, value);
	}
	out
}

fn merge_value(sub: &Value, base: &Value) -> Value {
	match (sub, base) {
		(Value::Struct(sub), Value::Struct(base)) if !sub.fixed && !base.fixed && sub.type_name == base.type_name => Value::Struct(StructValue {
			type_name: sub.type_name.clone(),
			fixed: false,
			fields: merge(&sub.fields, &base.fields),
		}),
		(Value::Map(sub), Value::Map(base)) => Value::Map(merge_entries(sub, base)),
		_ => sub.clone(),
	}
}

fn merge_entries(sub: &[MapEntry], base: &[MapEntry]) -> Vec<MapEntry> {
	let mut out = base.to_vec();
	for entry in sub {
		match out.iter_mut().find(|existing| existing.key == entry.key) {
			Some(existing) => existing.value = merge_value(&entry.value, &existing.value),
			None => out.push(entry.clone()),
		}
	}
	out
}

/// Construction-script property on blueprint classes.
const CONSTRUCTION_SCRIPT: &str = "SimpleConstructionScript";
/// Inherited component override holder on blueprint classes.
const COMPONENT_HANDLER: &str = "InheritableComponentHandler";

/// Effective fields of component `name` as seen from `object`.
///
/// Looks in the construction script, then the inherited component overrides
/// (merged over the outer's component), then recurses on the outer.
pub fn find_component(manager: &AssetManager, object: ExportId, name: &str) -> Option<FieldSet> {
	let mut seen = HashSet::new();
	find_component_in(manager, object, name, &mut seen)
}

fn find_component_in(manager: &AssetManager, object: ExportId, name: &str, seen: &mut HashSet<ExportId>) -> Option<FieldSet> {
	if !seen.insert(object) {
		return None;
	}
	let export = manager.object(object)?;

	if let Some(found) = from_construction_script(manager, &export.fields, name) {
		return Some(found);
	}

	let outer = match export.outer {
		ObjectRef::Export(outer) => Some(outer),
		_ => None,
	};

	let records = export
		.fields
		.get(COMPONENT_HANDLER)
		.and_then(|handler| manager.deref(handler))
		.and_then(|handler| handler.get("Records"))
		.and_then(Value::as_list)
		.unwrap_or_default();
	for record in records {
		let Some(record) = manager.deref(record) else {
			continue;
		};
		let key = record
			.get("ComponentKey")
			.and_then(|key| manager.deref(key))
			.and_then(|key| key.get("SCSVariableName"))
			.and_then(Value::as_str);
		if key != Some(name) {
			continue;
		}
		let template = record.get("ComponentTemplate").and_then(|template| manager.deref(template))?;
		let base = outer.and_then(|outer| find_component_in(manager, outer, name, seen));
		return Some(match base {
			Some(base) => merge(template, &base),
			None => template.clone(),
		});
	}

	find_component_in(manager, outer?, name, seen)
}

fn from_construction_script(manager: &AssetManager, fields: &FieldSet, name: &str) -> Option<FieldSet> {
	let nodes = fields
		.get(CONSTRUCTION_SCRIPT)
		.and_then(|script| manager.deref(script))?
		.get("AllNodes")?
		.as_list()?;

	let node = nodes
		.iter()
		.filter_map(|node| manager.deref(node))
		.find(|node| node.get("InternalVariableName").and_then(Value::as_str) == Some(name))?;

	let template = node.get("ComponentTemplate").and_then(|template| manager.deref(template))?;
	let class_default = match node.get("ComponentClass") {
		Some(Value::Object(ObjectRef::Export(class))) => manager.object(*class).and_then(|class| class.default).and_then(|default| manager.fields(default)),
		_ => None,
	};
	Some(match class_default {
		Some(base) => merge(template, base),
		None => template.clone(),
	})
}

#[cfg(test)]
mod tests;
