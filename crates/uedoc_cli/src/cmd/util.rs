use serde_json::{Map, Value as JsonValue, json};
use uedoc::pkg::{AssetManager, FieldSet, ObjectRef, Value};

/// Print `payload` as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => log::error!("json encode failed: {err}"),
	}
}

/// Render a field set as a JSON object.
pub(crate) fn fields_json(manager: &AssetManager, fields: &FieldSet) -> JsonValue {
	let out: Map<String, JsonValue> = fields.iter().map(|(name, value)| (name.to_owned(), value_json(manager, value))).collect();
	JsonValue::Object(out)
}

/// Render one decoded value; object references become full names.
pub(crate) fn value_json(manager: &AssetManager, value: &Value) -> JsonValue {
	match value {
		Value::Bool(v) => json!(v),
		Value::I64(v) => json!(v),
		Value::U64(v) => json!(v),
		Value::F32(v) => json!(v),
		Value::F64(v) => json!(v),
		Value::Str(v) | Value::Name(v) | Value::Enum(v) => json!(v),
		Value::Text(text) => json!(text.display()),
		Value::Struct(item) => {
			let mut out = Map::new();
			out.insert("type".to_owned(), json!(item.type_name));
			out.insert("fields".to_owned(), fields_json(manager, &item.fields));
			JsonValue::Object(out)
		}
		Value::List(items) => JsonValue::Array(items.iter().map(|item| value_json(manager, item)).collect()),
		Value::Map(entries) => JsonValue::Array(
			entries
				.iter()
				.map(|entry| json!({ "key": value_json(manager, &entry.key), "value": value_json(manager, &entry.value) }))
				.collect(),
		),
		Value::Object(reference) => reference_json(manager, reference),
		Value::SoftObject(path) => json!({ "asset_path": path.asset_path, "sub_path": path.sub_path }),
		Value::FieldPath(path) => json!({ "path": path.path.join("."), "owner": reference_json(manager, &path.owner) }),
		Value::Skipped { struct_name } => json!({ "skipped": struct_name }),
		Value::Unhandled { type_name } => json!({ "unhandled": type_name }),
	}
}

fn reference_json(manager: &AssetManager, reference: &ObjectRef) -> JsonValue {
	match reference {
		ObjectRef::Null => JsonValue::Null,
		ObjectRef::Index(index) => json!(index.to_string()),
		ObjectRef::Export(id) => match manager.full_name(*id) {
			Ok(name) => json!(name),
			Err(err) => {
				log::warn!("no full name for {id:?}: {err}");
				JsonValue::Null
			}
		},
		ObjectRef::Unresolved(full_name) => json!(full_name),
	}
}
