use crate::pkg::{FieldSet, PackageError, RawField, Value};

fn raw(name: &str, array_index: u32, value: i64) -> RawField {
	RawField {
		name: name.to_owned(),
		array_index,
		value: Value::I64(value),
	}
}

#[test]
fn unique_names_stay_bare() {
	let set = FieldSet::from_raw(vec![raw("Health", 0, 100), raw("Armor", 0, 5)]).expect("set builds");
	assert_eq!(set.names().collect::<Vec<_>>(), ["Health", "Armor"]);
	assert_eq!(set.get("Health"), Some(&Value::I64(100)));
}

#[test]
fn repeated_names_are_indexed_retroactively() {
	let set = FieldSet::from_raw(vec![raw("Foo", 0, 1), raw("Bar", 0, 9), raw("Foo", 1, 2), raw("Foo", 2, 3)]).expect("set builds");
	assert_eq!(set.names().collect::<Vec<_>>(), ["Foo[0]", "Bar", "Foo[1]", "Foo[2]"]);
	assert!(!set.contains("Foo"));
	assert_eq!(set.get("Foo[2]"), Some(&Value::I64(3)));
}

#[test]
fn lone_nonzero_array_index_is_kept() {
	let set = FieldSet::from_raw(vec![raw("Slot", 3, 7)]).expect("set builds");
	assert_eq!(set.names().collect::<Vec<_>>(), ["Slot[3]"]);
}

#[test]
fn colliding_final_keys_are_rejected() {
	let err = FieldSet::from_raw(vec![raw("Foo", 1, 1), raw("Foo", 1, 2)]).expect_err("duplicate key");
	assert!(matches!(err, PackageError::DuplicateField { name } if name == "Foo[1]"));

	let mut set = FieldSet::new();
	set.insert("A", Value::Bool(true)).expect("first insert");
	assert!(matches!(set.insert("A", Value::Bool(false)), Err(PackageError::DuplicateField { .. })));
}

#[test]
fn get_or_falls_back() {
	let set = FieldSet::from_raw(vec![raw("Health", 0, 100)]).expect("set builds");
	let fallback = Value::I64(-1);
	assert_eq!(set.get_or("Health", &fallback), &Value::I64(100));
	assert_eq!(set.get_or("Missing", &fallback), &fallback);
	assert_eq!(set.len(), 1);
	assert!(!set.is_empty());
}
