use uedoc_testkit::{ExportSpec, ImportSpec, PackageBuilder, PropertyWriter};

use super::{find_component, merge};
use crate::pkg::{
	AssetManager, ExportId, FieldSet, ManagerOptions, MapEntry, ObjectIndex, ObjectRef, PackageFile, PackageId, RawField, StructValue, Value,
};

fn set(fields: Vec<(&str, Value)>) -> FieldSet {
	FieldSet::from_raw(
		fields
			.into_iter()
			.map(|(name, value)| RawField {
				name: name.to_owned(),
				array_index: 0,
				value,
			})
			.collect(),
	)
	.expect("unique names")
}

fn reference(index: i32) -> Value {
	Value::Object(ObjectRef::Index(ObjectIndex(index)))
}

fn tagged(type_name: &str, fields: FieldSet) -> Value {
	Value::Struct(StructValue {
		type_name: type_name.to_owned(),
		fixed: false,
		fields,
	})
}

#[test]
fn references_are_never_field_merged() {
	let sub = set(vec![("X", reference(1)), ("Y", Value::I64(5))]);
	let base = set(vec![("X", reference(2)), ("Y", Value::I64(1)), ("Z", Value::I64(2))]);

	let merged = merge(&sub, &base);
	assert_eq!(merged, set(vec![("X", reference(1)), ("Y", Value::I64(5)), ("Z", Value::I64(2))]));
}

#[test]
fn nested_tagged_structs_merge_recursively() {
	let sub = set(vec![("Tuning", tagged("Tuning", set(vec![("Damage", Value::I64(40))])))]);
	let base = set(vec![(
		"Tuning",
		tagged("Tuning", set(vec![("Damage", Value::I64(20)), ("Range", Value::F32(1000.0))])),
	)]);

	let merged = merge(&sub, &base);
	let tuning = merged.get("Tuning").and_then(Value::as_fields).expect("tuning struct");
	assert_eq!(tuning.get("Damage"), Some(&Value::I64(40)));
	assert_eq!(tuning.get("Range"), Some(&Value::F32(1000.0)));
}

#[test]
fn fixed_structs_and_lists_keep_sub_value() {
	let fixed = |x: f32| {
		Value::Struct(StructValue {
			type_name: "Vector".to_owned(),
			fixed: true,
			fields: set(vec![("X", Value::F32(x))]),
		})
	};
	let sub = set(vec![("Offset", fixed(1.0)), ("Tags", Value::List(vec![Value::I64(1)]))]);
	let base = set(vec![("Offset", fixed(2.0)), ("Tags", Value::List(vec![Value::I64(2), Value::I64(3)]))]);

	let merged = merge(&sub, &base);
	assert_eq!(merged.get("Offset"), Some(&fixed(1.0)));
	assert_eq!(merged.get("Tags"), Some(&Value::List(vec![Value::I64(1)])));
}

#[test]
fn maps_merge_by_key() {
	let entry = |key: &str, value: i64| MapEntry {
		key: Value::Name(key.to_owned()),
		value: Value::I64(value),
	};
	let sub = set(vec![("Ammo", Value::Map(vec![entry("Heavy", 5), entry("Shell", 8)]))]);
	let base = set(vec![("Ammo", Value::Map(vec![entry("Light", 30), entry("Heavy", 10)]))]);

	let merged = merge(&sub, &base);
	let ammo = merged.get("Ammo").expect("ammo map");
	assert_eq!(ammo.as_map().map(<[_]>::len), Some(3));
	assert_eq!(ammo.map_get("Light"), Some(&Value::I64(30)));
	assert_eq!(ammo.map_get("Heavy"), Some(&Value::I64(5)));
	assert_eq!(ammo.map_get("Shell"), Some(&Value::I64(8)));
}

/// Export indices of the blueprint fixture, in table order.
mod idx {
	pub const RIFLE: i32 = 1;
	pub const RIFLE_SCS: i32 = 2;
	pub const MAG_NODE: i32 = 3;
	pub const MAG_TEMPLATE: i32 = 4;
	pub const RIFLE_ICH: i32 = 5;
	pub const BASE: i32 = 6;
	pub const MAG_CLASS: i32 = 7;
	pub const STOCK_OVERRIDE: i32 = 8;
	pub const BASE_SCS: i32 = 9;
	pub const MAG_DEFAULT: i32 = 10;
	pub const STOCK_NODE: i32 = 11;
	pub const STOCK_TEMPLATE: i32 = 12;
	pub const GRIP_NODE: i32 = 13;
	pub const GRIP_TEMPLATE: i32 = 14;
}

fn export(builder: &mut PackageBuilder, spec: ExportSpec, body: impl FnOnce(&mut PropertyWriter<'_>)) -> i32 {
	let mut w = builder.writer();
	body(&mut w);
	w.none();
	let data = w.finish();
	builder.export(ExportSpec { data, ..spec })
}

fn plain(name: &str) -> ExportSpec {
	ExportSpec::new(name, 0, Vec::new())
}

fn objects(w: &mut PropertyWriter<'_>, name: &str, targets: &[i32]) {
	w.array(name, "ObjectProperty", targets.len() as i32, |w| {
		for target in targets {
			w.raw_i32(*target);
		}
	});
}

fn blueprint_fixture() -> (AssetManager, PackageId, ExportId) {
	let mut b = PackageBuilder::new();
	let engine = b.import(ImportSpec::package("/Script/Engine"));
	let bpgc = b.import(ImportSpec::new("/Script/CoreUObject", "Class", engine, "BlueprintGeneratedClass"));

	let rifle = export(&mut b, ExportSpec::new("Rifle_C", bpgc, Vec::new()).with_super(idx::BASE), |w| {
		w.object("SimpleConstructionScript", idx::RIFLE_SCS);
		w.object("InheritableComponentHandler", idx::RIFLE_ICH);
	});
	export(&mut b, plain("Rifle_SCS"), |w| objects(w, "AllNodes", &[idx::MAG_NODE]));
	export(&mut b, plain("Node_Magazine"), |w| {
		w.name("InternalVariableName", "Magazine");
		w.object("ComponentClass", idx::MAG_CLASS);
		w.object("ComponentTemplate", idx::MAG_TEMPLATE);
	});
	export(&mut b, plain("Magazine_GEN_VARIABLE"), |w| {
		w.int("Capacity", 30);
	});
	export(&mut b, plain("Rifle_ICH"), |w| {
		w.struct_array("Records", "ComponentOverrideRecord", 1, |w| {
			w.structure("ComponentKey", "ComponentKey", |w| {
				w.name("SCSVariableName", "Stock");
			});
			w.object("ComponentTemplate", idx::STOCK_OVERRIDE);
			w.none();
		});
	});
	let base = export(&mut b, ExportSpec::new("Base_C", bpgc, Vec::new()), |w| {
		w.object("SimpleConstructionScript", idx::BASE_SCS);
	});
	export(&mut b, plain("MagazineComponent_C"), |_| {});
	export(&mut b, plain("Stock_ICH_Template"), |w| {
		w.float("Recoil", 0.5);
	});
	export(&mut b, plain("Base_SCS"), |w| objects(w, "AllNodes", &[idx::STOCK_NODE, idx::GRIP_NODE]));
	let default = export(&mut b, ExportSpec::new("Default__MagazineComponent_C", idx::MAG_CLASS, Vec::new()), |w| {
		w.int("Capacity", 10).float("ReloadTime", 2.0);
	});
	export(&mut b, plain("Node_Stock"), |w| {
		w.name("InternalVariableName", "Stock");
		w.object("ComponentTemplate", idx::STOCK_TEMPLATE);
	});
	export(&mut b, plain("Stock_GEN_VARIABLE"), |w| {
		w.float("Recoil", 1.0).int("Weight", 3);
	});
	export(&mut b, plain("Node_Grip"), |w| {
		w.name("InternalVariableName", "Grip");
		w.object("ComponentTemplate", idx::GRIP_TEMPLATE);
	});
	let grip = export(&mut b, plain("Grip_GEN_VARIABLE"), |w| {
		w.int("Angle", 15);
	});
	assert_eq!((rifle, base, default, grip), (idx::RIFLE, idx::BASE, idx::MAG_DEFAULT, idx::GRIP_TEMPLATE));

	let file = PackageFile::from_bytes(b.build()).expect("fixture parses");
	let mut manager = AssetManager::new(ManagerOptions::default());
	let package = manager.insert_package("mem/Rifle.uasset", file);
	let id = manager.read_export(package, "Rifle_C").expect("fixture resolves").expect("rifle exists");
	(manager, package, id)
}

#[test]
fn construction_script_component_merges_class_default() {
	let (manager, _, rifle) = blueprint_fixture();
	let magazine = find_component(&manager, rifle, "Magazine").expect("magazine present");
	assert_eq!(magazine.get("Capacity"), Some(&Value::I64(30)));
	assert_eq!(magazine.get("ReloadTime"), Some(&Value::F32(2.0)));
}

#[test]
fn override_record_merges_over_outer_component() {
	let (manager, package, rifle) = blueprint_fixture();
	let outer = manager.object(rifle).map(|object| object.outer.clone());
	assert_eq!(
		outer,
		Some(ObjectRef::Export(ExportId {
			package,
			slot: (idx::BASE - 1) as usize
		}))
	);

	let stock = find_component(&manager, rifle, "Stock").expect("stock present");
	assert_eq!(stock.get("Recoil"), Some(&Value::F32(0.5)));
	assert_eq!(stock.get("Weight"), Some(&Value::I64(3)));
}

#[test]
fn outer_components_are_inherited() {
	let (manager, _, rifle) = blueprint_fixture();
	let grip = find_component(&manager, rifle, "Grip").expect("grip inherited");
	assert_eq!(grip.get("Angle"), Some(&Value::I64(15)));
	assert!(find_component(&manager, rifle, "Barrel").is_none());
}
