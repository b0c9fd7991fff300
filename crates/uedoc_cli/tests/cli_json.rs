#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use uedoc_testkit::{ExportSpec, ImportSpec, PackageBuilder, scratch_dir};

#[test]
fn dump_json_renders_fields_and_references() {
	let dir = scratch_dir("cli-dump");
	let asset = rifle_package(&dir);
	let json = run_json(&["dump", path_arg(&asset).as_str(), "--content-root", path_arg(&dir).as_str()]);

	let rifle = &json["BlueprintGeneratedClass Rifle_C"];
	assert_eq!(rifle["Damage"], 40);
	assert_eq!(rifle["Label"], "Rifle");
	assert_eq!(rifle["Native"], "Class /Script/Engine.Actor");
	assert_eq!(rifle["SimpleConstructionScript"], "None Rifle_SCS");
	assert_eq!(rifle["Tuning"]["type"], "Tuning");
	assert_eq!(rifle["Tuning"]["fields"]["Spread"], 0.5);
	assert!(json["None Muzzle_GEN_VARIABLE"].is_object(), "every export is dumped");
}

#[test]
fn dump_single_export() {
	let dir = scratch_dir("cli-dump-one");
	let asset = rifle_package(&dir);
	let json = run_json(&["dump", path_arg(&asset).as_str(), "--export", "Node_Muzzle"]);

	let keys: Vec<&String> = json.as_object().expect("top-level object").keys().collect();
	assert_eq!(keys, ["None Node_Muzzle"]);
	assert_eq!(json["None Node_Muzzle"]["InternalVariableName"], "Muzzle");
}

#[test]
fn info_json_lists_tables() {
	let dir = scratch_dir("cli-info");
	let asset = rifle_package(&dir);
	let json = run_json(&["info", path_arg(&asset).as_str(), "--json"]);

	assert_eq!(json["file_version_ue4"], 522);
	assert_eq!(json["filter_editor_only"], true);
	assert!(json["bulk_start"].is_u64(), "split package reports its overflow start");
	assert!(
		json["imports"]
			.as_array()
			.is_some_and(|items| items.iter().any(|item| item == "Class /Script/Engine.Actor"))
	);
	assert_eq!(json["exports"].as_array().map(Vec::len), Some(4));
	assert_eq!(json["exports"][0]["decl"], "BlueprintGeneratedClass Rifle_C");
}

#[test]
fn component_json_reports_template_fields() {
	let dir = scratch_dir("cli-component");
	let asset = rifle_package(&dir);
	let json = run_json(&[
		"component",
		path_arg(&asset).as_str(),
		"--content-root",
		path_arg(&dir).as_str(),
		"--name",
		"Muzzle",
	]);

	assert_eq!(json["object"], "BlueprintGeneratedClass Rifle_C");
	assert_eq!(json["component"], "Muzzle");
	assert_eq!(json["fields"]["Flash"], true);
	assert_eq!(json["fields"]["Offset"], 12);
}

#[test]
fn broken_package_fails_with_message() {
	let dir = scratch_dir("cli-broken");
	let asset = dir.join("Broken.uasset");
	fs::write(&asset, [0_u8; 16]).expect("fixture writes");

	let output = run_uedoc(&["dump", path_arg(&asset).as_str()]);
	assert!(!output.status.success(), "invalid magic must fail");
	assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

/// Export slots: 1 `Rifle_C`, 2 `Rifle_SCS`, 3 `Node_Muzzle`, 4 `Muzzle_GEN_VARIABLE`.
fn rifle_package(dir: &Path) -> PathBuf {
	let mut b = PackageBuilder::new();
	let engine = b.import(ImportSpec::package("/Script/Engine"));
	let bpgc = b.import(ImportSpec::new("/Script/CoreUObject", "Class", engine, "BlueprintGeneratedClass"));
	let actor = b.import(ImportSpec::new("/Script/CoreUObject", "Class", engine, "Actor"));

	let mut w = b.writer();
	w.int("Damage", 40)
		.string("Label", "Rifle")
		.object("Native", actor)
		.object("SimpleConstructionScript", 2)
		.structure("Tuning", "Tuning", |w| {
			w.float("Spread", 0.5);
		})
		.none();
	let data = w.finish();
	b.export(ExportSpec::new("Rifle_C", bpgc, data));

	let mut w = b.writer();
	w.array("AllNodes", "ObjectProperty", 1, |w| {
		w.raw_i32(3);
	})
	.none();
	let data = w.finish();
	b.export(ExportSpec::new("Rifle_SCS", 0, data));

	let mut w = b.writer();
	w.name("InternalVariableName", "Muzzle").object("ComponentTemplate", 4).none();
	let data = w.finish();
	b.export(ExportSpec::new("Node_Muzzle", 0, data));

	let mut w = b.writer();
	w.boolean("Flash", true).int("Offset", 12).none();
	let data = w.finish();
	b.export(ExportSpec::new("Muzzle_GEN_VARIABLE", 0, data));

	b.write_split(dir, "Rifle")
}

fn path_arg(path: &Path) -> String {
	path.display().to_string()
}

fn run_uedoc(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_uedoc")).args(args).output().expect("uedoc command executes")
}

fn run_json(args: &[&str]) -> Value {
	let output = run_uedoc(args);
	assert!(
		output.status.success(),
		"uedoc command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}
