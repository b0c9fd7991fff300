use std::path::PathBuf;

use uedoc::pkg::{ObjectIndex, PKG_FILTER_EDITOR_ONLY, PackageFile, Result};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print the package summary plus import and export listings.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let package = PackageFile::open(&path)?;
	let summary = &package.summary;
	let tables = &package.tables;

	let mut imports = Vec::with_capacity(tables.imports.len());
	for slot in 0..tables.imports.len() {
		imports.push(tables.object_full_name(ObjectIndex::import(slot))?);
	}
	let mut exports = Vec::with_capacity(tables.exports.len());
	for (slot, export) in tables.exports.iter().enumerate() {
		exports.push(ExportJson {
			decl: tables.object_decl_name(ObjectIndex::export(slot))?,
			serial_offset: export.serial_offset,
			serial_size: export.serial_size,
		});
	}

	let payload = InfoJson {
		path: path.display().to_string(),
		legacy_version: summary.legacy_version,
		file_version_ue4: summary.file_version_ue4,
		file_version_ue5: summary.file_version_ue5,
		licensee_version: summary.licensee_version,
		package_flags: summary.package_flags,
		filter_editor_only: summary.package_flags & PKG_FILTER_EDITOR_ONLY != 0,
		folder_name: summary.folder_name.clone(),
		name_count: tables.names.len(),
		bulk_start: package.bulk_start(),
		imports,
		exports,
	};

	if json {
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", payload.path);
	println!("legacy_version: {}", payload.legacy_version);
	println!("file_version_ue4: {}", payload.file_version_ue4);
	if let Some(ue5) = payload.file_version_ue5 {
		println!("file_version_ue5: {ue5}");
	}
	println!("licensee_version: {}", payload.licensee_version);
	println!("package_flags: 0x{:08x}", payload.package_flags);
	println!("filter_editor_only: {}", payload.filter_editor_only);
	println!("names: {}", payload.name_count);
	match payload.bulk_start {
		Some(start) => println!("uexp_start: {start}"),
		None => println!("uexp_start: none"),
	}
	println!("imports: {}", payload.imports.len());
	for import in &payload.imports {
		println!("  {import}");
	}
	println!("exports: {}", payload.exports.len());
	for export in &payload.exports {
		println!("  {} @ {} size {}", export.decl, export.serial_offset, export.serial_size);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	legacy_version: i32,
	file_version_ue4: i32,
	#[serde(skip_serializing_if = "Option::is_none")]
	file_version_ue5: Option<i32>,
	licensee_version: i32,
	package_flags: u32,
	filter_editor_only: bool,
	folder_name: String,
	name_count: usize,
	bulk_start: Option<usize>,
	imports: Vec<String>,
	exports: Vec<ExportJson>,
}

#[derive(serde::Serialize)]
struct ExportJson {
	decl: String,
	serial_offset: u64,
	serial_size: u64,
}
