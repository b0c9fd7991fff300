use std::path::PathBuf;

use serde_json::{Map, Value as JsonValue, json};
use uedoc::pkg::{AssetManager, ExportId, ManagerOptions, PackageError, ResolutionContext, Result};

use crate::cmd::util::{emit_json, fields_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub export: Option<String>,
	#[arg(long = "content-root", default_value = ".")]
	pub content_root: PathBuf,
	#[arg(long = "mount-point")]
	pub mount_point: Option<String>,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long)]
	pub strict: bool,
}

/// Decode exports and print them as JSON keyed by declaration name.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		export,
		content_root,
		mount_point,
		max_depth,
		strict,
	} = args;

	let mut options = ManagerOptions::with_content_root(content_root);
	if let Some(mount_point) = mount_point {
		options.mount_point = mount_point;
	}
	if let Some(max_depth) = max_depth {
		options.decode.max_depth = max_depth;
	}
	options.decode.strict = strict;

	let mut manager = AssetManager::new(options);
	let package = manager.open_package(&path)?;

	let slots: Vec<usize> = match export {
		Some(name) => {
			let id = manager.find_export(package, &name)?.ok_or(PackageError::ExportNotFound { name })?;
			vec![id.slot]
		}
		None => (0..manager.package(package)?.tables.exports.len()).collect(),
	};

	let mut ctx = ResolutionContext::new();
	let mut out = Map::new();
	for slot in slots {
		let id = ExportId { package, slot };
		let rendered = match manager.resolve_export(id, &mut ctx) {
			Ok(()) => manager.fields(id).map_or(JsonValue::Null, |fields| fields_json(&manager, fields)),
			Err(err) if !strict => {
				log::warn!("export #{slot} not decoded: {err}");
				json!({ "error": err.to_string() })
			}
			Err(err) => return Err(err),
		};
		out.insert(manager.decl_name(id)?, rendered);
	}

	emit_json(&JsonValue::Object(out));
	Ok(())
}
