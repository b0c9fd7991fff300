use std::path::PathBuf;

use uedoc::pkg::{AssetManager, ManagerOptions, PackageError, ResolutionContext, Result, find_component};

use crate::cmd::util::{emit_json, fields_json};

/// Class searched for when `--class` is not given.
const DEFAULT_CLASS: &str = "BlueprintGeneratedClass";

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long = "content-root")]
	pub content_root: PathBuf,
	#[arg(long)]
	pub name: String,
	#[arg(long)]
	pub class: Option<String>,
	#[arg(long = "mount-point")]
	pub mount_point: Option<String>,
}

/// Print the effective fields of one component of the package's class object.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		content_root,
		name,
		class,
		mount_point,
	} = args;

	let mut options = ManagerOptions::with_content_root(content_root);
	if let Some(mount_point) = mount_point {
		options.mount_point = mount_point;
	}

	let mut manager = AssetManager::new(options);
	let package = manager.open_package(&path)?;
	let class = class.unwrap_or_else(|| DEFAULT_CLASS.to_owned());
	let object = manager
		.find_export_by_class(package, &class)?
		.ok_or(PackageError::ExportNotFound { name: class })?;
	manager.resolve_export(object, &mut ResolutionContext::new())?;

	let fields = find_component(&manager, object, &name).ok_or(PackageError::ExportNotFound { name: name.clone() })?;
	let payload = ComponentJson {
		path: path.display().to_string(),
		object: manager.full_name(object)?,
		component: name,
		fields: fields_json(&manager, &fields),
	};
	emit_json(&payload);
	Ok(())
}

#[derive(serde::Serialize)]
struct ComponentJson {
	path: String,
	object: String,
	component: String,
	fields: serde_json::Value,
}
