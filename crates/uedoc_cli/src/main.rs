#![allow(missing_docs)]

use clap::{Parser, Subcommand, ValueEnum};

mod cmd;

#[derive(Parser)]
#[command(name = "uedoc", about = "Unreal package inspection tools")]
struct Cli {
	#[arg(long = "log-level", value_enum, default_value_t = LogLevel::Warn, global = true)]
	log_level: LogLevel,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Info(cmd::info::Args),
	Dump(cmd::dump::Args),
	Component(cmd::component::Args),
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	Error,
}

impl From<LogLevel> for log::LevelFilter {
	fn from(level: LogLevel) -> Self {
		match level {
			LogLevel::Trace => Self::Trace,
			LogLevel::Debug => Self::Debug,
			LogLevel::Info => Self::Info,
			LogLevel::Warn => Self::Warn,
			LogLevel::Error => Self::Error,
		}
	}
}

fn main() {
	let cli = Cli::parse();
	env_logger::Builder::new().filter_level(cli.log_level.into()).format_timestamp(None).init();

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> uedoc::pkg::Result<()> {
	match command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Dump(args) => cmd::dump::run(args),
		Commands::Component(args) => cmd::component::run(args),
	}
}
