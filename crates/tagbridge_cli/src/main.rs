#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;
mod error;

use error::Result;

#[derive(Parser)]
#[command(name = "tagbridge", about = "Tagged payload image tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Lay a JSON value out as a payload image.
	Encode(cmd::encode::Args),
	/// Decode a payload image from a root address and tag.
	Decode(cmd::decode::Args),
	/// List wire tags.
	Tags(cmd::tags::Args),
}

fn main() {
	tagbridge::logging::init();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Encode(args) => cmd::encode::run(args),
		Commands::Decode(args) => cmd::decode::run(args),
		Commands::Tags(args) => cmd::tags::run(args),
	}
}
