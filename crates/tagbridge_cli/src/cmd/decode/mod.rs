use std::path::PathBuf;

use tagbridge::payload::{DecodeOptions, PayloadImage, Tag, decode_tagged};

use crate::cmd::json::value_to_json;
use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::util::{LayoutArgs, addr_hex, emit_json, parse_addr};
use crate::error::Result;

#[derive(clap::Args)]
pub struct Args {
	/// Raw image written by `encode` or dumped from a host process.
	pub image: PathBuf,
	/// Address of the top-level payload.
	#[arg(long)]
	pub root: String,
	/// Top-level tag, by name or wire value.
	#[arg(long)]
	pub tag: String,
	#[command(flatten)]
	pub layout: LayoutArgs,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-elements")]
	pub max_elements: Option<usize>,
	#[arg(long = "max-string-len")]
	pub max_string_len: Option<usize>,
	#[arg(long)]
	pub json: bool,
}

/// Decode a payload image and print the value tree.
pub fn run(args: Args) -> Result<()> {
	let Args {
		image: path,
		root,
		tag,
		layout,
		max_depth,
		max_elements,
		max_string_len,
		json,
	} = args;

	let root = parse_addr(&root)?;
	let tag = Tag::parse(&tag)?;
	let image = PayloadImage::open(&path, layout.base()?, layout.layout()?)?;

	let mut options = DecodeOptions::default();
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}
	if let Some(max_elements) = max_elements {
		options.max_elements = max_elements;
	}
	if let Some(max_string_len) = max_string_len {
		options.max_string_len = max_string_len;
	}

	let value = decode_tagged(&image, root, tag, &options)?;

	if json {
		let payload = DecodeJson {
			image: path.display().to_string(),
			base: addr_hex(image.base()),
			root: addr_hex(root),
			tag: tag.as_str(),
			value: value_to_json(&value),
		};
		return emit_json(&payload);
	}

	println!("image: {}", path.display());
	println!("mapped: {}..{}", addr_hex(image.base()), addr_hex(image.end()));
	println!("root: {}", addr_hex(root));
	println!("tag: {tag}");
	println!("decoded:");
	print_value(&value, PrintOptions::default());
	Ok(())
}

#[derive(serde::Serialize)]
struct DecodeJson {
	image: String,
	base: String,
	root: String,
	tag: &'static str,
	value: serde_json::Value,
}

#[cfg(test)]
mod tests;
