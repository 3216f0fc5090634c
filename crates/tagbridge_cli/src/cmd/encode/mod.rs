use std::path::PathBuf;

use tagbridge::payload::ImageBuilder;

use crate::cmd::json::json_to_value;
use crate::cmd::util::{LayoutArgs, addr_hex, emit_json};
use crate::error::Result;

#[derive(clap::Args)]
pub struct Args {
	/// JSON document to encode.
	pub input: PathBuf,
	/// Where to write the raw image bytes.
	#[arg(long)]
	pub out: PathBuf,
	#[command(flatten)]
	pub layout: LayoutArgs,
	#[arg(long)]
	pub json: bool,
}

/// Lay a JSON document out as a payload image.
pub fn run(args: Args) -> Result<()> {
	let Args { input, out, layout, json } = args;

	let document: serde_json::Value = serde_json::from_slice(&std::fs::read(&input)?)?;
	let value = json_to_value(&document)?;

	let image_layout = layout.layout()?;
	let mut builder = ImageBuilder::new(layout.base()?, image_layout);
	let (tag, root) = builder.value(&value);
	let image = builder.finish();
	std::fs::write(&out, image.bytes())?;
	tracing::debug!(target: "cli", image = %out.display(), bytes = image.len(), "image written");

	let report = EncodeJson {
		image: out.display().to_string(),
		base: addr_hex(image.base()),
		root: addr_hex(root),
		tag: tag.as_str(),
		tag_code: tag.code(),
		bytes: image.len(),
		pointer_size: image_layout.pointer_size,
		endian: image_layout.endianness.as_str(),
	};

	if json {
		return emit_json(&report);
	}

	println!("image: {}", report.image);
	println!("base: {}", report.base);
	println!("root: {}", report.root);
	println!("tag: {} ({})", report.tag, report.tag_code);
	println!("bytes: {}", report.bytes);
	println!("layout: {}-byte pointers, {} endian", report.pointer_size, report.endian);
	Ok(())
}

#[derive(serde::Serialize)]
struct EncodeJson {
	image: String,
	base: String,
	root: String,
	tag: &'static str,
	tag_code: i32,
	bytes: usize,
	pointer_size: usize,
	endian: &'static str,
}
