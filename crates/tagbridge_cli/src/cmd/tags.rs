use tagbridge::payload::Tag;

use crate::cmd::util::emit_json;
use crate::error::Result;

#[derive(clap::Args)]
pub struct Args {
	#[arg(long)]
	pub json: bool,
}

/// Print every wire tag with its value.
pub fn run(args: Args) -> Result<()> {
	let rows: Vec<TagJson> = Tag::ALL
		.into_iter()
		.map(|tag| TagJson {
			code: tag.code(),
			name: tag.as_str(),
			decodable: !matches!(tag, Tag::Function | Tag::Buffer),
		})
		.collect();

	if args.json {
		return emit_json(&rows);
	}

	for row in &rows {
		let note = if row.decodable { "" } else { "  (not decodable)" };
		println!("{:>2}  {}{note}", row.code, row.name);
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct TagJson {
	code: i32,
	name: &'static str,
	decodable: bool,
}
