use tagbridge::payload::Value;

/// Output truncation limits for decoded values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of properties printed for a single object.
	pub max_properties: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for arrays.
	pub max_array_items: usize,
	/// Maximum recursive print depth for nested arrays/objects.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_properties: 80,
			max_string_len: 200,
			max_array_items: 16,
			max_print_depth: 8,
		}
	}
}

/// Print one decoded value tree.
pub fn print_value(value: &Value, options: PrintOptions) {
	print!("{}", render_value(value, options));
}

/// Render one decoded value tree as indented lines.
pub fn render_value(value: &Value, options: PrintOptions) -> String {
	let mut out = String::new();
	render_into(&mut out, value, 0, 0, options);
	out
}

fn render_into(out: &mut String, value: &Value, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Array(items) => {
			if depth >= options.max_print_depth {
				out.push_str(&format!("{pad}[... {} items]\n", items.len()));
				return;
			}
			out.push_str(&format!("{pad}[\n"));
			for item in items.iter().take(options.max_array_items) {
				render_into(out, item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_array_items {
				out.push_str(&format!("{pad}  ... {} more\n", items.len() - options.max_array_items));
			}
			out.push_str(&format!("{pad}]\n"));
		}
		Value::Object(object) => {
			if depth >= options.max_print_depth {
				out.push_str(&format!("{pad}{{ ... {} properties }}\n", object.len()));
				return;
			}
			out.push_str(&format!("{pad}{{\n"));
			for property in object.iter().take(options.max_properties) {
				out.push_str(&format!("{pad}  {} =", property.name));
				if matches!(property.value, Value::Object(_) | Value::Array(_)) {
					out.push('\n');
					render_into(out, &property.value, indent + 4, depth + 1, options);
				} else {
					out.push(' ');
					render_into(out, &property.value, 0, depth + 1, options);
				}
			}
			if object.len() > options.max_properties {
				out.push_str(&format!("{pad}  ... {} more properties\n", object.len() - options.max_properties));
			}
			out.push_str(&format!("{pad}}}\n"));
		}
		scalar => out.push_str(&format!("{pad}{}\n", render_scalar(scalar, options))),
	}
}

fn render_scalar(value: &Value, options: PrintOptions) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::Bool(v) => v.to_string(),
		Value::Int32(v) => v.to_string(),
		Value::UInt32(v) => format!("{v}u"),
		Value::Number(v) => format!("{v:?}"),
		Value::Date(v) => v.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
		Value::String(v) => format!("\"{}\"", truncate(v, options.max_string_len)),
		Value::Array(items) => format!("[{} items]", items.len()),
		Value::Object(object) => format!("{{{} properties}}", object.len()),
	}
}

fn truncate(input: &str, max_chars: usize) -> String {
	let mut out = String::new();
	for (idx, ch) in input.chars().enumerate() {
		if idx >= max_chars {
			out.push_str("...");
			break;
		}
		out.push(ch);
	}
	out
}
