use serde::Serialize;
use tagbridge::payload::{Endianness, Layout};

use crate::error::{CliError, Result};

/// Byte order selectable on the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EndianArg {
	Little,
	Big,
}

/// Image placement and layout flags shared by `encode` and `decode`.
#[derive(Debug, Clone, clap::Args)]
pub struct LayoutArgs {
	/// Address the first image byte is mapped at.
	#[arg(long, default_value = "0x1000")]
	pub base: String,
	/// Pointer width in bytes (4 or 8); defaults to the host width.
	#[arg(long = "pointer-size")]
	pub pointer_size: Option<usize>,
	/// Byte order; defaults to the host order.
	#[arg(long, value_enum)]
	pub endian: Option<EndianArg>,
}

impl LayoutArgs {
	/// Resolve the requested layout.
	pub fn layout(&self) -> Result<Layout> {
		let native = Layout::native();
		let endianness = match self.endian {
			Some(EndianArg::Little) => Endianness::Little,
			Some(EndianArg::Big) => Endianness::Big,
			None => native.endianness,
		};
		Ok(Layout::new(self.pointer_size.unwrap_or(native.pointer_size), endianness)?)
	}

	/// Parse the base address.
	pub fn base(&self) -> Result<u64> {
		parse_addr(&self.base)
	}
}

/// Parse decimal or `0x`-prefixed hex address literal.
pub(crate) fn parse_addr(value: &str) -> Result<u64> {
	let parsed = if let Some(stripped) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		u64::from_str_radix(stripped, 16)
	} else {
		value.parse::<u64>()
	};

	parsed.map_err(|_| CliError::InvalidAddress { value: value.to_owned() })
}

/// Render an address as fixed-width hex.
pub(crate) fn addr_hex(addr: u64) -> String {
	format!("0x{addr:016x}")
}

/// Print `payload` as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_decimal_addresses() {
		assert_eq!(parse_addr("0x1000").expect("hex"), 0x1000);
		assert_eq!(parse_addr("0XfF").expect("upper prefix"), 0xff);
		assert_eq!(parse_addr("4096").expect("decimal"), 4096);
		assert!(matches!(parse_addr("0xzz"), Err(CliError::InvalidAddress { .. })));
		assert!(matches!(parse_addr("-1"), Err(CliError::InvalidAddress { .. })));
	}

	#[test]
	fn layout_flags_override_host_defaults() {
		let args = LayoutArgs {
			base: "0x2000".to_owned(),
			pointer_size: Some(4),
			endian: Some(EndianArg::Big),
		};
		let layout = args.layout().expect("layout");
		assert_eq!(layout.pointer_size, 4);
		assert_eq!(layout.endianness, Endianness::Big);
		assert_eq!(args.base().expect("base"), 0x2000);

		let bad = LayoutArgs {
			pointer_size: Some(2),
			..args
		};
		assert!(matches!(bad.layout(), Err(CliError::Bridge(_))));
	}
}
