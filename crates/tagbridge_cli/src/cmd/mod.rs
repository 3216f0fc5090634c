/// Payload image decode command.
pub mod decode;
/// JSON to payload image command.
pub mod encode;
/// Conversions between decoded values and JSON.
pub mod json;
/// Indented tree rendering of decoded values.
pub mod print;
/// Wire tag listing command.
pub mod tags;
#[cfg(test)]
mod test_support;
/// Shared argument parsing helpers.
pub mod util;
