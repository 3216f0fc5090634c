mod bytes;
mod decode;
mod image;
mod memory;
mod tag;
mod value;

/// Bounded header cursor and memory layout description.
pub use bytes::{Cursor, Endianness, Layout};
/// Recursive decoder entry points and limits.
pub use decode::{DecodeOptions, date_from_millis, decode_payload, decode_tagged};
/// Wire-format image writer.
pub use image::ImageBuilder;
/// Read-only payload memory views.
pub use memory::{HostMemory, PayloadImage, PayloadMemory};
/// Wire tag enumeration.
pub use tag::Tag;
/// Decoded dynamic value types.
pub use value::{ObjectValue, Property, Value};
