use std::ffi::{CStr, c_char, c_void};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use super::*;
use crate::bridge::{StaticModule, registry};
use crate::payload::{Tag, Value};

#[repr(C)]
struct RawArray {
	count: i32,
	types: *const i32,
	values: *const *const c_void,
}

#[repr(C)]
struct RawObject {
	count: i32,
	types: *const i32,
	names: *const *const c_char,
	values: *const *const c_void,
}

fn ptr<T>(value: &T) -> *const c_void {
	(value as *const T).cast()
}

fn last_error() -> String {
	let mut buf = [0 as c_char; 256];
	// SAFETY: `buf` holds 256 writable bytes.
	let len = unsafe { tagbridge_last_error(buf.as_mut_ptr(), buf.len()) };
	// SAFETY: `tagbridge_last_error` NUL-terminates within the buffer.
	let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
	let text = text.to_string_lossy().into_owned();
	assert_eq!(len, text.len());
	text
}

fn recording(module: &str) -> (u64, Arc<Mutex<Vec<Value>>>) {
	let received = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&received);
	registry().register_module(
		module,
		StaticModule::new().unary("Sink", "Take", move |value| {
			sink.lock().map_err(|_| "poisoned")?.push(value.clone());
			Ok(())
		}),
	);
	let path = std::ffi::CString::new(module).expect("module path");
	// SAFETY: all three arguments are NUL-terminated strings.
	let handle = unsafe { tagbridge_get_callable(path.as_ptr(), c"Sink".as_ptr(), c"Take".as_ptr()) };
	assert_ne!(handle, 0, "{}", last_error());
	(handle, received)
}

#[test]
fn invokes_with_host_object_payload() {
	let (handle, received) = recording("ffi.object");

	let name = c"edge";
	let port: i32 = 8080;
	let enabled: u8 = 1;
	let started: f64 = 1_700_000_000_000.0;
	let tags: [i32; 3] = [Tag::Int32.code(), Tag::Boolean.code(), Tag::Date.code()];
	let items: [*const c_void; 3] = [ptr(&port), ptr(&enabled), ptr(&started)];
	let list = RawArray {
		count: 3,
		types: tags.as_ptr(),
		values: items.as_ptr(),
	};

	let types: [i32; 3] = [Tag::String.code(), Tag::Array.code(), Tag::Null.code()];
	let names: [*const c_char; 3] = [c"name".as_ptr(), c"list".as_ptr(), c"none".as_ptr()];
	let values: [*const c_void; 3] = [name.as_ptr().cast(), ptr(&list), std::ptr::null()];
	let root = RawObject {
		count: 3,
		types: types.as_ptr(),
		names: names.as_ptr(),
		values: values.as_ptr(),
	};

	// SAFETY: every pointer in the graph refers to a live local.
	let status = unsafe { tagbridge_invoke(handle, ptr(&root), Tag::Object.code()) };
	assert_eq!(status, TAGBRIDGE_OK, "{}", last_error());

	let got = received.lock().expect("lock");
	let value = got.first().expect("one call");
	assert_eq!(value.get("name").and_then(Value::as_str), Some("edge"));
	let when = Utc.timestamp_millis_opt(1_700_000_000_000).single().expect("valid instant");
	assert_eq!(
		value.get("list"),
		Some(&Value::Array(vec![Value::Int32(8080), Value::Bool(true), Value::Date(when)]))
	);
	assert_eq!(value.get("none"), Some(&Value::Null));
	assert_eq!(last_error(), "");
}

#[test]
fn null_tag_ignores_pointer() {
	let (handle, received) = recording("ffi.null");
	// SAFETY: a Null payload is never dereferenced.
	let status = unsafe { tagbridge_invoke(handle, 0x10 as *const c_void, Tag::Null.code()) };
	assert_eq!(status, TAGBRIDGE_OK);
	assert_eq!(received.lock().expect("lock").as_slice(), &[Value::Null]);
}

#[test]
fn unsupported_tag_sets_status_and_message() {
	let (handle, received) = recording("ffi.bad_tag");
	let port: i32 = 1;
	// SAFETY: the pointer refers to a live local.
	let status = unsafe { tagbridge_invoke(handle, ptr(&port), 99) };
	assert_eq!(status, TAGBRIDGE_ERR_UNSUPPORTED_TAG);
	assert_eq!(last_error(), "unsupported payload type: 99");
	assert!(received.lock().expect("lock").is_empty());
}

#[test]
fn negative_count_is_malformed() {
	let (handle, _) = recording("ffi.negative");
	let list = RawArray {
		count: -1,
		types: std::ptr::null(),
		values: std::ptr::null(),
	};
	// SAFETY: the header is a live local and is rejected before tables are read.
	let status = unsafe { tagbridge_invoke(handle, ptr(&list), Tag::Array.code()) };
	assert_eq!(status, TAGBRIDGE_ERR_MALFORMED);
	assert!(last_error().contains("negative element count"));
}

#[test]
fn unresolvable_target_returns_zero() {
	registry().register_module("ffi.resolve", StaticModule::new());
	// SAFETY: all arguments are NUL-terminated strings.
	let handle = unsafe { tagbridge_get_callable(c"ffi.resolve".as_ptr(), c"Sink".as_ptr(), c"Missing".as_ptr()) };
	assert_eq!(handle, 0);
	assert!(last_error().contains("not found"));

	// SAFETY: null arguments are rejected before use.
	let handle = unsafe { tagbridge_get_callable(std::ptr::null(), c"Sink".as_ptr(), c"Take".as_ptr()) };
	assert_eq!(handle, 0);
	assert!(last_error().contains("module path is null"));
}

#[test]
fn invalid_and_released_handles() {
	// SAFETY: a zero handle is rejected before the payload is touched.
	let status = unsafe { tagbridge_invoke(0, std::ptr::null(), Tag::Null.code()) };
	assert_eq!(status, TAGBRIDGE_ERR_INVALID_ARGUMENT);

	let (handle, _) = recording("ffi.release");
	assert_eq!(tagbridge_release_callable(handle), TAGBRIDGE_OK);
	assert_eq!(tagbridge_release_callable(handle), TAGBRIDGE_ERR_INVOCATION);
	// SAFETY: a Null payload is never dereferenced.
	let status = unsafe { tagbridge_invoke(handle, std::ptr::null(), Tag::Null.code()) };
	assert_eq!(status, TAGBRIDGE_ERR_INVOCATION);
	assert!(last_error().contains("unknown callable handle"));
}

#[test]
fn callee_panic_does_not_unwind() {
	registry().register_module("ffi.panic", StaticModule::new().unary("Boom", "Run", |_| panic!("boom")));
	// SAFETY: all arguments are NUL-terminated strings.
	let handle = unsafe { tagbridge_get_callable(c"ffi.panic".as_ptr(), c"Boom".as_ptr(), c"Run".as_ptr()) };
	assert_ne!(handle, 0);
	// SAFETY: a Null payload is never dereferenced.
	let status = unsafe { tagbridge_invoke(handle, std::ptr::null(), Tag::Null.code()) };
	assert_eq!(status, TAGBRIDGE_ERR_PANICKED);
	assert_eq!(last_error(), "panic in tagbridge_invoke: boom");
}

#[test]
fn last_error_truncates_and_reports_full_length() {
	let (handle, _) = recording("ffi.truncate");
	// SAFETY: the tag is rejected before the payload is touched.
	let status = unsafe { tagbridge_invoke(handle, std::ptr::null(), 42) };
	assert_eq!(status, TAGBRIDGE_ERR_UNSUPPORTED_TAG);

	let mut small = [0x7f as c_char; 8];
	// SAFETY: `small` holds 8 writable bytes.
	let len = unsafe { tagbridge_last_error(small.as_mut_ptr(), small.len()) };
	assert_eq!(len, "unsupported payload type: 42".len());
	// SAFETY: the copy is NUL-terminated within `small`.
	let text = unsafe { CStr::from_ptr(small.as_ptr()) };
	assert_eq!(text.to_bytes(), b"unsuppo");

	// SAFETY: a null buffer only queries the length.
	assert_eq!(unsafe { tagbridge_last_error(std::ptr::null_mut(), 0) }, len);
}
