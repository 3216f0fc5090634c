//! C ABI exported to the host process.
//!
//! Every entry point catches panics, so unwinding never crosses into the
//! host. Failures are reported through a status code (or a zero handle) and a
//! per-thread message readable with [`tagbridge_last_error`].

use std::cell::RefCell;
use std::ffi::{CStr, c_char, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::bridge::{CallableHandle, bridge};
use crate::payload::HostMemory;
use crate::{BridgeError, ErrorKind, Result};

/// Call completed.
pub const TAGBRIDGE_OK: i32 = 0;
/// Payload or element tag is unknown or not decodable.
pub const TAGBRIDGE_ERR_UNSUPPORTED_TAG: i32 = 1;
/// Module or method could not be resolved.
pub const TAGBRIDGE_ERR_RESOLUTION: i32 = 2;
/// Payload memory was malformed.
pub const TAGBRIDGE_ERR_MALFORMED: i32 = 3;
/// Payload nesting exceeded the decoder limit.
pub const TAGBRIDGE_ERR_DEPTH: i32 = 4;
/// Handle was unknown or the callee returned an error.
pub const TAGBRIDGE_ERR_INVOCATION: i32 = 5;
/// An argument was invalid before any work started.
pub const TAGBRIDGE_ERR_INVALID_ARGUMENT: i32 = 6;
/// A panic was caught at the boundary.
pub const TAGBRIDGE_ERR_PANICKED: i32 = 7;

thread_local! {
	static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Map an error to its C ABI status code.
pub fn status_code(err: &BridgeError) -> i32 {
	match err.kind() {
		ErrorKind::UnsupportedTag => TAGBRIDGE_ERR_UNSUPPORTED_TAG,
		ErrorKind::Resolution => TAGBRIDGE_ERR_RESOLUTION,
		ErrorKind::MalformedPayload => TAGBRIDGE_ERR_MALFORMED,
		ErrorKind::DepthExceeded => TAGBRIDGE_ERR_DEPTH,
		ErrorKind::Invocation | ErrorKind::Io => TAGBRIDGE_ERR_INVOCATION,
	}
}

fn set_last_error(message: String) {
	LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

fn clear_last_error() {
	LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

fn report(err: &BridgeError) -> i32 {
	let status = status_code(err);
	tracing::debug!(target: "ffi", status, error = %err, "call failed");
	set_last_error(err.to_string());
	status
}

fn boundary<T>(entry: &'static str, on_panic: T, body: impl FnOnce() -> T) -> T {
	match catch_unwind(AssertUnwindSafe(body)) {
		Ok(value) => value,
		Err(payload) => {
			let detail = payload
				.downcast_ref::<&str>()
				.map(|text| (*text).to_owned())
				.or_else(|| payload.downcast_ref::<String>().cloned())
				.unwrap_or_else(|| "non-string panic payload".to_owned());
			tracing::error!(target: "ffi", entry, panic = %detail, "panic caught at C boundary");
			set_last_error(format!("panic in {entry}: {detail}"));
			on_panic
		}
	}
}

/// Borrow a NUL-terminated UTF-8 argument.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn c_text<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
	if ptr.is_null() {
		return Err(BridgeError::InvalidTarget { reason: format!("{what} is null") });
	}
	// SAFETY: non-null and NUL-terminated per this function's contract.
	let text = unsafe { CStr::from_ptr(ptr) };
	text.to_str()
		.map_err(|_| BridgeError::InvalidTarget { reason: format!("{what} is not valid UTF-8") })
}

/// Resolve `type_name.method_name` in `module_path`.
///
/// Returns a non-zero handle, or `0` when resolution fails.
///
/// # Safety
///
/// Each argument must be null or a valid NUL-terminated string for the
/// duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tagbridge_get_callable(module_path: *const c_char, type_name: *const c_char, method_name: *const c_char) -> u64 {
	boundary("tagbridge_get_callable", 0, || {
		let resolved = (|| -> Result<CallableHandle> {
			// SAFETY: forwarded from this function's contract.
			let (module, type_name, method) = unsafe {
				(
					c_text(module_path, "module path")?,
					c_text(type_name, "type name")?,
					c_text(method_name, "method name")?,
				)
			};
			bridge().resolve(module, type_name, method)
		})();
		match resolved {
			Ok(handle) => {
				clear_last_error();
				handle.get()
			}
			Err(err) => {
				report(&err);
				0
			}
		}
	})
}

/// Decode the payload at `payload` described by `payload_type` and pass it to
/// the method behind `handle`.
///
/// Returns [`TAGBRIDGE_OK`] or one of the `TAGBRIDGE_ERR_*` codes.
///
/// # Safety
///
/// Every address reachable from `payload` under the wire format must be
/// readable and unchanged until the call returns. A `Null` payload is never
/// dereferenced.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tagbridge_invoke(handle: u64, payload: *const c_void, payload_type: i32) -> i32 {
	boundary("tagbridge_invoke", TAGBRIDGE_ERR_PANICKED, || {
		let Some(handle) = CallableHandle::from_raw(handle) else {
			set_last_error("callable handle 0 is not valid".to_owned());
			return TAGBRIDGE_ERR_INVALID_ARGUMENT;
		};
		// SAFETY: readability of the payload graph is this function's contract.
		let memory = unsafe { HostMemory::new() };
		match bridge().invoke(handle, &memory, payload as usize as u64, payload_type) {
			Ok(()) => {
				clear_last_error();
				TAGBRIDGE_OK
			}
			Err(err) => report(&err),
		}
	})
}

/// Turn diagnostic output on standard output on or off.
#[unsafe(no_mangle)]
pub extern "C" fn tagbridge_set_debug_mode(enabled: bool) {
	boundary("tagbridge_set_debug_mode", (), || crate::debug::set_debug_mode(enabled));
}

/// Release a handle returned by [`tagbridge_get_callable`].
#[unsafe(no_mangle)]
pub extern "C" fn tagbridge_release_callable(handle: u64) -> i32 {
	boundary("tagbridge_release_callable", TAGBRIDGE_ERR_PANICKED, || {
		let Some(handle) = CallableHandle::from_raw(handle) else {
			set_last_error("callable handle 0 is not valid".to_owned());
			return TAGBRIDGE_ERR_INVALID_ARGUMENT;
		};
		match bridge().release(handle) {
			Ok(()) => {
				clear_last_error();
				TAGBRIDGE_OK
			}
			Err(err) => report(&err),
		}
	})
}

/// Copy the calling thread's last error message into `buffer`.
///
/// At most `capacity - 1` bytes are copied and the copy is always
/// NUL-terminated. Returns the full message length in bytes, or `0` when the
/// last call on this thread succeeded.
///
/// # Safety
///
/// `buffer` must be null or valid for writes of `capacity` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tagbridge_last_error(buffer: *mut c_char, capacity: usize) -> usize {
	boundary("tagbridge_last_error", 0, || {
		LAST_ERROR.with(|slot| {
			let slot = slot.borrow();
			let message = slot.as_deref().unwrap_or("");
			if !buffer.is_null() && capacity > 0 {
				let copied = message.len().min(capacity - 1);
				// SAFETY: `buffer` holds `capacity` writable bytes and `copied < capacity`.
				unsafe {
					std::ptr::copy_nonoverlapping(message.as_ptr(), buffer.cast::<u8>(), copied);
					buffer.add(copied).write(0);
				}
			}
			message.len()
		})
	})
}

#[cfg(test)]
mod tests;
