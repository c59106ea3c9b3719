//! # Boundary Errors
//!
//! Status codes returned across the C ABI, plus the per-thread diagnostic
//! read back with `till_last_error`.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow at the Boundary                           │
//! │                                                                         │
//! │  Host                        till-ffi                                   │
//! │  ────                        ────────                                   │
//! │                                                                         │
//! │  till_cart_add_item_by_id(cart, "TEA", 1)                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  guard("cart_add_item", || { ... })                              │  │
//! │  │         │                                                        │  │
//! │  │  Null / UTF-8 / stale handle? ── FfiError ──────────┐            │  │
//! │  │         │                                           │            │  │
//! │  │  Core rejects? ─── CoreError ──► FfiError::Core ────┤            │  │
//! │  │         │                                           ▼            │  │
//! │  │  Panic? ─── catch_unwind ──► FfiError::Panic ──► last error ────►│  │
//! │  │         │                                       + Status         │  │
//! │  │  Success ──► last error cleared ──────────────────────────────►  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  if (status != TILL_SUCCESS) puts(till_last_error());                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use till_core::CoreError;

/// Status code returned by every fallible entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success = 0,
    /// Bad pointer, handle or input; nothing was changed.
    InvalidArgument = 1,
    /// An output buffer or cart slot could not be allocated.
    OutOfMemory = 2,
    /// Invariant violation or caught panic.
    Internal = 3,
}

/// Errors raised while servicing one ABI call.
#[derive(Debug, Error)]
pub enum FfiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0} must not be null")]
    NullArgument(&'static str),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// Handle was never issued, or its cart has been freed.
    #[error("cart handle {0:#x} is not live")]
    InvalidHandle(u64),

    #[error("Out of memory allocating {0}")]
    OutOfMemory(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("panic in {op}: {message}")]
    Panic { op: &'static str, message: String },
}

pub type FfiResult<T> = Result<T, FfiError>;

impl From<&CoreError> for Status {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Internal(_) => Status::Internal,
            _ => Status::InvalidArgument,
        }
    }
}

impl From<&FfiError> for Status {
    fn from(err: &FfiError) -> Self {
        match err {
            FfiError::Core(core) => Status::from(core),
            FfiError::NullArgument(_) | FfiError::InvalidUtf8(_) | FfiError::InvalidHandle(_) => {
                Status::InvalidArgument
            }
            FfiError::OutOfMemory(_) => Status::OutOfMemory,
            FfiError::Internal(_) | FfiError::Panic { .. } => Status::Internal,
        }
    }
}

// =============================================================================
// Last Error
// =============================================================================

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

static EMPTY: &[u8] = b"\0";

pub(crate) fn set_last_error(message: &str) {
    let message = CString::new(message).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|&b| b != 0);
        // No NUL bytes remain after the retain.
        CString::new(bytes).unwrap_or_default()
    });
    let _ = LAST_ERROR.try_with(|slot| *slot.borrow_mut() = message);
}

pub(crate) fn clear_last_error() {
    let _ = LAST_ERROR.try_with(|slot| {
        let mut slot = slot.borrow_mut();
        if !slot.as_bytes().is_empty() {
            *slot = CString::default();
        }
    });
}

/// Pointer to the current thread's diagnostic. Valid until the next ABI call
/// on this thread; never null.
pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR
        .try_with(|slot| slot.borrow().as_ptr())
        .unwrap_or(EMPTY.as_ptr().cast())
}

/// A copy of the current thread's diagnostic.
pub fn last_error_message() -> String {
    LAST_ERROR
        .try_with(|slot| slot.borrow().to_string_lossy().into_owned())
        .unwrap_or_default()
}

// =============================================================================
// Guard
// =============================================================================

/// Runs one ABI call: contains panics, records the diagnostic and maps the
/// outcome to a [`Status`].
pub(crate) fn guard<F>(op: &'static str, body: F) -> Status
where
    F: FnOnce() -> FfiResult<()>,
{
    let err = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => {
            clear_last_error();
            return Status::Success;
        }
        Ok(Err(err)) => err,
        Err(payload) => FfiError::Panic {
            op,
            message: panic_message(payload.as_ref()),
        },
    };

    let status = Status::from(&err);
    if status == Status::Internal {
        tracing::error!(op, error = %err, "Internal error at C boundary");
    } else {
        tracing::debug!(op, ?status, error = %err, "Call rejected");
    }
    set_last_error(&err.to_string());
    status
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_status_mapping() {
        let not_found = FfiError::from(CoreError::ItemNotFound("X".to_string()));
        assert_eq!(Status::from(&not_found), Status::InvalidArgument);

        let internal = FfiError::from(CoreError::Internal("broken".to_string()));
        assert_eq!(Status::from(&internal), Status::Internal);

        assert_eq!(Status::from(&FfiError::NullArgument("cart")), Status::InvalidArgument);
        assert_eq!(Status::from(&FfiError::InvalidHandle(7)), Status::InvalidArgument);
        assert_eq!(Status::from(&FfiError::OutOfMemory("cart")), Status::OutOfMemory);
    }

    #[test]
    fn test_status_values_are_stable() {
        assert_eq!(Status::Success as i32, 0);
        assert_eq!(Status::InvalidArgument as i32, 1);
        assert_eq!(Status::OutOfMemory as i32, 2);
        assert_eq!(Status::Internal as i32, 3);
    }

    #[test]
    fn test_guard_records_and_clears_message() {
        let status = guard("test", || Err(FfiError::NullArgument("out_json")));
        assert_eq!(status, Status::InvalidArgument);
        assert_eq!(last_error_message(), "out_json must not be null");

        assert_eq!(guard("test", || Ok(())), Status::Success);
        assert_eq!(last_error_message(), "");
        let ptr = last_error_ptr();
        assert!(!ptr.is_null());
        assert_eq!(unsafe { CStr::from_ptr(ptr) }.to_bytes(), b"");
    }

    #[test]
    fn test_guard_contains_panics() {
        let status = guard("explode", || panic!("boom"));
        assert_eq!(status, Status::Internal);
        assert_eq!(last_error_message(), "panic in explode: boom");
    }

    #[test]
    fn test_core_message_passes_through() {
        let status = guard("test", || {
            Err(CoreError::ItemNotFound("UNKNOWN".to_string()).into())
        });
        assert_eq!(status, Status::InvalidArgument);
        assert_eq!(last_error_message(), "Unknown item_id: UNKNOWN");
    }

    #[test]
    fn test_message_with_nul_is_sanitized() {
        set_last_error("bad\0id");
        assert_eq!(last_error_message(), "badid");
    }
}
