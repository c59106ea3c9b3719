//! Strings crossing the boundary.
//!
//! Inputs are borrowed NUL-terminated UTF-8. Outputs are heap buffers owned
//! by the host until it passes them to `till_free`.

use std::ffi::{c_char, CStr, CString};

use crate::error::{FfiError, FfiResult};

/// Borrows a host string argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for `'a`.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char, name: &'static str) -> FfiResult<&'a str> {
    if ptr.is_null() {
        return Err(FfiError::NullArgument(name));
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let text = unsafe { CStr::from_ptr(ptr) };
    text.to_str().map_err(|_| FfiError::InvalidUtf8(name))
}

/// Checks an out-pointer before anything is mutated.
pub(crate) fn out_arg<T>(ptr: *mut T, name: &'static str) -> FfiResult<*mut T> {
    if ptr.is_null() {
        Err(FfiError::NullArgument(name))
    } else {
        Ok(ptr)
    }
}

/// Moves `text` into a NUL-terminated heap buffer for the host.
///
/// Allocation failure is reported instead of aborting the process.
pub(crate) fn into_c_buffer(text: String, what: &'static str) -> FfiResult<*mut c_char> {
    let mut bytes = text.into_bytes();
    bytes
        .try_reserve_exact(1)
        .map_err(|_| FfiError::OutOfMemory(what))?;
    bytes.push(0);
    let text = CString::from_vec_with_nul(bytes)
        .map_err(|_| FfiError::Internal(format!("{what} contains a NUL byte")))?;
    Ok(text.into_raw())
}

/// Hands `text` to the host through `out`.
///
/// # Safety
/// `out` must be non-null and valid for a pointer-sized write.
pub(crate) unsafe fn write_c_buffer(
    out: *mut *mut c_char,
    text: String,
    what: &'static str,
) -> FfiResult<()> {
    let buffer = into_c_buffer(text, what)?;
    // SAFETY: checked by the caller through `out_arg`.
    unsafe { out.write(buffer) };
    Ok(())
}

/// Releases a buffer produced by [`into_c_buffer`].
///
/// # Safety
/// `ptr` must be null or a pointer returned by this crate and not yet freed.
pub(crate) unsafe fn free_c_buffer(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: ownership came from `CString::into_raw`.
        drop(unsafe { CString::from_raw(ptr) });
    }
}
