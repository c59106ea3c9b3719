//! # till-ffi: C ABI for the Till POS Core
//!
//! Exposes [`till_core`] to native hosts as plain C functions that return a
//! [`Status`] and exchange JSON text.
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One ABI Call                                     │
//! │                                                                         │
//! │  host ──► till_cart_add_item_by_id(cart, "TEA", 2)                      │
//! │              │                                                          │
//! │              ▼                                                          │
//! │           guard ── catch_unwind ─────────────────────────────┐          │
//! │              │                                               │          │
//! │              ▼                                               │          │
//! │           validate args (handle, pointers, UTF-8)            │          │
//! │              │                                               │          │
//! │              ▼                                               │          │
//! │           runtime().carts() ──► Cart::add_item(catalog, ..)  │          │
//! │              │                                               │          │
//! │              ▼                                               ▼          │
//! │           Status::Success            Status::* + till_last_error()     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Rules
//! - Every `char*` written to an `out_json` parameter belongs to the host and
//!   must be released with [`till_free`].
//! - Input strings are borrowed for the duration of the call only.
//! - Cart handles are opaque `uint64_t` values; `0` is never a live cart.
//! - A single cart must not be used from two threads at once. Different
//!   carts may be used concurrently.

mod buffer;
mod error;
mod handles;
mod state;

use std::ffi::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};

use till_core::{Cart, ToJson, VersionInfo};
use tracing::{debug, info};

use crate::buffer::{free_c_buffer, out_arg, str_arg, write_c_buffer};
use crate::error::{guard, last_error_ptr, FfiError, FfiResult};
use crate::state::{init_tracing, runtime};

pub use crate::error::{last_error_message, Status};
pub use crate::handles::CartHandle;

fn cart_arg(cart: CartHandle) -> FfiResult<CartHandle> {
    if cart == 0 {
        Err(FfiError::NullArgument("cart"))
    } else {
        Ok(cart)
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Initializes logging and the shared runtime. Safe to call more than once.
#[no_mangle]
pub extern "C" fn till_init() -> Status {
    guard("init", || {
        let rt = runtime();
        let subscriber_installed = init_tracing(&rt.config);
        info!(
            version = till_core::CORE_VERSION,
            max_json_depth = rt.config.max_json_depth,
            subscriber_installed,
            "Till core initialized"
        );
        Ok(())
    })
}

/// Clears the calling thread's diagnostic.
#[no_mangle]
pub extern "C" fn till_shutdown() {
    let _ = guard("shutdown", || {
        debug!("Till core shutdown requested");
        Ok(())
    });
}

/// Message describing the last failed call on this thread, or `""`.
///
/// The pointer stays valid until the next `till_*` call on the same thread.
#[no_mangle]
pub extern "C" fn till_last_error() -> *const c_char {
    last_error_ptr()
}

/// Releases a buffer returned through an `out_json` parameter.
///
/// # Safety
/// `ptr` must be null or a buffer returned by this library that has not been
/// freed yet.
#[no_mangle]
pub unsafe extern "C" fn till_free(ptr: *mut c_char) {
    // Leaves the last error untouched so hosts can free a buffer before
    // reporting a failure.
    // SAFETY: forwarded caller contract.
    let _ = panic::catch_unwind(AssertUnwindSafe(|| unsafe { free_c_buffer(ptr) }));
}

/// Writes `{"version":"<semver>"}` to `out_json`.
///
/// # Safety
/// `out_json` must be null or valid for writing one pointer.
#[no_mangle]
pub unsafe extern "C" fn till_get_version(out_json: *mut *mut c_char) -> Status {
    guard("get_version", || {
        let out_json = out_arg(out_json, "out_json")?;
        let json = VersionInfo::current().to_json();
        unsafe { write_c_buffer(out_json, json, "version JSON") }
    })
}

// =============================================================================
// Catalog
// =============================================================================

/// Replaces the catalog with the items in `json`.
///
/// On failure the previous catalog stays in effect.
///
/// # Safety
/// `json` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn till_catalog_load_json(json: *const c_char) -> Status {
    guard("catalog_load_json", || {
        let json = unsafe { str_arg(json, "json") }?;
        runtime().catalog.load(json)?;
        Ok(())
    })
}

/// Writes the current catalog as `{"items":[...]}` to `out_json`.
///
/// # Safety
/// `out_json` must be null or valid for writing one pointer.
#[no_mangle]
pub unsafe extern "C" fn till_catalog_get_json(out_json: *mut *mut c_char) -> Status {
    guard("catalog_get_json", || {
        let out_json = out_arg(out_json, "out_json")?;
        let json = runtime().catalog.to_json();
        unsafe { write_c_buffer(out_json, json, "catalog JSON") }
    })
}

// =============================================================================
// Cart Lifecycle
// =============================================================================

/// Creates an empty cart and writes its handle to `out_cart`.
///
/// # Safety
/// `out_cart` must be null or valid for writing one `uint64_t`.
#[no_mangle]
pub unsafe extern "C" fn till_cart_new(out_cart: *mut CartHandle) -> Status {
    guard("cart_new", || {
        let out_cart = out_arg(out_cart, "out_cart")?;
        let mut carts = runtime().carts();
        let handle = carts.insert(Cart::new())?;
        unsafe { out_cart.write(handle) };
        debug!(cart = handle, live = carts.len(), "Cart created");
        Ok(())
    })
}

/// Destroys a cart. Freeing handle `0` does nothing.
#[no_mangle]
pub extern "C" fn till_cart_free(cart: CartHandle) -> Status {
    guard("cart_free", || {
        if cart == 0 {
            return Ok(());
        }
        let mut carts = runtime().carts();
        carts.remove(cart)?;
        debug!(cart, live = carts.len(), "Cart freed");
        Ok(())
    })
}

// =============================================================================
// Cart Mutation
// =============================================================================

/// Removes every line and resets the tendered amount.
#[no_mangle]
pub extern "C" fn till_cart_clear(cart: CartHandle) -> Status {
    guard("cart_clear", || {
        let cart = cart_arg(cart)?;
        runtime().carts().get_mut(cart)?.clear();
        Ok(())
    })
}

/// Adds `qty` of a catalog item, merging with an existing line.
///
/// # Safety
/// `item_id` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn till_cart_add_item_by_id(
    cart: CartHandle,
    item_id: *const c_char,
    qty: c_int,
) -> Status {
    guard("cart_add_item_by_id", || {
        let cart = cart_arg(cart)?;
        let item_id = unsafe { str_arg(item_id, "item_id") }?;
        let rt = runtime();
        let mut carts = rt.carts();
        carts
            .get_mut(cart)?
            .add_item(&rt.catalog, item_id, i64::from(qty))?;
        Ok(())
    })
}

/// Removes the line at `line_index` (0-based).
#[no_mangle]
pub extern "C" fn till_cart_remove_line(cart: CartHandle, line_index: c_int) -> Status {
    guard("cart_remove_line", || {
        let cart = cart_arg(cart)?;
        runtime()
            .carts()
            .get_mut(cart)?
            .remove_line(i64::from(line_index))?;
        Ok(())
    })
}

// =============================================================================
// Cart Queries
// =============================================================================

/// Writes the cart total to `out_total_cents`.
///
/// # Safety
/// `out_total_cents` must be null or valid for writing one `int64_t`.
#[no_mangle]
pub unsafe extern "C" fn till_cart_get_total_cents(
    cart: CartHandle,
    out_total_cents: *mut i64,
) -> Status {
    guard("cart_get_total_cents", || {
        let cart = cart_arg(cart)?;
        let out = out_arg(out_total_cents, "out_total_cents")?;
        let total = runtime().carts().get(cart)?.total_cents();
        unsafe { out.write(total) };
        Ok(())
    })
}

/// Writes the cart summary (lines, total, given, change) to `out_json`.
///
/// # Safety
/// `out_json` must be null or valid for writing one pointer.
#[no_mangle]
pub unsafe extern "C" fn till_cart_get_lines_json(
    cart: CartHandle,
    out_json: *mut *mut c_char,
) -> Status {
    guard("cart_get_lines_json", || {
        let cart = cart_arg(cart)?;
        let out_json = out_arg(out_json, "out_json")?;
        // Only the summary is built under the arena lock.
        let summary = runtime().carts().get(cart)?.summary();
        unsafe { write_c_buffer(out_json, summary.to_json(), "cart JSON") }
    })
}

// =============================================================================
// Payment
// =============================================================================

/// Records the amount the customer handed over. Must be non-negative.
#[no_mangle]
pub extern "C" fn till_payment_set_given_cents(cart: CartHandle, given_cents: i64) -> Status {
    guard("payment_set_given_cents", || {
        let cart = cart_arg(cart)?;
        runtime().carts().get_mut(cart)?.set_given_cents(given_cents)?;
        Ok(())
    })
}

/// Writes the tendered amount to `out_given_cents`.
///
/// # Safety
/// `out_given_cents` must be null or valid for writing one `int64_t`.
#[no_mangle]
pub unsafe extern "C" fn till_payment_get_given_cents(
    cart: CartHandle,
    out_given_cents: *mut i64,
) -> Status {
    guard("payment_get_given_cents", || {
        let cart = cart_arg(cart)?;
        let out = out_arg(out_given_cents, "out_given_cents")?;
        let given = runtime().carts().get(cart)?.given_cents();
        unsafe { out.write(given) };
        Ok(())
    })
}

/// Writes `given − total` to `out_change_cents`. Negative while the payment
/// is short.
///
/// # Safety
/// `out_change_cents` must be null or valid for writing one `int64_t`.
#[no_mangle]
pub unsafe extern "C" fn till_payment_get_change_cents(
    cart: CartHandle,
    out_change_cents: *mut i64,
) -> Status {
    guard("payment_get_change_cents", || {
        let cart = cart_arg(cart)?;
        let out = out_arg(out_change_cents, "out_change_cents")?;
        let change = runtime().carts().get(cart)?.change_cents();
        unsafe { out.write(change) };
        Ok(())
    })
}
