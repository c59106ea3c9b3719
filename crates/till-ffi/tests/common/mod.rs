//! Helpers shared by the C ABI contract tests.
#![allow(dead_code)]

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use till_ffi::*;

pub const MENU: &str = r#"{"items":[{"id":"COFFEE","name":"Coffee","unit_cents":500},{"id":"TEA","name":"Tea","unit_cents":400}]}"#;

static SERIAL: Mutex<()> = Mutex::new(());

/// The catalog is process-wide, so tests in one binary take turns.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn c(text: &str) -> CString {
    CString::new(text).unwrap()
}

pub fn last_error() -> String {
    unsafe { CStr::from_ptr(till_last_error()) }
        .to_str()
        .unwrap()
        .to_string()
}

/// Copies a returned buffer and releases it with `till_free`.
pub fn take_json(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null());
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    unsafe { till_free(ptr) };
    text
}

pub fn json_value(ptr: *mut c_char) -> serde_json::Value {
    serde_json::from_str(&take_json(ptr)).unwrap()
}

pub fn load_catalog(json: &str) -> Status {
    let json = c(json);
    unsafe { till_catalog_load_json(json.as_ptr()) }
}

pub fn catalog_json() -> String {
    let mut out: *mut c_char = ptr::null_mut();
    assert_eq!(unsafe { till_catalog_get_json(&mut out) }, Status::Success);
    take_json(out)
}

pub fn new_cart() -> CartHandle {
    let mut cart: CartHandle = 0;
    assert_eq!(unsafe { till_cart_new(&mut cart) }, Status::Success);
    assert_ne!(cart, 0);
    cart
}

pub fn add(cart: CartHandle, item_id: &str, qty: i32) -> Status {
    let item_id = c(item_id);
    unsafe { till_cart_add_item_by_id(cart, item_id.as_ptr(), qty) }
}

pub fn total(cart: CartHandle) -> i64 {
    let mut total = -1i64;
    assert_eq!(unsafe { till_cart_get_total_cents(cart, &mut total) }, Status::Success);
    total
}

pub fn summary(cart: CartHandle) -> serde_json::Value {
    let mut out: *mut c_char = ptr::null_mut();
    assert_eq!(unsafe { till_cart_get_lines_json(cart, &mut out) }, Status::Success);
    json_value(out)
}

/// `till_init` plus the standard two-item menu.
pub fn setup() -> MutexGuard<'static, ()> {
    let guard = serial();
    assert_eq!(till_init(), Status::Success);
    assert_eq!(load_catalog(MENU), Status::Success);
    guard
}
