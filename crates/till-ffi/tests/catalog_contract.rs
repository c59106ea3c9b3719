mod common;

use std::ptr;

use common::*;
use till_ffi::*;

#[test]
fn test_load_and_get() {
    let _guard = setup();

    assert_eq!(catalog_json(), MENU);
    assert_eq!(last_error(), "");
}

#[test]
fn test_invalid_catalog_keeps_previous() {
    let _guard = setup();

    let rejected = [
        "",
        "not json",
        r#"{"products":[]}"#,
        r#"{"items":[{"id":"A","unit_cents":1.5}]}"#,
        r#"{"items":[{"id":"A","unit_cents":-5}]}"#,
        r#"{"items":[{"id":"","unit_cents":5}]}"#,
        r#"{"items":[{"id":"A","unit_cents":1},{"id":"A","unit_cents":1}]}"#,
    ];
    for text in rejected {
        assert_eq!(load_catalog(text), Status::InvalidArgument, "accepted {text:?}");
        assert!(!last_error().is_empty());
        assert_eq!(catalog_json(), MENU);
    }
}

#[test]
fn test_null_and_invalid_utf8() {
    let _guard = setup();

    assert_eq!(unsafe { till_catalog_load_json(ptr::null()) }, Status::InvalidArgument);
    assert_eq!(last_error(), "json must not be null");

    let bad = b"{\"items\":[{\"id\":\"\xff\",\"unit_cents\":1}]}\0";
    assert_eq!(
        unsafe { till_catalog_load_json(bad.as_ptr().cast()) },
        Status::InvalidArgument
    );
    assert_eq!(last_error(), "json is not valid UTF-8");

    assert_eq!(unsafe { till_catalog_get_json(ptr::null_mut()) }, Status::InvalidArgument);
    assert_eq!(catalog_json(), MENU);
}

#[test]
fn test_names_are_escaped() {
    let _guard = setup();

    let json = r#"{"items":[{"id":"Q","name":"say \"hi\"\n\u0001","unit_cents":0}]}"#;
    assert_eq!(load_catalog(json), Status::Success);
    assert_eq!(
        catalog_json(),
        r#"{"items":[{"id":"Q","name":"say \"hi\"\n\u0001","unit_cents":0}]}"#
    );
    let parsed: serde_json::Value = serde_json::from_str(&catalog_json()).unwrap();
    assert_eq!(parsed["items"][0]["name"], "say \"hi\"\n\u{1}");
}

#[test]
fn test_deep_nesting_is_rejected() {
    let _guard = setup();

    let deep = format!(r#"{{"items":[],"x":{}{}}}"#, "[".repeat(10_000), "]".repeat(10_000));
    assert_eq!(load_catalog(&deep), Status::InvalidArgument);
    assert!(last_error().contains("Nesting too deep."));
    assert_eq!(catalog_json(), MENU);
}
