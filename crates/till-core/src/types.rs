//! # Domain Types
//!
//! Wire-facing types shared by the catalog, the cart and the host boundary.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │  CartLineView   │   │  CartSummary    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  item_id        │   │  lines          │       │
//! │  │  name           │   │  name           │   │  total_cents    │       │
//! │  │  unit_cents     │   │  qty            │   │  given_cents    │       │
//! │  └─────────────────┘   │  unit_cents     │   │  change_cents   │       │
//! │                        │  line_cents     │   │  (clamped ≥ 0)  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The serde derives serve Rust hosts that embed the core directly; the wire
//! text always comes from [`ToJson`], which fixes the key order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::json::{JsonObject, JsonValue, ToJson};
use crate::money::Money;

// =============================================================================
// Catalog Item
// =============================================================================

/// A purchasable item in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    /// Unique, non-empty identifier.
    pub id: String,

    /// Display name (empty when the catalog omits it).
    pub name: String,

    /// Current price in cents.
    pub unit_cents: i64,
}

impl CatalogItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.unit_cents)
    }
}

impl ToJson for CatalogItem {
    fn to_json_value(&self) -> JsonValue {
        JsonObject::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("unit_cents", self.unit_cents)
            .into()
    }
}

// =============================================================================
// Cart Views
// =============================================================================

/// One cart line as reported to hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineView {
    pub item_id: String,
    /// Name at the time the line was created.
    pub name: String,
    pub qty: i64,
    /// Price frozen when the line was created.
    pub unit_cents: i64,
    /// `qty × unit_cents`
    pub line_cents: i64,
}

impl ToJson for CartLineView {
    fn to_json_value(&self) -> JsonValue {
        JsonObject::new()
            .with("item_id", self.item_id.as_str())
            .with("name", self.name.as_str())
            .with("qty", self.qty)
            .with("unit_cents", self.unit_cents)
            .with("line_cents", self.line_cents)
            .into()
    }
}

/// Everything a register screen needs to show a cart.
///
/// `change_cents` here is floored at zero. The raw signed change is only
/// available from `Cart::change_cents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub lines: Vec<CartLineView>,
    pub total_cents: i64,
    pub given_cents: i64,
    pub change_cents: i64,
}

impl ToJson for CartSummary {
    fn to_json_value(&self) -> JsonValue {
        let lines: Vec<JsonValue> = self.lines.iter().map(ToJson::to_json_value).collect();
        JsonObject::new()
            .with("lines", lines)
            .with("total_cents", self.total_cents)
            .with("given_cents", self.given_cents)
            .with("change_cents", self.change_cents)
            .into()
    }
}

// =============================================================================
// Version
// =============================================================================

/// Response of the version endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VersionInfo {
    pub version: String,
}

impl VersionInfo {
    /// Version of this crate.
    pub fn current() -> Self {
        VersionInfo {
            version: crate::CORE_VERSION.to_string(),
        }
    }
}

impl ToJson for VersionInfo {
    fn to_json_value(&self) -> JsonValue {
        JsonObject::new()
            .with("version", self.version.as_str())
            .into()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_item_wire_shape() {
        let item = CatalogItem {
            id: "COFFEE".to_string(),
            name: "Coffee".to_string(),
            unit_cents: 500,
        };
        assert_eq!(
            item.to_json(),
            r#"{"id":"COFFEE","name":"Coffee","unit_cents":500}"#
        );
        assert_eq!(item.price(), Money::from_cents(500));
    }

    #[test]
    fn test_summary_wire_shape() {
        let summary = CartSummary {
            lines: vec![CartLineView {
                item_id: "TEA".to_string(),
                name: "Tea".to_string(),
                qty: 2,
                unit_cents: 400,
                line_cents: 800,
            }],
            total_cents: 800,
            given_cents: 1000,
            change_cents: 200,
        };
        assert_eq!(
            summary.to_json(),
            concat!(
                r#"{"lines":[{"item_id":"TEA","name":"Tea","qty":2,"unit_cents":400,"line_cents":800}],"#,
                r#""total_cents":800,"given_cents":1000,"change_cents":200}"#
            )
        );
    }

    #[test]
    fn test_summary_agrees_with_serde() {
        let summary = CartSummary {
            lines: vec![],
            total_cents: 0,
            given_cents: 0,
            change_cents: 0,
        };
        let ours: serde_json::Value = serde_json::from_str(&summary.to_json()).unwrap();
        let theirs = serde_json::to_value(&summary).unwrap();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn test_version_info() {
        let info = VersionInfo::current();
        assert_eq!(info.to_json(), format!("{{\"version\":\"{}\"}}", crate::CORE_VERSION));
    }
}
