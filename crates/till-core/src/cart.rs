//! # Cart
//!
//! A cart of priced lines plus the amount the customer has tendered.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Host Action             Operation               Cart Change            │
//! │  ───────────             ─────────               ───────────            │
//! │                                                                         │
//! │  Scan / tap item ───────► add_item() ──────────► push line or qty += n │
//! │                                                                         │
//! │  Void a line ───────────► remove_line() ───────► lines.remove(i)       │
//! │                                                                         │
//! │  New sale ──────────────► clear() ─────────────► lines, given reset    │
//! │                                                                         │
//! │  Cash tendered ─────────► set_given_cents() ───► given = n             │
//! │                                                                         │
//! │  Show screen ───────────► summary() ───────────► (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Cart` is a plain value. Callers that share one across threads wrap it
//! themselves; the FFI layer does this with its handle arena.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::catalog::CatalogStore;
use crate::error::{CoreError, CoreResult};
use crate::json::ToJson;
use crate::money::Money;
use crate::types::{CartLineView, CartSummary};
use crate::validation::{validate_given_cents, validate_item_id, validate_quantity};

/// One line of the cart.
///
/// ## Price Freezing
/// `name` and `unit_cents` are copied from the catalog when the line is
/// created. Reloading the catalog afterwards does not touch them, and adding
/// more of the same item keeps the original price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub qty: i64,
    pub unit_cents: i64,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_cents)
    }

    /// `qty × unit_cents`.
    ///
    /// Cannot overflow for a line held by a [`Cart`], which rejects any
    /// mutation whose line total would not fit.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_cents.saturating_mul(self.qty))
    }

    fn view(&self) -> CartLineView {
        CartLineView {
            item_id: self.item_id.clone(),
            name: self.name.clone(),
            qty: self.qty,
            unit_cents: self.unit_cents,
            line_cents: self.line_total().cents(),
        }
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item increases quantity)
/// - Lines keep the order in which their item was first added
/// - `qty > 0` on every line
/// - The total always fits in an `i64`
/// - `given_cents >= 0`
///
/// Only the methods below can change a cart, so there is no way to build one
/// from serialized data:
///
/// ```compile_fail
/// fn restorable<T: serde::de::DeserializeOwned>() {}
/// restorable::<till_core::Cart>();
/// ```
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    given_cents: i64,
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            given_cents: 0,
            created_at: Utc::now(),
        }
    }

    /// Adds `qty` of `item_id`, pricing a new line from the current catalog.
    ///
    /// ## Behavior
    /// - Item already in cart: `qty` is added to the existing line, whose
    ///   frozen price and name are kept
    /// - Otherwise: a new line is appended with the catalog's current price
    ///
    /// The cart is unchanged when this returns `Err`.
    pub fn add_item(&mut self, catalog: &CatalogStore, item_id: &str, qty: i64) -> CoreResult<()> {
        validate_item_id(item_id)?;
        validate_quantity(qty)?;

        // The item must be in the current catalog even when a line for it
        // already exists.
        let item = catalog
            .lookup(item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        let total = self.total();

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item_id) {
            let new_qty = line
                .qty
                .checked_add(qty)
                .ok_or(CoreError::AmountOverflow("quantity"))?;
            let new_line_total = line
                .unit_price()
                .checked_mul_quantity(new_qty)
                .ok_or(CoreError::AmountOverflow("line total"))?;
            // Old line total is part of `total`, so this subtraction stays in range.
            (total - line.line_total())
                .checked_add(new_line_total)
                .ok_or(CoreError::AmountOverflow("cart total"))?;

            line.qty = new_qty;
            debug!(
                item_id,
                qty,
                line_qty = new_qty,
                line_total = %new_line_total,
                "Increased cart line"
            );
            return Ok(());
        }

        let unit_price = item.price();
        let line_total = unit_price
            .checked_mul_quantity(qty)
            .ok_or(CoreError::AmountOverflow("line total"))?;
        total
            .checked_add(line_total)
            .ok_or(CoreError::AmountOverflow("cart total"))?;

        self.lines.push(CartLine {
            item_id: item.id,
            name: item.name,
            qty,
            unit_cents: item.unit_cents,
        });
        debug!(
            item_id,
            qty,
            %unit_price,
            line_total = %line_total,
            lines = self.lines.len(),
            "Added cart line"
        );
        Ok(())
    }

    /// Removes the line at `index`, shifting later lines down.
    pub fn remove_line(&mut self, index: i64) -> CoreResult<CartLine> {
        let len = self.lines.len();
        let position = usize::try_from(index)
            .ok()
            .filter(|&position| position < len)
            .ok_or(CoreError::LineOutOfRange { index, len })?;

        let line = self.lines.remove(position);
        debug!(index, item_id = %line.item_id, "Removed cart line");
        Ok(line)
    }

    /// Empties the cart and resets the tendered amount.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.given_cents = 0;
        self.created_at = Utc::now();
        debug!("Cleared cart");
    }

    fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Σ qty × unit_cents over all lines.
    pub fn total_cents(&self) -> i64 {
        self.total().cents()
    }

    /// Records the amount tendered. Zero is allowed.
    pub fn set_given_cents(&mut self, amount: i64) -> CoreResult<()> {
        validate_given_cents(amount)?;
        self.given_cents = amount;
        debug!(given = %Money::from_cents(amount), "Set tendered amount");
        Ok(())
    }

    pub fn given_cents(&self) -> i64 {
        self.given_cents
    }

    /// `given − total`, negative while the payment is short.
    pub fn change_cents(&self) -> i64 {
        (Money::from_cents(self.given_cents) - self.total()).cents()
    }

    /// The screen view of the cart, with change floored at zero.
    pub fn summary(&self) -> CartSummary {
        let total = self.total();
        let given = Money::from_cents(self.given_cents);
        CartSummary {
            lines: self.lines.iter().map(CartLine::view).collect(),
            total_cents: total.cents(),
            given_cents: given.cents(),
            change_cents: (given - total).clamp_non_negative().cents(),
        }
    }

    pub fn summary_json(&self) -> String {
        self.summary().to_json()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// When the cart was created or last cleared.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn menu() -> CatalogStore {
        let store = CatalogStore::new();
        store
            .load(r#"{"items":[{"id":"COFFEE","name":"Coffee","unit_cents":500},{"id":"TEA","name":"Tea","unit_cents":400}]}"#)
            .unwrap();
        store
    }

    #[test]
    fn test_cart_add_item() {
        let catalog = menu();
        let mut cart = Cart::new();

        cart.add_item(&catalog, "COFFEE", 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_cents(), 1000);
        assert_eq!(cart.lines()[0].name, "Coffee");
    }

    #[test]
    fn test_cart_add_same_item_increases_quantity() {
        let catalog = menu();
        let mut cart = Cart::new();

        cart.add_item(&catalog, "COFFEE", 2).unwrap();
        cart.add_item(&catalog, "TEA", 1).unwrap();
        cart.add_item(&catalog, "COFFEE", 1).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.lines()[0].item_id, "COFFEE");
        assert_eq!(cart.lines()[0].qty, 3);
        assert_eq!(cart.total_cents(), 1900);
    }

    #[test]
    fn test_coffee_scenario() {
        let catalog = menu();
        let mut cart = Cart::new();

        cart.add_item(&catalog, "COFFEE", 2).unwrap();
        assert_eq!(cart.total_cents(), 1000);
        cart.add_item(&catalog, "COFFEE", 1).unwrap();
        assert_eq!(cart.total_cents(), 1500);
        cart.remove_line(0).unwrap();
        assert_eq!(cart.total_cents(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_frozen_across_reload() {
        let catalog = menu();
        let mut cart = Cart::new();

        cart.add_item(&catalog, "COFFEE", 1).unwrap();
        catalog
            .load(r#"{"items":[{"id":"COFFEE","name":"Espresso","unit_cents":900}]}"#)
            .unwrap();
        cart.add_item(&catalog, "COFFEE", 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].qty, 3);
        assert_eq!(cart.lines()[0].unit_cents, 500);
        assert_eq!(cart.lines()[0].name, "Coffee");
        assert_eq!(cart.total_cents(), 1500);
    }

    #[test]
    fn test_item_dropped_from_catalog() {
        let catalog = menu();
        let mut cart = Cart::new();

        cart.add_item(&catalog, "TEA", 1).unwrap();
        catalog.load(r#"{"items":[]}"#).unwrap();

        // The existing line keeps its price, but no more can be added.
        assert_eq!(cart.total_cents(), 400);
        assert_eq!(
            cart.add_item(&catalog, "TEA", 1),
            Err(CoreError::ItemNotFound("TEA".to_string()))
        );
        assert_eq!(cart.lines()[0].qty, 1);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let catalog = menu();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "TEA", 1).unwrap();

        assert_eq!(
            cart.add_item(&catalog, "UNKNOWN", 1),
            Err(CoreError::ItemNotFound("UNKNOWN".to_string()))
        );
        assert!(matches!(
            cart.add_item(&catalog, "", 1),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(matches!(
            cart.add_item(&catalog, "TEA", 0),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(cart.add_item(&catalog, "TEA", -3).is_err());

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_cents(), 400);
    }

    #[test]
    fn test_overflow_is_rejected_without_mutation() {
        let catalog = CatalogStore::new();
        catalog
            .load(&format!(
                r#"{{"items":[{{"id":"GOLD","unit_cents":{}}},{{"id":"PIN","unit_cents":1}}]}}"#,
                i64::MAX / 2
            ))
            .unwrap();
        let mut cart = Cart::new();

        cart.add_item(&catalog, "GOLD", 2).unwrap();
        assert_eq!(cart.total_cents(), i64::MAX - 1);

        assert_eq!(
            cart.add_item(&catalog, "GOLD", 1),
            Err(CoreError::AmountOverflow("line total"))
        );
        cart.add_item(&catalog, "PIN", 1).unwrap();
        assert_eq!(
            cart.add_item(&catalog, "PIN", 1),
            Err(CoreError::AmountOverflow("cart total"))
        );
        assert_eq!(cart.total_cents(), i64::MAX);
        assert_eq!(cart.lines()[0].qty, 2);
        assert_eq!(cart.lines()[1].qty, 1);
    }

    #[test]
    fn test_remove_line_bounds() {
        let catalog = menu();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "COFFEE", 1).unwrap();
        cart.add_item(&catalog, "TEA", 1).unwrap();

        assert_eq!(
            cart.remove_line(2),
            Err(CoreError::LineOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            cart.remove_line(-1),
            Err(CoreError::LineOutOfRange { index: -1, len: 2 })
        );

        let removed = cart.remove_line(0).unwrap();
        assert_eq!(removed.item_id, "COFFEE");
        assert_eq!(cart.lines()[0].item_id, "TEA");
    }

    #[test]
    fn test_payment_and_change() {
        let catalog = menu();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "TEA", 1).unwrap();

        cart.set_given_cents(100).unwrap();
        assert_eq!(cart.change_cents(), -300);
        assert_eq!(cart.summary().change_cents, 0);

        cart.set_given_cents(1000).unwrap();
        assert_eq!(cart.change_cents(), 600);
        assert_eq!(cart.summary().change_cents, 600);

        assert!(cart.set_given_cents(-1).is_err());
        assert_eq!(cart.given_cents(), 1000);
    }

    #[test]
    fn test_cart_clear() {
        let catalog = menu();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "COFFEE", 2).unwrap();
        cart.set_given_cents(2000).unwrap();
        let created = cart.created_at();

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total_cents(), 0);
        assert_eq!(cart.given_cents(), 0);
        assert!(cart.created_at() >= created);
    }

    #[test]
    fn test_summary_json() {
        let catalog = menu();
        let mut cart = Cart::new();
        assert_eq!(
            cart.summary_json(),
            r#"{"lines":[],"total_cents":0,"given_cents":0,"change_cents":0}"#
        );

        cart.add_item(&catalog, "COFFEE", 2).unwrap();
        cart.set_given_cents(1500).unwrap();
        assert_eq!(
            cart.summary_json(),
            concat!(
                r#"{"lines":[{"item_id":"COFFEE","name":"Coffee","qty":2,"unit_cents":500,"line_cents":1000}],"#,
                r#""total_cents":1000,"given_cents":1500,"change_cents":500}"#
            )
        );
    }
}
