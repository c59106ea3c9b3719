//! # Catalog
//!
//! The set of purchasable items and their current prices.
//!
//! ## Load Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  json text                                                              │
//! │     │  parse_with_limits        (no lock held)                          │
//! │     ▼                                                                   │
//! │  JsonValue ──► parse_catalog ──► Vec<CatalogItem> ──► CatalogState::new │
//! │                                                         │               │
//! │                                   lock, bump version, swap Arc          │
//! │                                                         ▼               │
//! │                                           Mutex<Arc<CatalogState>>      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A state is never edited in place. Readers take a [`CatalogStore::snapshot`]
//! and keep using it while a later load swaps in a new one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::json::{parse_with_limits, JsonLimits, JsonObject, JsonValue, ToJson};
use crate::money::Money;
use crate::types::CatalogItem;
use crate::validation::{optional_string, required_cents, required_string};

// =============================================================================
// Catalog State
// =============================================================================

/// One immutable generation of the catalog.
#[derive(Debug, Clone)]
pub struct CatalogState {
    items: Vec<CatalogItem>,
    index: HashMap<String, usize>,
    version: u64,
    loaded_at: DateTime<Utc>,
}

impl CatalogState {
    /// The empty catalog every store starts with (version 0).
    pub fn empty() -> Self {
        CatalogState {
            items: Vec::new(),
            index: HashMap::new(),
            version: 0,
            loaded_at: Utc::now(),
        }
    }

    /// Builds a state from already-validated items.
    ///
    /// Fails on a duplicate id, so callers cannot construct a state that
    /// breaks the unique-id invariant.
    pub fn new(items: Vec<CatalogItem>, version: u64) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), position).is_some() {
                return Err(CoreError::CatalogItem {
                    index: position,
                    source: ValidationError::Duplicate {
                        field: "id".to_string(),
                        value: item.id.clone(),
                    },
                });
            }
        }
        Ok(CatalogState {
            items,
            index,
            version,
            loaded_at: Utc::now(),
        })
    }

    /// Items in the order they were loaded.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl ToJson for CatalogState {
    fn to_json_value(&self) -> JsonValue {
        let items: Vec<JsonValue> = self.items.iter().map(ToJson::to_json_value).collect();
        JsonObject::new().with("items", items).into()
    }
}

/// Outcome of a successful [`CatalogStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLoad {
    pub version: u64,
    pub item_count: usize,
}

// =============================================================================
// Document Parsing
// =============================================================================

/// Parses and validates a catalog document without touching any store.
///
/// ## Document Shape
/// ```text
/// {"items":[{"id":"COFFEE","name":"Coffee","unit_cents":500}, ...]}
/// ```
/// Unknown fields are ignored at every level. Ids are not checked for
/// uniqueness here; [`CatalogState::new`] does that.
pub fn parse_catalog(text: &str, limits: JsonLimits) -> CoreResult<Vec<CatalogItem>> {
    let document = parse_with_limits(text, limits)?;
    let root = document
        .as_object()
        .ok_or_else(|| CoreError::InvalidCatalog("root must be an object".to_string()))?;
    let entries = root
        .get("items")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| CoreError::InvalidCatalog("items must be an array".to_string()))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let object = entry.as_object().ok_or_else(|| {
                CoreError::InvalidCatalog(format!("items[{index}] must be an object"))
            })?;
            parse_item(object).map_err(|source| CoreError::CatalogItem { index, source })
        })
        .collect()
}

fn parse_item(object: &JsonObject) -> Result<CatalogItem, ValidationError> {
    let id = required_string(object.get("id"), "id")?;
    let unit_cents = required_cents(object.get("unit_cents"), "unit_cents")?;
    let name = optional_string(object.get("name"), "name")?;
    Ok(CatalogItem {
        id: id.to_string(),
        name,
        unit_cents,
    })
}

// =============================================================================
// Catalog Store
// =============================================================================

/// Thread-safe holder of the current [`CatalogState`].
///
/// ## Example
/// ```rust
/// use till_core::catalog::CatalogStore;
///
/// let store = CatalogStore::new();
/// store.load(r#"{"items":[{"id":"TEA","name":"Tea","unit_cents":400}]}"#).unwrap();
/// assert_eq!(store.price_of("TEA").unwrap().cents(), 400);
/// assert_eq!(store.version(), 1);
/// ```
#[derive(Debug)]
pub struct CatalogStore {
    current: Mutex<Arc<CatalogState>>,
    limits: JsonLimits,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::with_limits(JsonLimits::default())
    }

    pub fn with_limits(limits: JsonLimits) -> Self {
        CatalogStore {
            current: Mutex::new(Arc::new(CatalogState::empty())),
            limits,
        }
    }

    pub fn limits(&self) -> JsonLimits {
        self.limits
    }

    fn lock(&self) -> MutexGuard<'_, Arc<CatalogState>> {
        // A panic while holding the lock can only happen between whole-state
        // swaps, so the guarded value is always consistent.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the whole catalog with the contents of `json_text`.
    ///
    /// On any error the current catalog is left exactly as it was.
    pub fn load(&self, json_text: &str) -> CoreResult<CatalogLoad> {
        // Duplicate ids are caught by `CatalogState::new`.
        let parsed =
            parse_catalog(json_text, self.limits).and_then(|items| CatalogState::new(items, 0));
        let mut state = match parsed {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "Rejected catalog load");
                return Err(err);
            }
        };
        let item_count = state.len();

        let mut current = self.lock();
        let version = current.version + 1;
        state.version = version;
        *current = Arc::new(state);
        drop(current);

        info!(version, items = item_count, "Catalog loaded");
        Ok(CatalogLoad {
            version,
            item_count,
        })
    }

    /// A consistent view of the catalog as of now.
    pub fn snapshot(&self) -> Arc<CatalogState> {
        Arc::clone(&self.lock())
    }

    /// Current price of `id`.
    pub fn price_of(&self, id: &str) -> CoreResult<Money> {
        self.snapshot()
            .get(id)
            .map(CatalogItem::price)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// A copy of the catalog entry for `id`, if present.
    pub fn lookup(&self, id: &str) -> Option<CatalogItem> {
        let item = self.snapshot().get(id).cloned();
        debug!(item_id = id, found = item.is_some(), "Catalog lookup");
        item
    }

    /// `{"items":[...]}` in stored order.
    pub fn to_json(&self) -> String {
        // Serialize from the snapshot so the lock is not held while writing.
        self.snapshot().to_json()
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }
}

impl Default for CatalogStore {
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

    const MENU: &str = r#"{"items":[
        {"id":"COFFEE","name":"Coffee","unit_cents":500},
        {"id":"TEA","name":"Tea","unit_cents":400}
    ]}"#;

    fn loaded() -> CatalogStore {
        let store = CatalogStore::new();
        store.load(MENU).unwrap();
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = CatalogStore::new();
        assert_eq!(store.version(), 0);
        assert!(store.snapshot().is_empty());
        assert_eq!(store.to_json(), r#"{"items":[]}"#);
    }

    #[test]
    fn test_load_and_query() {
        let store = CatalogStore::new();
        let load = store.load(MENU).unwrap();
        assert_eq!(load, CatalogLoad { version: 1, item_count: 2 });

        assert_eq!(store.price_of("COFFEE").unwrap(), Money::from_cents(500));
        assert_eq!(store.lookup("TEA").unwrap().name, "Tea");
        assert!(store.lookup("MILK").is_none());
        assert_eq!(
            store.price_of("MILK"),
            Err(CoreError::ItemNotFound("MILK".to_string()))
        );
        assert_eq!(
            store.to_json(),
            r#"{"items":[{"id":"COFFEE","name":"Coffee","unit_cents":500},{"id":"TEA","name":"Tea","unit_cents":400}]}"#
        );
    }

    #[test]
    fn test_reload_replaces_everything() {
        let store = loaded();
        store
            .load(r#"{"items":[{"id":"WATER","unit_cents":100}]}"#)
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.version(), 2);
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.contains("COFFEE"));
        assert_eq!(snapshot.get("WATER").unwrap().name, "");
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let store = loaded();
        let before = store.snapshot();
        store.load(r#"{"items":[]}"#).unwrap();

        assert_eq!(before.len(), 2);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_failed_load_keeps_previous_catalog() {
        let store = loaded();
        let rejected = [
            "",
            "[]",
            r#"{"products":[]}"#,
            r#"{"items":{}}"#,
            r#"{"items":[1]}"#,
            r#"{"items":[{"id":"","unit_cents":1}]}"#,
            r#"{"items":[{"id":"A","unit_cents":1.5}]}"#,
            r#"{"items":[{"id":"A","unit_cents":500.0}]}"#,
            r#"{"items":[{"id":"A","unit_cents":-1}]}"#,
            r#"{"items":[{"id":"A"}]}"#,
            r#"{"items":[{"id":"A","unit_cents":1,"name":7}]}"#,
            r#"{"items":[{"id":"A","unit_cents":1},{"id":"A","unit_cents":2}]}"#,
            r#"{"items":[{"id":"A","unit_cents":1}] trailing"#,
        ];
        for text in rejected {
            assert!(store.load(text).is_err(), "accepted {text:?}");
            assert_eq!(store.version(), 1);
            assert_eq!(store.price_of("COFFEE").unwrap().cents(), 500);
        }
    }

    #[test]
    fn test_error_messages_name_the_problem() {
        let store = CatalogStore::new();

        let err = store.load(r#"{"items":[{"id":"A","unit_cents":1},{"id":"A","unit_cents":2}]}"#);
        assert_eq!(
            err.unwrap_err().to_string(),
            "Invalid catalog item at index 1: id 'A' already exists"
        );

        let err = store.load(r#"{"items":[{"id":"A","unit_cents":2.5}]}"#);
        assert_eq!(
            err.unwrap_err().to_string(),
            "Invalid catalog item at index 0: unit_cents must be an integer"
        );

        let err = store.load(r#"{"nope":1}"#);
        assert_eq!(
            err.unwrap_err().to_string(),
            "Invalid catalog: items must be an array"
        );

        assert!(matches!(store.load(""), Err(CoreError::Json(_))));
    }

    #[test]
    fn test_unknown_fields_and_duplicate_keys() {
        let store = CatalogStore::new();
        store
            .load(r#"{"items":[{"id":"A","unit_cents":10,"unit_cents":99,"tax":"x"}],"meta":{}}"#)
            .unwrap();
        assert_eq!(store.price_of("A").unwrap().cents(), 10);
    }

    #[test]
    fn test_depth_limit_applies_to_catalog() {
        let store = CatalogStore::with_limits(JsonLimits::new(2));
        assert!(store.load(r#"{"items":[]}"#).is_ok());
        assert!(store.load(r#"{"items":[{"id":"A","unit_cents":1}]}"#).is_err());
        assert_eq!(store.limits().max_depth(), 2);
    }

    #[test]
    fn test_state_rejects_duplicate_ids() {
        let item = CatalogItem {
            id: "A".to_string(),
            name: String::new(),
            unit_cents: 1,
        };
        assert!(CatalogState::new(vec![item.clone()], 1).is_ok());
        assert!(CatalogState::new(vec![item.clone(), item], 1).is_err());
    }

    #[test]
    fn test_parse_leaves_duplicates_to_state() {
        let text = r#"{"items":[{"id":"A","unit_cents":1},{"id":"A","unit_cents":2}]}"#;
        let items = parse_catalog(text, JsonLimits::default()).unwrap();
        assert_eq!(items.len(), 2);

        let err = CatalogState::new(items, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid catalog item at index 1: id 'A' already exists"
        );
    }
}
