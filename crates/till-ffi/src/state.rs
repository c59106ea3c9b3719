//! Process-wide state behind the C ABI.
//!
//! ```text
//! RUNTIME (OnceLock)
//!   ├── config   CoreConfig, read from the environment once
//!   ├── catalog  CatalogStore shared by every cart
//!   └── carts    Mutex<CartArena>
//! ```
//!
//! Lock order is carts → catalog. Cart mutations hold the arena lock while
//! the cart reads a catalog snapshot; nothing takes them the other way round.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use till_core::{CatalogStore, CoreConfig};
use tracing_subscriber::EnvFilter;

use crate::handles::CartArena;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

pub(crate) struct Runtime {
    pub config: CoreConfig,
    pub catalog: CatalogStore,
    carts: Mutex<CartArena>,
}

impl Runtime {
    fn new(config: CoreConfig) -> Self {
        Runtime {
            catalog: CatalogStore::with_limits(config.json_limits()),
            carts: Mutex::new(CartArena::new()),
            config,
        }
    }

    /// Locks the cart arena, recovering from a poisoned lock.
    ///
    /// Every arena operation leaves it consistent before it can panic.
    pub fn carts(&self) -> MutexGuard<'_, CartArena> {
        self.carts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The runtime, created on first use.
pub(crate) fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Runtime::new(CoreConfig::from_env()))
}

/// Installs a `fmt` subscriber unless the host already has one.
///
/// `RUST_LOG` wins; otherwise the configured filter applies.
pub(crate) fn init_tracing(config: &CoreConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
