//! Process-wide identities for translated units.
//!
//! Every translation registers under a fresh name so the compiled unit never
//! collides with the definition it came from. Entries live as long as the
//! [`UnitHandle`] returned by [`UnitRegistry::register`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::trace;

/// Prefix of minted unit names.
pub const UNIT_PREFIX: &str = "_slipform_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(u64);

impl UnitId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", UNIT_PREFIX, self.0)
    }
}

/// What the registry knows about a live unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUnit {
    pub unit_name: String,
    pub original_name: String,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next: AtomicU64,
    live: Mutex<BTreeMap<UnitId, RegisteredUnit>>,
}

impl RegistryInner {
    fn live(&self) -> MutexGuard<'_, BTreeMap<UnitId, RegisteredUnit>> {
        // Recover from poisoning.
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    inner: Arc<RegistryInner>,
}

static GLOBAL: OnceLock<UnitRegistry> = OnceLock::new();

impl UnitRegistry {
    /// A private registry, mostly for tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process, created on first use.
    pub fn global() -> &'static UnitRegistry {
        GLOBAL.get_or_init(UnitRegistry::new)
    }

    /// Mint a new identity for a translation of `original_name`.
    pub fn register(&self, original_name: &str) -> UnitHandle {
        let id = UnitId(self.inner.next.fetch_add(1, Ordering::Relaxed) + 1);
        let unit_name = id.to_string();
        self.inner.live().insert(
            id,
            RegisteredUnit {
                unit_name: unit_name.clone(),
                original_name: original_name.to_string(),
            },
        );
        trace!(%id, original = original_name, "unit registered");
        UnitHandle {
            id,
            unit_name,
            registry: Arc::clone(&self.inner),
        }
    }

    pub fn lookup(&self, id: UnitId) -> Option<RegisteredUnit> {
        self.inner.live().get(&id).cloned()
    }

    /// Number of units whose handles are still alive.
    pub fn live_count(&self) -> usize {
        self.inner.live().len()
    }
}

/// Keeps a registry entry alive; dropping it releases the entry.
#[derive(Debug)]
pub struct UnitHandle {
    id: UnitId,
    unit_name: String,
    registry: Arc<RegistryInner>,
}

impl UnitHandle {
    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }
}

impl Drop for UnitHandle {
    fn drop(&mut self) {
        self.registry.live().remove(&self.id);
        trace!(id = %self.id, "unit released");
    }
}
