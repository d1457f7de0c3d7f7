//! Static registration table mapping buff ids to behavior factories.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, error, warn};

use super::behavior::BuffBehavior;

/// Zero-argument constructor for a behavior instance.
pub type BehaviorFactory = Arc<dyn Fn() -> Box<dyn BuffBehavior> + Send + Sync>;

/// Provenance of a registered behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptMetadata {
    pub id: String,
    pub origin: String,
    /// Registration time in milliseconds since the Unix epoch.
    pub loaded_at_ms: u64,
    pub version: Option<String>,
}

struct Entry {
    factory: BehaviorFactory,
    metadata: ScriptMetadata,
}

/// Buff id → behavior factory table.
///
/// Built once at startup and shared read-only between battles.
#[derive(Default)]
pub struct BuffRegistry {
    entries: HashMap<String, Entry>,
}

impl BuffRegistry {
    pub const UNKNOWN_ORIGIN: &'static str = "unknown";

    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `id`, replacing (and warning about) any
    /// previous entry.
    pub fn register(&mut self, id: impl Into<String>, factory: BehaviorFactory) {
        self.register_with(id, factory, Self::UNKNOWN_ORIGIN, None);
    }

    pub fn register_with(
        &mut self,
        id: impl Into<String>,
        factory: BehaviorFactory,
        origin: impl Into<String>,
        version: Option<String>,
    ) {
        let id = id.into();
        let metadata = ScriptMetadata {
            id: id.clone(),
            origin: origin.into(),
            loaded_at_ms: now_ms(),
            version,
        };
        if self.entries.contains_key(&id) {
            warn!(target: "battle::registry", buff = %id, "overwriting registered buff behavior");
        }
        debug!(target: "battle::registry", buff = %id, origin = %metadata.origin, "registered buff behavior");
        self.entries.insert(id, Entry { factory, metadata });
    }

    /// Registers a `Default`-constructible behavior type.
    pub fn register_behavior<B>(&mut self, id: impl Into<String>, origin: impl Into<String>)
    where
        B: BuffBehavior + Default + 'static,
    {
        let factory: BehaviorFactory = Arc::new(|| -> Box<dyn BuffBehavior> { Box::new(B::default()) });
        self.register_with(id, factory, origin, None);
    }

    pub fn batch_register<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, BehaviorFactory)>,
        S: Into<String>,
    {
        for (id, factory) in entries {
            self.register(id, factory);
        }
    }

    /// Builds a fresh behavior for `id`. Logs and returns `None` when unknown.
    pub fn get(&self, id: &str) -> Option<Box<dyn BuffBehavior>> {
        match self.entries.get(id) {
            Some(entry) => Some((entry.factory)()),
            None => {
                error!(target: "battle::registry", buff = id, "buff behavior not registered");
                None
            }
        }
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn metadata(&self, id: &str) -> Option<&ScriptMetadata> {
        self.entries.get(id).map(|entry| &entry.metadata)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for BuffRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuffRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::behavior::HookResult;
    use crate::buff::context::BuffContext;

    #[derive(Default)]
    struct Noop;

    impl BuffBehavior for Noop {
        fn on_apply(&self, _ctx: &mut BuffContext<'_>) -> HookResult {
            Ok(())
        }
    }

    #[test]
    fn lookup_and_metadata() {
        let mut registry = BuffRegistry::new();
        registry.register_behavior::<Noop>("noop", "builtin");

        assert!(registry.has("noop"));
        assert!(registry.get("noop").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(
            registry.metadata("noop").map(|m| m.origin.as_str()),
            Some("builtin")
        );

        let factory: BehaviorFactory = Arc::new(|| -> Box<dyn BuffBehavior> { Box::new(Noop) });
        registry.register("noop", factory);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.metadata("noop").map(|m| m.origin.as_str()),
            Some(BuffRegistry::UNKNOWN_ORIGIN)
        );

        assert!(registry.unregister("noop"));
        assert!(registry.is_empty());
    }
}
