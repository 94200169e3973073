//! Per-category handler registry.
//!
//! Handlers are kept in one ordered list per [`Category`]. Registration order
//! is dispatch order and nothing is deduplicated. Handler ids are global, so
//! [`HandlerRegistry::remove`] does not need to know the category.
//!
//! The registry is shared by every execution unit. Reads (dispatch) take a
//! shared lock just long enough to clone the handler list. Writes take an
//! exclusive lock. No lock is held while a handler runs, so handlers may
//! register or remove other handlers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use kritor_core::{Category, DomainEvent};
use parking_lot::RwLock;
use tracing::debug;

use crate::handler::{Handler, HandlerId, HandlerResult, HandlerTarget, SharedEvent};

/// Mapping from category to its ordered handler list.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    categories: RwLock<HashMap<Category, Vec<Arc<Handler>>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to `category` and returns its id.
    pub fn register(&self, category: Category, target: HandlerTarget) -> HandlerId {
        let handler = Handler::new(category, target);
        let id = handler.id();
        let mode = handler.mode();

        self.categories
            .write()
            .entry(category)
            .or_default()
            .push(Arc::new(handler));

        debug!(handler_id = %id, category = %category, mode = ?mode, "Registered handler");
        id
    }

    /// Appends a blocking handler.
    pub fn register_blocking<F>(&self, category: Category, f: F) -> HandlerId
    where
        F: Fn(&DomainEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(category, HandlerTarget::blocking(f))
    }

    /// Appends a suspending handler.
    pub fn register_suspending<F, Fut>(&self, category: Category, f: F) -> HandlerId
    where
        F: Fn(SharedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(category, HandlerTarget::suspending(f))
    }

    /// Removes the handler with `id` from whichever category holds it.
    ///
    /// Returns `false` if no handler has that id.
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut categories = self.categories.write();
        for (category, handlers) in categories.iter_mut() {
            if let Some(pos) = handlers.iter().position(|h| h.id() == id) {
                handlers.remove(pos);
                debug!(handler_id = %id, category = %category, "Removed handler");
                return true;
            }
        }
        false
    }

    /// Removes every handler in `category` and returns how many were removed.
    pub fn clear(&self, category: Category) -> usize {
        let removed = self
            .categories
            .write()
            .remove(&category)
            .map_or(0, |handlers| handlers.len());
        debug!(category = %category, removed, "Cleared handlers");
        removed
    }

    /// Removes every handler in every category.
    pub fn clear_all(&self) {
        self.categories.write().clear();
    }

    /// Returns a snapshot of the handlers in `category`, in dispatch order.
    pub fn handlers(&self, category: Category) -> Vec<Arc<Handler>> {
        self.categories
            .read()
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of handlers in `category`.
    pub fn len(&self, category: Category) -> usize {
        self.categories.read().get(&category).map_or(0, Vec::len)
    }

    /// Returns `true` if no category has any handler.
    pub fn is_empty(&self) -> bool {
        self.categories.read().values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ExecutionMode;

    fn noop() -> HandlerTarget {
        HandlerTarget::blocking(|_| Ok(()))
    }

    #[test]
    fn test_register_preserves_order() {
        let registry = HandlerRegistry::new();
        let a = registry.register(Category::Message, noop());
        let b = registry.register_suspending(Category::Message, |_| async { Ok(()) });
        let c = registry.register(Category::Message, noop());

        let ids: Vec<_> = registry
            .handlers(Category::Message)
            .iter()
            .map(|h| h.id())
            .collect();
        assert_eq!(ids, [a, b, c]);
        assert_eq!(
            registry.handlers(Category::Message)[1].mode(),
            ExecutionMode::Suspending
        );
    }

    #[test]
    fn test_same_target_is_not_deduplicated() {
        let registry = HandlerRegistry::new();
        let target = noop();
        registry.register(Category::Notice, target.clone());
        registry.register(Category::Notice, target);
        assert_eq!(registry.len(Category::Notice), 2);
    }

    #[test]
    fn test_remove_scans_all_categories() {
        let registry = HandlerRegistry::new();
        registry.register(Category::Message, noop());
        let id = registry.register(Category::Request, noop());

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.len(Category::Request), 0);
        assert_eq!(registry.len(Category::Message), 1);
    }

    #[test]
    fn test_clear_category() {
        let registry = HandlerRegistry::new();
        registry.register(Category::Core, noop());
        registry.register(Category::Core, noop());
        registry.register(Category::Notice, noop());

        assert_eq!(registry.clear(Category::Core), 2);
        assert_eq!(registry.clear(Category::Core), 0);
        assert_eq!(registry.len(Category::Notice), 1);
        assert!(!registry.is_empty());

        registry.clear_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = HandlerRegistry::new();
        let id = registry.register(Category::Message, noop());
        let snapshot = registry.handlers(Category::Message);

        registry.remove(id);
        assert_eq!(snapshot.len(), 1);
        assert!(registry.handlers(Category::Message).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration() {
        let registry = Arc::new(HandlerRegistry::new());
        let mut tasks = Vec::new();

        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                (0..50)
                    .map(|_| registry.register(Category::Message, noop()))
                    .collect::<Vec<_>>()
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for task in tasks {
            for id in task.await.unwrap() {
                assert!(ids.insert(id));
            }
        }
        assert_eq!(registry.len(Category::Message), 400);
    }
}
