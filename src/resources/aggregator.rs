//! Recursive resource roll-up over an entity's component tree.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesOrdered, StreamExt};
use futures::FutureExt;

use crate::entity::cache::EntityCache;
use crate::entity::name::EntityName;
use crate::resources::entry::ResourceLedger;
use crate::resources::merge::add_resources;

/// A component chain that leads back to one of its own ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDiagnostic {
    /// Call path from the root entity, ending with the entity that was
    /// reached again.
    pub path: Vec<EntityName>,
}

impl CycleDiagnostic {
    /// The entity that was reached again.
    pub fn entity(&self) -> Option<&EntityName> {
        self.path.last()
    }
}

impl fmt::Display for CycleDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.path.iter().map(EntityName::as_str).collect();
        write!(f, "{}", names.join(" -> "))
    }
}

/// Totaled resources for an entity tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rollup {
    pub ledger: ResourceLedger,
    /// Cycles cut during the roll-up. When non-empty, `ledger` omits the
    /// repeated branches.
    pub cycles: Vec<CycleDiagnostic>,
}

impl Rollup {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Totals each entity's resources together with those of all its components,
/// recursively.
#[derive(Debug, Clone)]
pub struct ResourceAggregator {
    cache: EntityCache,
}

impl ResourceAggregator {
    pub fn new(cache: EntityCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Roll up `name`'s resources and those of every component it
    /// transitively references.
    ///
    /// Entities that fail to load contribute nothing. Component cycles are
    /// cut and reported in [`Rollup::cycles`]. Must run inside a tokio
    /// runtime.
    pub async fn total(&self, name: &EntityName) -> Rollup {
        self.clone()
            .total_on_path(name.clone(), Arc::new(Vec::new()))
            .await
    }

    /// `ancestors` holds the entities being totaled above `name`, root first.
    ///
    /// Each component is totaled in its own task, so stack use stays flat no
    /// matter how deep the component tree goes.
    fn total_on_path(
        self,
        name: EntityName,
        ancestors: Arc<Vec<EntityName>>,
    ) -> BoxFuture<'static, Rollup> {
        async move {
            let document = self.cache.resolve(&name).await;
            let base = document.resources().cloned().unwrap_or_default();

            if !document.has_components() {
                return Rollup {
                    ledger: base,
                    cycles: Vec::new(),
                };
            }

            let mut path = Vec::with_capacity(ancestors.len() + 1);
            path.extend(ancestors.iter().cloned());
            path.push(name.clone());
            let path = Arc::new(path);

            let mut rollup = Rollup {
                ledger: base,
                cycles: Vec::new(),
            };

            // Every child is spawned before any is awaited; results are merged
            // in component order as they become available.
            let mut pending = FuturesOrdered::new();
            for (component_name, component) in document.components() {
                let child = &component.entity;
                if path.contains(child) {
                    let mut cycle = path.to_vec();
                    cycle.push(child.clone());
                    let diagnostic = CycleDiagnostic { path: cycle };
                    log::warn!(
                        "Entity {} component '{}' forms a cycle: {}",
                        name,
                        component_name,
                        diagnostic
                    );
                    rollup.cycles.push(diagnostic);
                    continue;
                }
                let task = self
                    .clone()
                    .total_on_path(child.clone(), Arc::clone(&path));
                pending.push_back(tokio::spawn(task));
            }

            log::trace!("Entity {} waiting on {} component(s)", name, pending.len());

            while let Some(joined) = pending.next().await {
                match joined {
                    Ok(child) => {
                        add_resources(&mut rollup.ledger, &child.ledger);
                        rollup.cycles.extend(child.cycles);
                    }
                    Err(e) => {
                        log::error!("Entity {} component total failed: {}", name, e);
                    }
                }
            }

            rollup
        }
        .boxed()
    }
}
