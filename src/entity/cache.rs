//! Entity cache with single-flight fetches.
//!
//! Every name moves through one state machine, exactly once:
//! MISSING -> IN_FLIGHT -> RESOLVED
//!
//! Lines are never evicted. A resolved document is immutable and shared by
//! every caller that asks for the name.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::entity::document::{DocumentParser, EntityDocument, JsonParser};
use crate::entity::name::EntityName;
use crate::fetch::EntityFetcher;

type Waiter = oneshot::Sender<Arc<EntityDocument>>;

enum CacheLine {
    /// Fetch issued, response not yet processed. Waiters in registration order.
    InFlight { waiters: Vec<Waiter> },
    Resolved(Arc<EntityDocument>),
}

/// Externally visible state of a cache line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never requested
    Missing,
    /// Fetch outstanding
    InFlight { waiters: usize },
    /// Document available (`valid` is false for the invalid sentinel)
    Resolved { valid: bool },
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "MISSING"),
            Self::InFlight { waiters } => write!(f, "IN_FLIGHT({})", waiters),
            Self::Resolved { valid: true } => write!(f, "RESOLVED"),
            Self::Resolved { valid: false } => write!(f, "RESOLVED(INVALID)"),
        }
    }
}

struct CacheInner {
    lines: Mutex<HashMap<EntityName, CacheLine>>,
    fetcher: Arc<dyn EntityFetcher>,
    parser: Arc<dyn DocumentParser>,
    fetches: AtomicU64,
}

impl CacheInner {
    fn lock_lines(&self) -> MutexGuard<'_, HashMap<EntityName, CacheLine>> {
        // Lines are only replaced whole, so a poisoned map is still consistent.
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch and parse, folding every failure into the invalid sentinel.
    async fn load(&self, name: &EntityName) -> EntityDocument {
        let response = match self.fetcher.fetch(name).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Entity {} fetch failed: {}", name, e);
                return EntityDocument::Invalid;
            }
        };

        if !response.is_success() {
            log::warn!("Entity {} error HTTP {}", name, response.status);
            return EntityDocument::Invalid;
        }

        match self.parser.parse(&response.body) {
            Ok(entity) => EntityDocument::Valid(entity),
            Err(e) => {
                log::warn!("Entity {} error in JSON parse: {}", name, e);
                EntityDocument::Invalid
            }
        }
    }

    /// Resolve the line and wake its waiters in order.
    fn complete(&self, name: &EntityName, document: Arc<EntityDocument>) {
        let previous = self
            .lock_lines()
            .insert(name.clone(), CacheLine::Resolved(Arc::clone(&document)));

        let waiters = match previous {
            Some(CacheLine::InFlight { waiters }) => waiters,
            Some(CacheLine::Resolved(_)) => {
                log::error!("Entity {} resolved twice", name);
                Vec::new()
            }
            None => Vec::new(),
        };

        log::debug!(
            "Entity {} resolved (valid: {}), waking {} waiter(s)",
            name,
            document.is_valid(),
            waiters.len()
        );
        for waiter in waiters {
            // A dropped receiver just means that caller stopped waiting.
            let _ = waiter.send(Arc::clone(&document));
        }
    }
}

/// Completes its line with the invalid sentinel if the fetch task ends
/// without delivering a document (panic or runtime shutdown).
struct PendingFetch {
    inner: Arc<CacheInner>,
    name: EntityName,
    done: bool,
}

impl PendingFetch {
    fn finish(mut self, document: EntityDocument) {
        self.done = true;
        self.inner.complete(&self.name, Arc::new(document));
    }
}

impl Drop for PendingFetch {
    fn drop(&mut self) {
        if !self.done {
            log::error!("Fetch for entity {} ended without a result", self.name);
            self.inner
                .complete(&self.name, Arc::new(EntityDocument::Invalid));
        }
    }
}

/// Cache of entity documents keyed by name.
///
/// Concurrent requests for the same name share one remote fetch. Clones share
/// the same cache. Resolving must happen inside a tokio runtime, since misses
/// spawn their fetch as a task.
#[derive(Clone)]
pub struct EntityCache {
    inner: Arc<CacheInner>,
}

impl EntityCache {
    /// Create a cache that parses responses as JSON.
    pub fn new(fetcher: impl EntityFetcher + 'static) -> Self {
        Self::with_parser(fetcher, JsonParser)
    }

    /// Create a cache with a custom document parser.
    pub fn with_parser(
        fetcher: impl EntityFetcher + 'static,
        parser: impl DocumentParser + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                lines: Mutex::new(HashMap::new()),
                fetcher: Arc::new(fetcher),
                parser: Arc::new(parser),
                fetches: AtomicU64::new(0),
            }),
        }
    }

    /// Get an entity's document, fetching it on first use.
    ///
    /// Never fails: network, HTTP and parse errors all resolve to
    /// [`EntityDocument::Invalid`].
    pub async fn resolve(&self, name: &EntityName) -> Arc<EntityDocument> {
        let (receiver, is_miss) = {
            let mut lines = self.inner.lock_lines();
            match lines.get_mut(name) {
                Some(CacheLine::Resolved(document)) => {
                    log::trace!("Entity {} cache hit", name);
                    return Arc::clone(document);
                }
                Some(CacheLine::InFlight { waiters }) => {
                    let (sender, receiver) = oneshot::channel();
                    waiters.push(sender);
                    (receiver, false)
                }
                None => {
                    // Registered before the fetch starts, so every later
                    // request joins this line instead of fetching again.
                    let (sender, receiver) = oneshot::channel();
                    lines.insert(
                        name.clone(),
                        CacheLine::InFlight {
                            waiters: vec![sender],
                        },
                    );
                    (receiver, true)
                }
            }
        };

        if is_miss {
            self.spawn_fetch(name.clone());
        }

        match receiver.await {
            Ok(document) => document,
            Err(_) => {
                log::error!("Entity {} waiter dropped without a result", name);
                Arc::new(EntityDocument::Invalid)
            }
        }
    }

    fn spawn_fetch(&self, name: EntityName) {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        log::debug!("Entity {} cache miss, fetching", name);

        let pending = PendingFetch {
            inner: Arc::clone(&self.inner),
            name,
            done: false,
        };
        tokio::spawn(async move {
            let document = pending.inner.load(&pending.name).await;
            pending.finish(document);
        });
    }

    /// Current state of a name's line.
    pub fn state(&self, name: &EntityName) -> CacheState {
        match self.inner.lock_lines().get(name) {
            None => CacheState::Missing,
            Some(CacheLine::InFlight { waiters }) => CacheState::InFlight {
                waiters: waiters.len(),
            },
            Some(CacheLine::Resolved(document)) => CacheState::Resolved {
                valid: document.is_valid(),
            },
        }
    }

    /// The resolved document, without triggering a fetch.
    pub fn cached(&self, name: &EntityName) -> Option<Arc<EntityDocument>> {
        match self.inner.lock_lines().get(name) {
            Some(CacheLine::Resolved(document)) => Some(Arc::clone(document)),
            _ => None,
        }
    }

    /// Number of lines, in flight or resolved.
    pub fn len(&self) -> usize {
        self.inner.lock_lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remote fetches issued since construction.
    pub fn fetch_count(&self) -> u64 {
        self.inner.fetches.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCache")
            .field("lines", &self.len())
            .field("fetches", &self.fetch_count())
            .finish()
    }
}
