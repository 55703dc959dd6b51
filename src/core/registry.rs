//! # Type Handler Registry
//!
//! Maps a [`TypeTag`] to a handler, resolving unregistered tags through their
//! declared ancestors.
//!
//! A lookup first checks the exact tag. On a miss the tag's ancestor chain is
//! walked up to [`TypeTag::OBJECT`]; the first registered ancestor's handler is
//! memoized under the queried tag so the next lookup is a single map hit.
//!
//! Reads share an `RwLock`; only registration and first-sighting memoization
//! take the write lock.
//!
//! ```rust
//! use layout_codec::core::registry::TypeHandlerRegistry;
//! use layout_codec::core::tag::TypeTag;
//!
//! const SHAPE: TypeTag = TypeTag::new("shape");
//! const CIRCLE: TypeTag = TypeTag::derived("circle", &SHAPE);
//!
//! let registry = TypeHandlerRegistry::new();
//! registry.set(SHAPE, 16usize).unwrap();
//! assert_eq!(registry.get(CIRCLE).unwrap(), 16);
//! ```

use crate::core::tag::TypeTag;
use crate::error::{constants, CodecError, Result};
use crate::utils::metrics::global_metrics;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

#[derive(Debug)]
struct Entries<H> {
    registered: HashMap<&'static str, H>,
    /// Derived tags memoized to an ancestor's handler.
    resolved: HashMap<&'static str, H>,
}

impl<H> Default for Entries<H> {
    fn default() -> Self {
        Self {
            registered: HashMap::new(),
            resolved: HashMap::new(),
        }
    }
}

impl<H: Clone> Entries<H> {
    fn lookup(&self, name: &str) -> Option<H> {
        self.registered
            .get(name)
            .or_else(|| self.resolved.get(name))
            .cloned()
    }
}

/// Concurrent handler registry keyed by type tag.
///
/// Clones share the same underlying table.
#[derive(Debug)]
pub struct TypeHandlerRegistry<H> {
    entries: Arc<RwLock<Entries<H>>>,
}

impl<H> Clone for TypeHandlerRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<H: Clone> Default for TypeHandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> TypeHandlerRegistry<H> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
        }
    }

    /// A registry pre-populated with `handlers`.
    pub fn with_handlers<I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = (TypeTag, H)>,
    {
        let mut entries = Entries::default();
        for (tag, handler) in handlers {
            entries.registered.insert(tag.name(), handler);
        }
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Registers or replaces the handler for exactly `tag`.
    ///
    /// Memoized resolutions are dropped since a nearer ancestor may now exist.
    pub fn set(&self, tag: TypeTag, handler: H) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CodecError::LockPoisoned(constants::ERR_REGISTRY_WRITE_LOCK))?;

        entries.registered.insert(tag.name(), handler);
        entries.resolved.clear();
        Ok(())
    }

    /// Resolves the handler for `tag` or its nearest registered ancestor.
    pub fn get(&self, tag: TypeTag) -> Result<H> {
        self.find(tag)?.ok_or_else(|| {
            global_metrics().lookup_failure();
            warn!(type_name = tag.name(), "No handler in ancestor chain");
            CodecError::HandlerNotFound {
                type_name: tag.name(),
            }
        })
    }

    /// Whether [`get`](Self::get) would succeed.
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.find(tag).map(|h| h.is_some()).unwrap_or(false)
    }

    /// Like [`get`](Self::get) but returns `None` when nothing resolves.
    pub fn find(&self, tag: TypeTag) -> Result<Option<H>> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|_| CodecError::LockPoisoned(constants::ERR_REGISTRY_READ_LOCK))?;

            if let Some(handler) = entries.lookup(tag.name()) {
                global_metrics().registry_hit();
                return Ok(Some(handler));
            }
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| CodecError::LockPoisoned(constants::ERR_REGISTRY_WRITE_LOCK))?;

        // another thread may have memoized it between the locks
        if let Some(handler) = entries.lookup(tag.name()) {
            global_metrics().registry_hit();
            return Ok(Some(handler));
        }

        let found = tag
            .ancestors()
            .skip(1)
            .find_map(|ancestor| {
                entries
                    .registered
                    .get(ancestor.name())
                    .map(|handler| (ancestor, handler.clone()))
            });

        Ok(found.map(|(ancestor, handler)| {
            debug!(
                type_name = tag.name(),
                ancestor = ancestor.name(),
                "Resolved handler through ancestor"
            );
            global_metrics().ancestor_resolution();
            entries.resolved.insert(tag.name(), handler.clone());
            handler
        }))
    }

    /// Registered plus memoized entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|e| e.registered.len() + e.resolved.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of memoized derived-type entries.
    pub fn resolved_len(&self) -> usize {
        self.entries.read().map(|e| e.resolved.len()).unwrap_or(0)
    }
}
