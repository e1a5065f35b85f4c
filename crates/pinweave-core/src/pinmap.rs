//! PinMap — an ordered, tag-keyed collection of pins with a one-way lock.

use crate::error::{PinError, Result};
use crate::pin::Pin;
use std::collections::HashMap;
use tracing::warn;

/// One `(tag, pin)` pair of a [`PinMap`].
#[derive(Debug)]
pub struct Entry<'a, P> {
    pub tag: &'a str,
    pub pin: &'a P,
}

/// Ordered mapping from tag to pin.
///
/// Before [`lock`](PinMap::lock) pins may be attached; afterwards the tag
/// set is frozen and only lookup is allowed.
#[derive(Debug)]
pub struct PinMap<P> {
    pins: Vec<(String, P)>,
    index: HashMap<String, usize>,
    locked: bool,
}

impl<P> PinMap<P> {
    pub fn new() -> Self {
        Self {
            pins: Vec::new(),
            index: HashMap::new(),
            locked: false,
        }
    }

    /// Insert `pin` under `tag`.
    pub fn attach(&mut self, tag: impl Into<String>, pin: P) -> Result<()> {
        let tag = tag.into();
        if self.locked {
            warn!(%tag, "attach after lock rejected");
            return Err(PinError::locked(tag));
        }
        if self.index.contains_key(&tag) {
            return Err(PinError::duplicate_tag(tag));
        }
        self.index.insert(tag.clone(), self.pins.len());
        self.pins.push((tag, pin));
        Ok(())
    }

    /// Look up a pin, failing loudly on an undeclared tag.
    pub fn get(&self, tag: &str) -> Result<&P> {
        self.index
            .get(tag)
            .map(|&i| &self.pins[i].1)
            .ok_or_else(|| PinError::tag_not_found(tag))
    }

    pub fn has(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Freeze the tag set. Idempotent and irreversible.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lazily iterate `(tag, pin)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_, P>> + '_ {
        self.pins.iter().map(|(tag, pin)| Entry {
            tag: tag.as_str(),
            pin,
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.pins.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl<P: Pin> PinMap<P> {
    /// Release every contained pin.
    pub fn cleanup(&self) {
        for (_, pin) in &self.pins {
            pin.cleanup();
        }
    }

    pub fn reset(&self) {
        for (_, pin) in &self.pins {
            pin.reset();
        }
    }
}

impl<P> Default for PinMap<P> {
    fn default() -> Self {
        Self::new()
    }
}
