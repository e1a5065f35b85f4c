//! Topic — the minimal named-event bus every component is built on.
//!
//! A [`Channel`] is an ordered list of subscriber callbacks invoked
//! synchronously, in registration order, on every fire. A [`Topic`] is a set
//! of named channels, each with its own event type.

use crate::error::{PinError, Result};
use crate::types::Subscription;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback<T> = Rc<dyn Fn(&T)>;

/// A synchronous publish/subscribe channel.
pub struct Channel<T> {
    name: String,
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(u64, Callback<T>)>>,
}

impl<T: 'static> Channel<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a callback. It is invoked for every later fire until
    /// unsubscribed or until the channel is cleared.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        Subscription(id)
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != subscription.0);
        subscribers.len() != before
    }

    pub fn is_subscribed(&self, subscription: Subscription) -> bool {
        self.subscribers
            .borrow()
            .iter()
            .any(|(id, _)| *id == subscription.0)
    }

    /// Deliver `value` to every subscriber, depth-first.
    ///
    /// The subscriber list is snapshotted first, so callbacks may subscribe,
    /// unsubscribe or fire this same channel again. A subscriber removed
    /// during delivery is skipped. Returns the number of callbacks invoked.
    pub fn fire(&self, value: &T) -> usize {
        let snapshot: Vec<(u64, Callback<T>)> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.is_subscribed(Subscription(id)) {
                continue;
            }
            callback(value);
            delivered += 1;
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Drop every subscriber.
    pub fn clear(&self) {
        // Move the callbacks out before dropping them: a callback's captures
        // may touch this channel when dropped.
        let drained: Vec<_> = self.subscribers.borrow_mut().drain(..).collect();
        drop(drained);
    }
}

impl<T> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

/// Type-erased view of a channel, so a topic can hold channels of
/// different event types.
trait ErasedChannel {
    fn clear(&self);
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: 'static> ErasedChannel for Channel<T> {
    fn clear(&self) {
        Channel::clear(self);
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A set of named event channels.
#[derive(Default)]
pub struct Topic {
    channels: RefCell<Vec<(String, Rc<dyn ErasedChannel>)>>,
}

impl Topic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a channel carrying events of type `T`.
    ///
    /// Defining an existing channel with the same type returns it;
    /// a different type is an error.
    pub fn define<T: 'static>(&self, name: &str) -> Result<Rc<Channel<T>>> {
        if self.has(name) {
            return self.on(name);
        }
        let channel = Rc::new(Channel::<T>::new(name));
        let erased: Rc<dyn ErasedChannel> = channel.clone();
        self.channels.borrow_mut().push((name.to_string(), erased));
        Ok(channel)
    }

    /// Get the subscribable channel for `name`.
    pub fn on<T: 'static>(&self, name: &str) -> Result<Rc<Channel<T>>> {
        let erased = self
            .channels
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| Rc::clone(c))
            .ok_or_else(|| PinError::unknown_channel(name))?;

        erased
            .into_any()
            .downcast::<Channel<T>>()
            .map_err(|_| PinError::ChannelType {
                channel: name.to_string(),
            })
    }

    /// Emit `event` on the named channel.
    pub fn emit<T: 'static>(&self, name: &str, event: &T) -> Result<usize> {
        Ok(self.on::<T>(name)?.fire(event))
    }

    pub fn has(&self, name: &str) -> bool {
        self.channels.borrow().iter().any(|(n, _)| n == name)
    }

    /// Channel names in definition order.
    pub fn channels(&self) -> Vec<String> {
        self.channels.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Drop every subscriber on every channel. Channels stay defined.
    pub fn cleanup(&self) {
        let channels: Vec<_> = self
            .channels
            .borrow()
            .iter()
            .map(|(_, c)| Rc::clone(c))
            .collect();
        for channel in channels {
            channel.clear();
        }
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("channels", &self.channels())
            .finish()
    }
}
