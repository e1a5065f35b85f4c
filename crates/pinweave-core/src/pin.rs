//! Pins — the four channel kinds an agent exposes.
//!
//! - [`InputPin`] receives values pushed from outside.
//! - [`OutputPin`] sends values to zero or more connected inputs.
//! - [`SignalPin`] fires payload-less activations, many-to-many.
//! - [`ControlPin`] is the single activation entry point of an agent.
//!
//! Pins are cheap handles (`Clone` shares the same pin). Every operation is
//! synchronous: `send`, `receive` and `activate` return only after every
//! subscriber, and everything those subscribers triggered, has run.

use crate::topic::Channel;
use crate::types::Subscription;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::trace;

/// Contract shared by every pin kind.
pub trait Pin {
    /// Return the pin to its initial, empty state. Subscribers are kept.
    fn reset(&self);

    /// Release every subscriber. Later fires reach nobody.
    fn cleanup(&self);

    fn is_cleaned(&self) -> bool;
}

struct ValueCore<T> {
    channel: Channel<T>,
    last: RefCell<Option<T>>,
    cleaned: Cell<bool>,
}

impl<T: Clone + 'static> ValueCore<T> {
    fn new(name: &str) -> Self {
        Self {
            channel: Channel::new(name),
            last: RefCell::new(None),
            cleaned: Cell::new(false),
        }
    }

    fn fire(&self, value: T) {
        if self.cleaned.get() {
            trace!(channel = self.channel.name(), "fire on cleaned pin ignored");
            return;
        }
        *self.last.borrow_mut() = Some(value.clone());
        self.channel.fire(&value);
    }

    fn reset(&self) {
        self.last.borrow_mut().take();
    }

    fn cleanup(&self) {
        self.cleaned.set(true);
        self.last.borrow_mut().take();
        self.channel.clear();
    }

    /// Subscribe a wire that re-fires every value into `target`.
    ///
    /// The wire removes itself the first time it finds `target` dropped.
    fn wire(self: &Rc<Self>, target: Weak<ValueCore<T>>) -> Subscription {
        let source = Rc::downgrade(self);
        let slot: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let own = slot.clone();
        let wire = self.channel.subscribe(move |value: &T| match target.upgrade() {
            Some(core) => core.fire(value.clone()),
            None => {
                if let (Some(source), Some(wire)) = (source.upgrade(), own.get()) {
                    trace!(channel = source.channel.name(), "pruning wire to dropped pin");
                    source.channel.unsubscribe(wire);
                }
            }
        });
        slot.set(Some(wire));
        wire
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A pin that receives values.
pub struct InputPin<T> {
    core: Rc<ValueCore<T>>,
}

impl<T> Clone for InputPin<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: Clone + 'static> InputPin<T> {
    pub fn new() -> Self {
        Self {
            core: Rc::new(ValueCore::new("received")),
        }
    }

    /// Push a value into this pin, notifying every `on_received` subscriber.
    pub fn receive(&self, value: T) {
        self.core.fire(value);
    }

    /// The stream fired on every `receive`.
    pub fn on_received(&self) -> &Channel<T> {
        &self.core.channel
    }

    /// Shorthand for `on_received().subscribe(..)`.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.core.channel.subscribe(callback)
    }

    /// Re-deliver every value received here into `target`. Held weakly.
    pub fn forward(&self, target: &InputPin<T>) -> Subscription {
        self.core.wire(target.downgrade())
    }

    /// The most recently received value since the last reset.
    pub fn last(&self) -> Option<T> {
        self.core.last.borrow().clone()
    }

    /// Whether both handles refer to the same pin.
    pub fn same(&self, other: &InputPin<T>) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    fn downgrade(&self) -> Weak<ValueCore<T>> {
        Rc::downgrade(&self.core)
    }
}

impl<T: Clone + 'static> Default for InputPin<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Pin for InputPin<T> {
    fn reset(&self) {
        self.core.reset();
    }

    fn cleanup(&self) {
        self.core.cleanup();
    }

    fn is_cleaned(&self) -> bool {
        self.core.cleaned.get()
    }
}

impl<T> std::fmt::Debug for InputPin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputPin")
            .field("subscribers", &self.core.channel)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A pin that sends values to connected inputs.
pub struct OutputPin<T> {
    core: Rc<ValueCore<T>>,
}

impl<T> Clone for OutputPin<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: Clone + 'static> OutputPin<T> {
    pub fn new() -> Self {
        Self {
            core: Rc::new(ValueCore::new("sent")),
        }
    }

    /// Send a value. Connected inputs receive it in connection order.
    pub fn send(&self, value: T) {
        self.core.fire(value);
    }

    /// The stream fired on every `send`.
    pub fn on_sent(&self) -> &Channel<T> {
        &self.core.channel
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.core.channel.subscribe(callback)
    }

    /// Wire this output into `input`.
    ///
    /// Many outputs may feed one input (values interleave in send order) and
    /// one output may feed many inputs. The wire holds the input weakly: once
    /// the input is dropped the next send removes the wire.
    pub fn connect(&self, input: &InputPin<T>) -> Subscription {
        self.core.wire(input.downgrade())
    }

    /// Re-send every value sent here through `target`. Held weakly.
    pub fn forward(&self, target: &OutputPin<T>) -> Subscription {
        self.core.wire(Rc::downgrade(&target.core))
    }

    /// Remove a wire created by [`OutputPin::connect`].
    pub fn disconnect(&self, wire: Subscription) -> bool {
        self.core.channel.unsubscribe(wire)
    }

    /// The most recently sent value since the last reset.
    pub fn last(&self) -> Option<T> {
        self.core.last.borrow().clone()
    }

    pub fn same(&self, other: &OutputPin<T>) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl<T: Clone + 'static> Default for OutputPin<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Pin for OutputPin<T> {
    fn reset(&self) {
        self.core.reset();
    }

    fn cleanup(&self) {
        self.core.cleanup();
    }

    fn is_cleaned(&self) -> bool {
        self.core.cleaned.get()
    }
}

impl<T> std::fmt::Debug for OutputPin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputPin")
            .field("subscribers", &self.core.channel)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Signal & control
// ---------------------------------------------------------------------------

/// Shared activation core behind [`SignalPin`] and [`ControlPin`].
pub struct Trigger {
    channel: Channel<()>,
    count: Cell<u64>,
    cleaned: Cell<bool>,
}

impl Trigger {
    fn new() -> Self {
        Self {
            channel: Channel::new("activated"),
            count: Cell::new(0),
            cleaned: Cell::new(false),
        }
    }

    fn activate(&self) {
        if self.cleaned.get() {
            trace!("activation on cleaned pin ignored");
            return;
        }
        self.count.set(self.count.get() + 1);
        self.channel.fire(&());
    }
    fn wire(self: &Rc<Self>, target: Weak<Trigger>) -> Subscription {
        let source = Rc::downgrade(self);
        let slot: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let own = slot.clone();
        let wire = self.channel.subscribe(move |_| match target.upgrade() {
            Some(trigger) => trigger.activate(),
            None => {
                if let (Some(source), Some(wire)) = (source.upgrade(), own.get()) {
                    trace!("pruning signal wire to dropped pin");
                    source.channel.unsubscribe(wire);
                }
            }
        });
        slot.set(Some(wire));
        wire
    }
}

/// Anything that can be activated: the target of a signal wire.
pub trait Activation {
    #[doc(hidden)]
    fn trigger(&self) -> &Rc<Trigger>;

    fn activate(&self) {
        self.trigger().activate();
    }
}

macro_rules! trigger_pin {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            trigger: Rc<Trigger>,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    trigger: Rc::new(Trigger::new()),
                }
            }

            pub fn activate(&self) {
                self.trigger.activate();
            }

            /// The stream fired on every activation.
            pub fn on_activated(&self) -> &Channel<()> {
                &self.trigger.channel
            }

            pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
                self.trigger.channel.subscribe(move |_| callback())
            }

            /// Chain this pin's activations into `target`. Held weakly.
            pub fn connect(&self, target: &impl Activation) -> Subscription {
                self.trigger.wire(Rc::downgrade(target.trigger()))
            }

            pub fn disconnect(&self, wire: Subscription) -> bool {
                self.trigger.channel.unsubscribe(wire)
            }

            /// Activations since the last reset.
            pub fn activations(&self) -> u64 {
                self.trigger.count.get()
            }

            pub fn same(&self, other: &$name) -> bool {
                Rc::ptr_eq(&self.trigger, &other.trigger)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Activation for $name {
            fn trigger(&self) -> &Rc<Trigger> {
                &self.trigger
            }
        }

        impl Pin for $name {
            fn reset(&self) {
                self.trigger.count.set(0);
            }

            fn cleanup(&self) {
                self.trigger.cleaned.set(true);
                self.trigger.count.set(0);
                self.trigger.channel.clear();
            }

            fn is_cleaned(&self) -> bool {
                self.trigger.cleaned.get()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("activations", &self.trigger.count.get())
                    .field("subscribers", &self.trigger.channel)
                    .finish()
            }
        }
    };
}

trigger_pin!(
    /// A payload-less, many-to-many activation pin.
    SignalPin
);

trigger_pin!(
    /// The activation entry point of an agent. Exactly one per agent.
    ControlPin
);
