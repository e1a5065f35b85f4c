//! Delegation — letting a facade agent stand in for a core agent.
//!
//! `facade.proxy(&core)` bridges every pin tag the two agents share:
//!
//! | facade            | direction | core              |
//! |-------------------|-----------|-------------------|
//! | control           | →         | control           |
//! | input `t`         | →         | input `t`         |
//! | output `t`        | ←         | output `t`        |
//! | signal `t`        | ←         | signal `t`        |
//!
//! Unshared tags are left alone. Once bridged the facade is marked proxied,
//! which silences any internal mirror forwarding it has (see the composite
//! in `pinweave-agents`), so each value travels exactly one path.
//! The relation is permanent: there is no unproxy.

use crate::agent::Agent;
use crate::error::{PinError, Result};
use tracing::debug;

impl Agent {
    /// Delegate this agent's behavior to `core`.
    ///
    /// Fails with [`PinError::AlreadyProxied`] if a core is already set.
    pub fn proxy(&self, core: &Agent) -> Result<&Self> {
        if self.is_proxied() {
            return Err(PinError::AlreadyProxied { id: self.id() });
        }

        self.control().connect(core.control());

        let mut bridged = 0usize;
        for entry in core.inputs().entries() {
            if let Ok(facade_input) = self.inputs().get(entry.tag) {
                facade_input.forward(entry.pin);
                bridged += 1;
            }
        }

        for entry in core.outputs().entries() {
            if let Ok(facade_output) = self.outputs().get(entry.tag) {
                entry.pin.forward(facade_output);
                bridged += 1;
            }
        }

        for entry in core.signals().entries() {
            if let Ok(facade_signal) = self.signals().get(entry.tag) {
                entry.pin.connect(facade_signal);
                bridged += 1;
            }
        }

        self.proxy_flag.set();
        self.core.set(Some(core.id()));
        debug!(facade = %self.id(), core = %core.id(), bridged, "agent proxied");

        self.emit_proxied(core.id());
        Ok(self)
    }
}
