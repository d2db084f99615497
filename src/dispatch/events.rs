//! External event broadcast
//!
//! Scripts subscribe to native events through the host's registration store;
//! broadcasting re-dispatches one native event to every subscriber. The
//! argument list is packed exactly once per broadcast and shared across
//! subscribers, which is sound because packed Variables are immutable.

use core::pin::pin;

use tracing::{debug, trace};

use super::call::Dispatcher;
use super::pack::{pack_args, ArgList};
use super::staged::StagedArgs;
use crate::host::{EventRegistry, FixedString, HostVariant};

/// Fans one native event out to every registered script subscriber.
pub struct EventBroadcaster<'h> {
    dispatcher: &'h Dispatcher<'h>,
    registry: &'h dyn EventRegistry,
}

impl<'h> EventBroadcaster<'h> {
    pub fn new(dispatcher: &'h Dispatcher<'h>, registry: &'h dyn EventRegistry) -> Self {
        Self {
            dispatcher,
            registry,
        }
    }

    /// Dispatch `event` with `args` to every current subscriber.
    ///
    /// Subscribers run in the registry's iteration order. A rejection from
    /// one subscriber's dispatch never stops the rest; broadcast is
    /// best-effort and nothing waits for script-side completion. Argument
    /// arity against each subscriber's callback signature is host-defined per
    /// subscriber.
    pub fn broadcast<A: ArgList>(&self, event: &str, args: A) {
        super::record_event_broadcast();
        trace!(
            target: "dispatch",
            event,
            arity = A::ARITY,
            variant = %self.dispatcher.variant(),
            "broadcasting external event"
        );

        match self.dispatcher.variant() {
            HostVariant::Current => {
                let packed = pack_args(args);
                self.registry.for_each_subscriber(event, &mut |sub| {
                    super::record_subscriber_dispatch();
                    let script = FixedString::new(sub.script);
                    let func = FixedString::new(sub.callback);
                    let accepted = self.dispatcher.method_call_supplied(
                        sub.handle,
                        script,
                        func,
                        &mut |out| {
                            out.clone_from(&packed);
                            true
                        },
                        None,
                    );
                    if !accepted {
                        debug!(
                            target: "dispatch",
                            event,
                            receiver = ?sub.handle,
                            script = %script,
                            "subscriber rejected; continuing broadcast"
                        );
                    }
                });
            }
            HostVariant::Legacy => {
                let staged = pin!(StagedArgs::new(self.dispatcher.raw_vm(), args));
                let supplier = staged.as_ref().scrap_function();
                self.registry.for_each_subscriber(event, &mut |sub| {
                    super::record_subscriber_dispatch();
                    let script = FixedString::new(sub.script);
                    let func = FixedString::new(sub.callback);
                    let accepted = self.dispatcher.method_call_staged(
                        sub.handle,
                        script,
                        func,
                        &supplier,
                        None,
                    );
                    if !accepted {
                        debug!(
                            target: "dispatch",
                            event,
                            receiver = ?sub.handle,
                            script = %script,
                            "subscriber rejected; continuing broadcast"
                        );
                    }
                });
            }
        }
    }
}
