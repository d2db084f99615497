//! Variant dispatch - one logical call, two binary shapes
//!
//! The host's refactored builds expose dispatch operations on the VM object
//! that take an inline argument supplier. Older builds expose the same
//! operations only through fixed vtable slots, with a different parameter
//! shape that wants a staged function object. Which shape applies is a
//! process-wide fact; this module is the single place that branches on it.

use core::mem;
use core::pin::pin;

use tracing::{debug, error, trace, warn};

use super::pack::ArgList;
use super::staged::StagedArgs;
use crate::host::{
    active, callback_ptr, AddressResolver, CallbackHandle, DispatchMethodLegacyFn,
    DispatchStaticLegacyFn, FixedString, HostVariant, ObjectHandle, RawVm, ScrapArray,
    ScrapFunction, VmContext, METHOD_CALL_SLOT, STATIC_CALL_SLOT, VM_VTABLE,
};

/// Issues dispatch requests into the hosted scripting VM.
///
/// The returned booleans mean "the host accepted the request", never "the
/// script ran"; execution is scheduled inside the host and may complete after
/// the call returns.
pub struct Dispatcher<'h> {
    vm: &'h dyn VmContext,
    resolver: &'h dyn AddressResolver,
    variant: HostVariant,
}

impl<'h> Dispatcher<'h> {
    /// Dispatcher for an explicitly chosen interface variant.
    pub fn new(
        vm: &'h dyn VmContext,
        resolver: &'h dyn AddressResolver,
        variant: HostVariant,
    ) -> Self {
        Self {
            vm,
            resolver,
            variant,
        }
    }

    /// Dispatcher for the variant recorded at startup.
    ///
    /// Falls back to the current interface when initialization never ran.
    pub fn from_runtime(vm: &'h dyn VmContext, resolver: &'h dyn AddressResolver) -> Self {
        let variant = match active() {
            Some(variant) => variant,
            None => {
                warn!(
                    target: "dispatch",
                    "host variant never initialized; assuming the current interface"
                );
                HostVariant::Current
            }
        };
        Self::new(vm, resolver, variant)
    }

    /// The interface variant this dispatcher was built for.
    #[inline]
    pub fn variant(&self) -> HostVariant {
        self.variant
    }

    #[inline]
    pub(crate) fn raw_vm(&self) -> RawVm {
        self.vm.raw()
    }

    /// Probe the legacy entry slots once at startup.
    ///
    /// Resolution has no error channel, so a wrong database can only be
    /// caught heuristically; a null slot is a fatal integration fault and is
    /// logged here rather than on every call.
    pub fn verify_entry_points(&self) -> bool {
        if self.variant != HostVariant::Legacy {
            return true;
        }
        let static_addr = self.resolver.resolve_vtable_slot(VM_VTABLE, STATIC_CALL_SLOT);
        let method_addr = self.resolver.resolve_vtable_slot(VM_VTABLE, METHOD_CALL_SLOT);
        if static_addr == 0 || method_addr == 0 {
            error!(
                target: "dispatch",
                static_addr,
                method_addr,
                "legacy dispatch entry resolution failed; script calls are undefined"
            );
            return false;
        }
        debug!(
            target: "dispatch",
            static_addr,
            method_addr,
            "legacy dispatch entries resolved"
        );
        true
    }

    /// Call a global script function.
    ///
    /// `args` must match the target's declared signature; that contract is
    /// the caller's and is not checked here.
    pub fn call_static<A: ArgList>(
        &self,
        script: FixedString,
        func: FixedString,
        done: Option<CallbackHandle>,
        args: A,
    ) -> bool {
        super::record_static_call();
        trace!(
            target: "dispatch",
            script = %script,
            func = %func,
            arity = A::ARITY,
            variant = %self.variant,
            "static call"
        );

        let accepted = match self.variant {
            HostVariant::Current => {
                let mut args = Some(args);
                self.vm
                    .dispatch_static_call(script, func, &mut |out| supply_once(&mut args, out), done)
            }
            HostVariant::Legacy => {
                let staged = pin!(StagedArgs::new(self.vm.raw(), args));
                let supplier = staged.as_ref().scrap_function();
                self.dispatch_static_legacy(script, func, &supplier, done)
            }
        };

        if !accepted {
            super::record_rejection();
            debug!(target: "dispatch", script = %script, func = %func, "static call rejected by host");
        }
        accepted
    }

    /// Call a function on a specific script instance.
    pub fn call_method<A: ArgList>(
        &self,
        receiver: ObjectHandle,
        script: FixedString,
        func: FixedString,
        done: Option<CallbackHandle>,
        args: A,
    ) -> bool {
        trace!(
            target: "dispatch",
            receiver = ?receiver,
            script = %script,
            func = %func,
            arity = A::ARITY,
            variant = %self.variant,
            "method call"
        );

        match self.variant {
            HostVariant::Current => {
                let mut args = Some(args);
                self.method_call_supplied(
                    receiver,
                    script,
                    func,
                    &mut |out| supply_once(&mut args, out),
                    done,
                )
            }
            HostVariant::Legacy => {
                let staged = pin!(StagedArgs::new(self.vm.raw(), args));
                let supplier = staged.as_ref().scrap_function();
                self.method_call_staged(receiver, script, func, &supplier, done)
            }
        }
    }

    /// Current-interface method dispatch with a caller-provided supplier.
    /// The broadcast path reuses this to share one packed sequence.
    pub(crate) fn method_call_supplied(
        &self,
        receiver: ObjectHandle,
        script: FixedString,
        func: FixedString,
        supply: &mut dyn FnMut(&mut ScrapArray) -> bool,
        done: Option<CallbackHandle>,
    ) -> bool {
        super::record_method_call();
        let accepted = self
            .vm
            .dispatch_method_call(receiver, script, func, supply, done);
        if !accepted {
            super::record_rejection();
            debug!(target: "dispatch", receiver = ?receiver, script = %script, func = %func, "method call rejected by host");
        }
        accepted
    }

    /// Legacy method dispatch with an already-staged supplier.
    /// The broadcast path reuses this to share one staged callable.
    pub(crate) fn method_call_staged(
        &self,
        receiver: ObjectHandle,
        script: FixedString,
        func: FixedString,
        supplier: &ScrapFunction,
        done: Option<CallbackHandle>,
    ) -> bool {
        super::record_method_call();
        let accepted = self.dispatch_method_legacy(receiver, script, func, supplier, done);
        if !accepted {
            super::record_rejection();
            debug!(target: "dispatch", receiver = ?receiver, script = %script, func = %func, "method call rejected by host");
        }
        accepted
    }

    fn dispatch_static_legacy(
        &self,
        script: FixedString,
        func: FixedString,
        supplier: &ScrapFunction,
        done: Option<CallbackHandle>,
    ) -> bool {
        super::record_legacy_dispatch();
        let addr = self.resolver.resolve_vtable_slot(VM_VTABLE, STATIC_CALL_SLOT);
        // SAFETY: the resolver contract guarantees the slot holds the
        // static-call entry for the running build; a stale database is an
        // unrecoverable integration fault by design.
        let entry: DispatchStaticLegacyFn = unsafe { mem::transmute(addr) };
        unsafe { entry(self.vm.raw(), &script, &func, supplier, callback_ptr(done)) }
    }

    fn dispatch_method_legacy(
        &self,
        receiver: ObjectHandle,
        script: FixedString,
        func: FixedString,
        supplier: &ScrapFunction,
        done: Option<CallbackHandle>,
    ) -> bool {
        super::record_legacy_dispatch();
        let addr = self.resolver.resolve_vtable_slot(VM_VTABLE, METHOD_CALL_SLOT);
        // SAFETY: same contract as the static entry, slot 46
        let entry: DispatchMethodLegacyFn = unsafe { mem::transmute(addr) };
        unsafe {
            entry(
                self.vm.raw(),
                receiver,
                &script,
                &func,
                supplier,
                callback_ptr(done),
            )
        }
    }
}

/// Pack a moved-in argument list on first invocation; later invocations
/// report failure instead of supplying stale data.
fn supply_once<A: ArgList>(args: &mut Option<A>, out: &mut ScrapArray) -> bool {
    match args.take() {
        Some(args) => {
            args.pack_into(out);
            true
        }
        None => false,
    }
}
