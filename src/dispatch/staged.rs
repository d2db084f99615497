//! Argument staging for the legacy call shape
//!
//! The legacy entry points do not take arguments eagerly; they take a
//! function object the host invokes later, from inside the dispatch, to have
//! the arguments copied into host-owned storage. [`StagedArgs`] packs the
//! arguments up front, owns the packed view for its whole lifetime, and hands
//! out that deferred callable.

use core::ffi::c_void;
use core::marker::PhantomPinned;
use core::pin::Pin;

use tracing::trace;

use super::pack::{pack_args, ArgList};
use crate::host::{RawVm, ScrapArray, ScrapFunction};

/// Packed argument sequence bound to the VM context it will be supplied to.
struct ArrayView {
    packed: ScrapArray,
    vm: RawVm,
}

impl ArrayView {
    fn copy_into(&self, out: &mut ScrapArray) -> bool {
        trace!(target: "dispatch", vm = ?self.vm.as_ptr(), len = self.packed.len(), "supplying staged arguments");
        out.clone_from(&self.packed);
        true
    }
}

/// Owns one call's packed arguments for the legacy dispatch shape.
///
/// The deferred callable returned by [`scrap_function`](Self::scrap_function)
/// captures this object's address, so the object is neither copyable nor
/// movable and must outlive every invocation of the callable. Construct it in
/// place with [`core::pin::pin!`] and keep it scoped to the enclosing call
/// expression.
pub struct StagedArgs {
    view: Box<ArrayView>,
    _pin: PhantomPinned,
}

impl StagedArgs {
    /// Pack `args` and bind them to `vm`.
    pub fn new<A: ArgList>(vm: RawVm, args: A) -> Self {
        let packed = pack_args(args);
        super::record_staged_constructed();
        Self {
            view: Box::new(ArrayView { packed, vm }),
            _pin: PhantomPinned,
        }
    }

    /// The VM context the arguments are bound to.
    #[inline]
    pub fn vm(&self) -> RawVm {
        self.view.vm
    }

    /// Number of packed arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.view.packed.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.view.packed.is_empty()
    }

    /// The deferred "supply my arguments now" callable.
    ///
    /// Expected to be requested once per staging object; every returned
    /// callable reads the same immutable packed view and stays valid only
    /// while this object is alive.
    pub fn scrap_function(self: Pin<&Self>) -> ScrapFunction {
        let this: *const Self = self.get_ref();
        // SAFETY: the thunk dereferences `this`, which cannot relocate while
        // pinned; the caller keeps the object alive across every invocation
        // per the ScrapFunction contract.
        unsafe { ScrapFunction::from_raw_parts(this as *mut c_void, supply_staged) }
    }
}

unsafe extern "C" fn supply_staged(ctx: *mut c_void, out: *mut ScrapArray) -> bool {
    // SAFETY: ctx is the address of a live, pinned StagedArgs
    let staged = unsafe { &*(ctx as *const StagedArgs) };
    // SAFETY: the host passes a valid output array
    staged.view.copy_into(unsafe { &mut *out })
}

impl Drop for StagedArgs {
    fn drop(&mut self) {
        // The view releases with the Box; only the counter needs updating.
        super::record_staged_released();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Variable;
    use core::pin::pin;
    use std::sync::MutexGuard;

    fn test_vm() -> RawVm {
        RawVm::from_ptr(0x1000 as *mut c_void)
    }

    // Staging bumps the global counters; hold the shared lock so the
    // counter-asserting suite sees consistent snapshots.
    fn counter_guard() -> MutexGuard<'static, ()> {
        crate::dispatch::TEST_COUNTER_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn supplies_exactly_the_packed_sequence() {
        let _guard = counter_guard();
        let staged = pin!(StagedArgs::new(test_vm(), (7, "word", false)));
        let supplier = staged.as_ref().scrap_function();

        let mut out = ScrapArray::new();
        assert!(unsafe { supplier.invoke(&mut out) });
        assert_eq!(out.len(), 3);
        assert_eq!(out.get(0), Some(&Variable::int(7)));
        assert_eq!(
            out.get(1),
            Some(&Variable::string(crate::host::FixedString::new("word")))
        );
        assert_eq!(out.get(2), Some(&Variable::boolean(false)));
    }

    #[test]
    fn supplier_overwrites_stale_output() {
        let _guard = counter_guard();
        let staged = pin!(StagedArgs::new(test_vm(), (1,)));
        let supplier = staged.as_ref().scrap_function();

        let mut out = ScrapArray::new();
        out.push(Variable::int(99));
        out.push(Variable::int(98));
        assert!(unsafe { supplier.invoke(&mut out) });
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0), Some(&Variable::int(1)));
    }

    #[test]
    fn supplier_can_run_once_per_subscriber() {
        // The legacy broadcast path reuses one staged callable.
        let _guard = counter_guard();
        let staged = pin!(StagedArgs::new(test_vm(), (5, 6)));
        let supplier = staged.as_ref().scrap_function();

        for _ in 0..3 {
            let mut out = ScrapArray::new();
            assert!(unsafe { supplier.invoke(&mut out) });
            assert_eq!(out.len(), 2);
        }
    }

    #[test]
    fn binds_the_vm_context() {
        let _guard = counter_guard();
        let staged = StagedArgs::new(test_vm(), ());
        assert_eq!(staged.vm(), test_vm());
        assert!(staged.is_empty());
    }
}
