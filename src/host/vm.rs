//! VM context interface and call ABI types
//!
//! The host's current interface is consumed through [`VmContext`]; its legacy
//! interface is a pair of raw entry points located by vtable slot (see
//! `resolver`), typed here so the dispatcher can reinterpret a resolved
//! address into a callable shape.

use core::ffi::c_void;
use core::fmt;
use core::ptr::{self, NonNull};

use super::string::FixedString;
use super::variable::ScrapArray;

/// Opaque 64-bit script object handle, meaningful only to the host.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHandle({:#x})", self.0)
    }
}

/// Non-owning pointer to the host's VM object, as the legacy entry points
/// expect to receive it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawVm(*mut c_void);

impl RawVm {
    #[inline]
    pub const fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    #[inline]
    pub const fn as_ptr(self) -> *mut c_void {
        self.0
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

/// Refcounted completion-callback handle owned by the host.
///
/// The bridge never inspects it; it is threaded through to the dispatch entry
/// points as an opaque pointer.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackHandle(NonNull<c_void>);

impl CallbackHandle {
    #[inline]
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Raw pointer an optional callback lowers to at the ABI boundary.
#[inline]
pub(crate) fn callback_ptr(done: Option<CallbackHandle>) -> *mut c_void {
    done.map_or(ptr::null_mut(), CallbackHandle::as_ptr)
}

/// Deferred argument supplier in the host's function-object ABI: a context
/// pointer plus an invoke thunk. The legacy entry points call it from inside
/// the host to have the packed arguments copied into host-owned storage.
#[repr(C)]
pub struct ScrapFunction {
    ctx: *mut c_void,
    thunk: unsafe extern "C" fn(ctx: *mut c_void, out: *mut ScrapArray) -> bool,
}

impl ScrapFunction {
    /// Assemble a scrap function from a context pointer and its thunk.
    ///
    /// # Safety
    /// `thunk` must be valid to call with `ctx`, and `ctx` must outlive every
    /// invocation made through the returned value.
    #[inline]
    pub unsafe fn from_raw_parts(
        ctx: *mut c_void,
        thunk: unsafe extern "C" fn(*mut c_void, *mut ScrapArray) -> bool,
    ) -> Self {
        Self { ctx, thunk }
    }

    /// Invoke the supplier, filling `out` with the packed arguments.
    ///
    /// # Safety
    /// The context captured at construction must still be live.
    #[inline]
    pub unsafe fn invoke(&self, out: &mut ScrapArray) -> bool {
        (self.thunk)(self.ctx, out)
    }
}

impl fmt::Debug for ScrapFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScrapFunction {{ ctx: {:?} }}", self.ctx)
    }
}

/// Inline argument supplier used by the current-interface dispatch calls.
pub type ArgSupplier<'a> = &'a mut dyn FnMut(&mut ScrapArray) -> bool;

/// The host VM's current-interface dispatch surface.
///
/// Both operations return whether the host accepted the dispatch request;
/// script execution itself is scheduled inside the host and may complete
/// later.
pub trait VmContext {
    /// Queue a call to a global script function.
    fn dispatch_static_call(
        &self,
        script: FixedString,
        func: FixedString,
        supply: ArgSupplier<'_>,
        done: Option<CallbackHandle>,
    ) -> bool;

    /// Queue a call to a function on a specific script instance.
    fn dispatch_method_call(
        &self,
        receiver: ObjectHandle,
        script: FixedString,
        func: FixedString,
        supply: ArgSupplier<'_>,
        done: Option<CallbackHandle>,
    ) -> bool;

    /// The VM object pointer the legacy entry points expect.
    fn raw(&self) -> RawVm;
}

/// Legacy static-call entry point, located at [`super::STATIC_CALL_SLOT`].
pub type DispatchStaticLegacyFn = unsafe extern "C" fn(
    vm: RawVm,
    script: *const FixedString,
    func: *const FixedString,
    args: *const ScrapFunction,
    done: *mut c_void,
) -> bool;

/// Legacy method-call entry point, located at [`super::METHOD_CALL_SLOT`].
pub type DispatchMethodLegacyFn = unsafe extern "C" fn(
    vm: RawVm,
    receiver: ObjectHandle,
    script: *const FixedString,
    func: *const FixedString,
    args: *const ScrapFunction,
    done: *mut c_void,
) -> bool;
