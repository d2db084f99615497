//! Host binary interface - the surfaces the embedding application exposes
//!
//! Design: everything the bridge consumes but does not own lives here.
//!
//! Architecture:
//! - `variable.rs` - tagged script value and the scrap argument container
//! - `string.rs` - interned string handles in the host's fixed-string style
//! - `vm.rs` - VM context interface, callback handles, legacy entry ABI
//! - `resolver.rs` - relocation/vtable address resolution boundary
//! - `variant.rs` - process-wide binary-variant fact
//! - `registry.rs` - external event-subscriber registrations

mod registry;
mod resolver;
mod string;
mod variable;
mod variant;
mod vm;

pub use registry::{EventRegistry, Subscriber};
pub use resolver::{
    AddressResolver, RelocationId, VtableId, METHOD_CALL_SLOT, STATIC_CALL_SLOT, VM_VTABLE,
};
pub use string::FixedString;
pub use variable::{ScrapArray, VarKind, Variable};
pub use variant::{active, init as init_variant, HostVariant, VariantError};
pub use vm::{
    ArgSupplier, CallbackHandle, DispatchMethodLegacyFn, DispatchStaticLegacyFn, ObjectHandle,
    RawVm, ScrapFunction, VmContext,
};

pub(crate) use vm::callback_ptr;
