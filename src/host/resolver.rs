//! Address resolution boundary
//!
//! The host ships no export table for its script-dispatch internals; entry
//! points are found through a relocation database keyed by stable numeric
//! identifiers, or by indexing a known virtual-dispatch table. Resolution has
//! no error channel: a mismatched database can only hand back a wrong address
//! silently, which is why `Dispatcher::verify_entry_points` probes and logs
//! once at startup instead of trusting every call blindly.

/// Stable numeric identifier of one relocated function.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelocationId(pub u64);

/// Stable numeric identifier of one virtual-dispatch table.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VtableId(pub u64);

/// The script VM's primary virtual-dispatch table (table 0 of the VM object).
pub const VM_VTABLE: VtableId = VtableId(0);

/// Vtable slot of the legacy static-call entry point.
pub const STATIC_CALL_SLOT: usize = 44;

/// Vtable slot of the legacy method-call entry point.
pub const METHOD_CALL_SLOT: usize = 46;

/// Maps stable identifiers to runtime addresses for the loaded host binary.
///
/// Implementations are expected to be correct for the running build; an
/// identifier unknown to the database resolves to `0`.
pub trait AddressResolver {
    /// Runtime address of the function behind `id`.
    fn resolve(&self, id: RelocationId) -> usize;

    /// Runtime address stored in `slot` of the table behind `table`.
    fn resolve_vtable_slot(&self, table: VtableId, slot: usize) -> usize;
}
