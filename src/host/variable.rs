//! Tagged script value and argument container
//!
//! `Variable` mirrors the host's discriminated value slot: a kind tag plus an
//! 8-byte payload. The bridge only ever constructs these and hands ordered
//! sequences of them to the host; it never mutates a value after packing.

use core::fmt;

use smallvec::SmallVec;

use super::string::FixedString;
use super::vm::ObjectHandle;

/// Discriminant for a host script value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum VarKind {
    None,
    Int,
    Float,
    Bool,
    String,
    Object,
}

/// Raw payload slot (untagged union).
#[repr(C)]
union VarPayload {
    none: (),
    int: i32,
    float: f32,
    boolean: bool,
    string: FixedString,
    object: ObjectHandle,
}

// Manual implementations since unions don't auto-derive
impl Copy for VarPayload {}
impl Clone for VarPayload {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

/// One host script value, immutable once constructed.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Variable {
    kind: VarKind,
    payload: VarPayload,
}

impl Variable {
    /// Create the host's none/invalid value
    #[inline]
    pub const fn none() -> Self {
        Self {
            kind: VarKind::None,
            payload: VarPayload { none: () },
        }
    }

    #[inline]
    pub const fn int(value: i32) -> Self {
        Self {
            kind: VarKind::Int,
            payload: VarPayload { int: value },
        }
    }

    #[inline]
    pub const fn float(value: f32) -> Self {
        Self {
            kind: VarKind::Float,
            payload: VarPayload { float: value },
        }
    }

    #[inline]
    pub const fn boolean(value: bool) -> Self {
        Self {
            kind: VarKind::Bool,
            payload: VarPayload { boolean: value },
        }
    }

    #[inline]
    pub const fn string(value: FixedString) -> Self {
        Self {
            kind: VarKind::String,
            payload: VarPayload { string: value },
        }
    }

    #[inline]
    pub const fn object(value: ObjectHandle) -> Self {
        Self {
            kind: VarKind::Object,
            payload: VarPayload { object: value },
        }
    }

    /// Kind tag of this value
    #[inline]
    pub const fn kind(&self) -> VarKind {
        self.kind
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.kind == VarKind::None
    }

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self.kind {
            // SAFETY: payload field selected by the kind tag
            VarKind::Int => Some(unsafe { self.payload.int }),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f32> {
        match self.kind {
            // SAFETY: payload field selected by the kind tag
            VarKind::Float => Some(unsafe { self.payload.float }),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            // SAFETY: payload field selected by the kind tag
            VarKind::Bool => Some(unsafe { self.payload.boolean }),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<FixedString> {
        match self.kind {
            // SAFETY: payload field selected by the kind tag
            VarKind::String => Some(unsafe { self.payload.string }),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self.kind {
            // SAFETY: payload field selected by the kind tag
            VarKind::Object => Some(unsafe { self.payload.object }),
            _ => None,
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            VarKind::None => true,
            VarKind::Int => self.as_int() == other.as_int(),
            VarKind::Float => self.as_float() == other.as_float(),
            VarKind::Bool => self.as_bool() == other.as_bool(),
            VarKind::String => self.as_string() == other.as_string(),
            VarKind::Object => self.as_object() == other.as_object(),
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            VarKind::None => write!(f, "Variable::None"),
            VarKind::Int => write!(f, "Variable::Int({})", self.as_int().unwrap_or(0)),
            VarKind::Float => write!(f, "Variable::Float({})", self.as_float().unwrap_or(0.0)),
            VarKind::Bool => write!(f, "Variable::Bool({})", self.as_bool().unwrap_or(false)),
            VarKind::String => match self.as_string() {
                Some(s) => write!(f, "Variable::String({:?})", s.as_str()),
                None => write!(f, "Variable::String(?)"),
            },
            VarKind::Object => match self.as_object() {
                Some(h) => write!(f, "Variable::Object({:#x})", h.0),
                None => write!(f, "Variable::Object(?)"),
            },
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            VarKind::None => write!(f, "none"),
            VarKind::Int => write!(f, "{}", self.as_int().unwrap_or(0)),
            VarKind::Float => write!(f, "{}", self.as_float().unwrap_or(0.0)),
            VarKind::Bool => write!(f, "{}", self.as_bool().unwrap_or(false)),
            VarKind::String => write!(f, "{}", self.as_string().map(|s| s.as_str()).unwrap_or("")),
            VarKind::Object => write!(f, "{:#x}", self.as_object().map(|h| h.0).unwrap_or(0)),
        }
    }
}

/// Ordered, append-only argument sequence handed to the host.
///
/// Built once per call in left-to-right declaration order; the bridge never
/// mutates it after packing. Short argument lists stay inline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrapArray {
    items: SmallVec<[Variable; 4]>,
}

impl ScrapArray {
    #[inline]
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: SmallVec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, value: Variable) {
        self.items.push(value);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.items.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Variable] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.items.iter()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_roundtrip() {
        let v = Variable::int(-42);
        assert_eq!(v.kind(), VarKind::Int);
        assert_eq!(v.as_int(), Some(-42));
        assert_eq!(v.as_float(), None);
    }

    #[test]
    fn float_roundtrip() {
        let v = Variable::float(3.5);
        assert_eq!(v.kind(), VarKind::Float);
        assert_eq!(v.as_float(), Some(3.5));
    }

    #[test]
    fn bool_roundtrip() {
        assert_eq!(Variable::boolean(true).as_bool(), Some(true));
        assert_eq!(Variable::boolean(false).as_bool(), Some(false));
    }

    #[test]
    fn string_roundtrip() {
        let s = FixedString::new("OnHit");
        let v = Variable::string(s);
        assert_eq!(v.as_string(), Some(s));
        assert_eq!(v.as_int(), None);
    }

    #[test]
    fn object_roundtrip() {
        let v = Variable::object(ObjectHandle(0xFF00_0000_0001));
        assert_eq!(v.as_object(), Some(ObjectHandle(0xFF00_0000_0001)));
    }

    #[test]
    fn none_matches_only_none() {
        assert_eq!(Variable::none(), Variable::none());
        assert_ne!(Variable::none(), Variable::int(0));
        assert!(Variable::none().is_none());
    }

    #[test]
    fn equality_is_kind_and_payload() {
        assert_eq!(Variable::int(7), Variable::int(7));
        assert_ne!(Variable::int(7), Variable::int(8));
        assert_ne!(Variable::int(1), Variable::boolean(true));
    }

    #[test]
    fn scrap_array_preserves_push_order() {
        let mut args = ScrapArray::new();
        args.push(Variable::int(1));
        args.push(Variable::boolean(true));
        args.push(Variable::float(2.0));
        assert_eq!(args.len(), 3);
        assert_eq!(args.get(0), Some(&Variable::int(1)));
        assert_eq!(args.get(1), Some(&Variable::boolean(true)));
        assert_eq!(args.get(2), Some(&Variable::float(2.0)));
    }

    #[test]
    fn payload_is_8_bytes() {
        assert_eq!(core::mem::size_of::<VarPayload>(), 8);
    }
}
