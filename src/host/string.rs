//! Interned string handles
//!
//! The host keys scripts, functions and events by interned, NUL-terminated
//! strings and compares them by pointer. `FixedString` reproduces that shape:
//! a `Copy` handle into a process-lifetime intern pool, so equal content means
//! equal pointer. Entries are never evicted.

use core::ffi::{c_char, CStr};
use core::fmt;
use std::ffi::CString;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Global intern pool, content -> leaked NUL-terminated bytes.
static POOL: Lazy<DashMap<Box<str>, &'static CStr>> = Lazy::new(DashMap::new);

/// Interned, NUL-terminated string handle in the host's fixed-string style.
///
/// Pointer identity equals content identity for handles produced by
/// [`FixedString::new`], so equality and hashing operate on the pointer.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedString {
    data: *const c_char,
}

// Handles only ever point into the leaked, process-lifetime pool.
unsafe impl Send for FixedString {}
unsafe impl Sync for FixedString {}

impl FixedString {
    /// Intern `s` and return its stable handle.
    ///
    /// Interior NUL bytes are stripped; the host's string type cannot carry
    /// them.
    pub fn new(s: &str) -> Self {
        if let Some(entry) = POOL.get(s) {
            return Self {
                data: entry.as_ptr(),
            };
        }

        let bytes = CString::new(s).unwrap_or_else(|_| {
            let cleaned: String = s.chars().filter(|&c| c != '\0').collect();
            CString::new(cleaned).expect("interior NUL bytes stripped")
        });
        let leaked: &'static CStr = Box::leak(bytes.into_boxed_c_str());

        // Concurrent interns of the same content race here; one wins and the
        // loser's allocation stays leaked.
        let entry = POOL.entry(Box::from(s)).or_insert(leaked);
        Self {
            data: entry.as_ptr(),
        }
    }

    #[inline]
    pub fn as_ptr(self) -> *const c_char {
        self.data
    }

    #[inline]
    pub fn as_c_str(&self) -> &'static CStr {
        // SAFETY: data always points into the leaked pool
        unsafe { CStr::from_ptr(self.data) }
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.as_c_str().to_str().unwrap_or("")
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_c_str().to_bytes().is_empty()
    }
}

impl Default for FixedString {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for FixedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for FixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedString({:?})", self.as_str())
    }
}
