//! Shared symbols with fast copying, hashing and equality checking.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Display};
use core::hash::{Hash, Hasher};

/// Owned symbol data, consisting of a qualified name.
///
/// This is usually allocated in an arena that outlives all terms.
#[derive(Debug)]
pub struct Owned {
    /// module path under which the symbol was introduced
    pub path: Vec<String>,
    pub name: String,
}

impl Owned {
    pub fn new(name: String) -> Self {
        let path = Vec::new();
        Self { path, name }
    }

    pub fn qualified(path: Vec<String>, name: String) -> Self {
        Self { path, name }
    }
}

/// Shared symbol with fast cloning, hashing, and equality check.
///
/// This is implemented as a reference;
/// cloning, hashing, and equality checking is performed on
/// the address of the reference, making them constant-time operations.
///
/// Note that two different symbols pointing to equivalent names
/// are not equal, as well as their hashes.
/// To consistently assign the same symbol to equivalent names,
/// use the [`Symbols`](crate::Symbols) table.
#[derive(Copy, Clone, Debug)]
pub struct Symbol<'s>(&'s Owned);

impl<'s> Symbol<'s> {
    pub fn new(o: &'s Owned) -> Self {
        Self(o)
    }
}

impl<'s> Hash for Symbol<'s> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(self.0, state)
    }
}

impl<'s> PartialEq for Symbol<'s> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.0, other.0)
    }
}

impl<'s> Eq for Symbol<'s> {}

impl<'s> Display for Symbol<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for p in &self.0.path {
            write!(f, "{}.", p)?;
        }
        self.0.name.fmt(f)
    }
}
