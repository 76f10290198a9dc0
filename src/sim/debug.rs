//! Breakpoints.
//!
//! The simulator breaks on addresses only: [`BreakpointSet`] is an unordered
//! set of addresses whose membership is tested against the PC once per cycle.

use std::collections::HashSet;

/// An unordered set of breakpoint addresses.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BreakpointSet {
    inner: HashSet<u16>
}

impl BreakpointSet {
    /// Creates an empty breakpoint set.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a breakpoint at the given address.
    /// Returns `false` if one was already set there.
    pub fn add(&mut self, addr: u16) -> bool {
        self.inner.insert(addr)
    }

    /// Removes the breakpoint at the given address.
    /// Returns `false` if none was set there.
    pub fn remove(&mut self, addr: u16) -> bool {
        self.inner.remove(&addr)
    }

    /// Removes every breakpoint.
    pub fn clear(&mut self) {
        self.inner.clear()
    }

    /// Whether a breakpoint is set at the given address.
    pub fn contains(&self, addr: u16) -> bool {
        self.inner.contains(&addr)
    }

    /// The number of breakpoints set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over the breakpoint addresses, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.inner.iter().copied()
    }
}
