//! Lane port allocation

use crate::error::{PlanError, Result};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use tracing::debug;

/// Issues ports from a fixed range, lowest first, never twice.
///
/// There is no release: a port handed out stays allocated for the lifetime
/// of the allocator.
#[derive(Debug, Clone)]
pub struct PortAllocator {
    start: u16,
    end: u16,
    pool: BTreeSet<u16>,
}

impl PortAllocator {
    /// Allocator over `range`. Port 0 is never issued.
    pub fn new(range: RangeInclusive<u16>) -> Self {
        let (start, end) = (*range.start(), *range.end());
        let pool = range.filter(|port| *port != 0).collect();
        Self { start, end, pool }
    }

    /// Take the lowest unused port
    pub fn allocate(&mut self) -> Result<u16> {
        let port = self.pool.pop_first().ok_or(PlanError::PoolExhausted {
            start: self.start,
            end: self.end,
        })?;
        debug!(port = port, remaining = self.pool.len(), "Port allocated");
        Ok(port)
    }

    /// Ports still available
    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn range(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new(20000..=29999)
    }
}
