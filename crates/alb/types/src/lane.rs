//! Serving lanes

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two symmetric serving paths of a blue/green topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Blue,
    Green,
}

impl Lane {
    /// Both lanes, in planning order
    pub const ALL: [Lane; 2] = [Lane::Blue, Lane::Green];
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Blue => f.write_str("blue"),
            Lane::Green => f.write_str("green"),
        }
    }
}
