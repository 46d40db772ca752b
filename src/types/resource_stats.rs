use serde::{Deserialize, Serialize};

/// Per-category resource counts from the stats endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStats {
    /// Total number of resources.
    #[serde(default)]
    pub all: u64,

    /// Number of code resources.
    #[serde(default)]
    pub code: u64,

    /// Number of article resources.
    #[serde(default)]
    pub article: u64,

    /// Number of video resources.
    #[serde(default)]
    pub video: u64,

    /// Number of forum resources.
    #[serde(default)]
    pub forum: u64,
}
