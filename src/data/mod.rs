//! Core data models for hookstats
//!
//! This module contains the records fetched from the stats backend and the
//! clients that fetch and cache them.

pub mod graphql;
pub mod service;

pub use graphql::{parse_response, StatsClient, StatsError, HOOK_STATS_QUERY};
pub use service::{StatsService, StatsSource};

use serde::{Deserialize, Deserializer, Serialize};

/// Aggregate hook activity for one blockchain network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookInfo {
    /// Human-readable network name
    pub network: String,
    /// EVM chain ID
    #[serde(deserialize_with = "deserialize_count")]
    pub chain_id: u64,
    /// Number of deployed hooks
    #[serde(deserialize_with = "deserialize_count")]
    pub hook_count: u64,
    /// Number of pools using a hook
    #[serde(deserialize_with = "deserialize_count")]
    pub pool_count: u64,
    /// Number of swaps routed through hooked pools
    #[serde(deserialize_with = "deserialize_count")]
    pub swap_count: u64,
}

/// Everything fetched in one request, cached and served as a unit
pub type Snapshot = Vec<HookInfo>;

/// Accepts counts as JSON numbers or as decimal strings
///
/// GraphQL `BigInt` scalars arrive as strings.
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid count: {:?}", s))),
    }
}
