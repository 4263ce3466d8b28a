//! Network leaderboard
//!
//! Ranks networks by hook activity and formats the ranking as plain text rows.

use serde::Serialize;

use crate::data::HookInfo;

/// Metric used to rank networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Total swaps through hooked pools
    #[default]
    Swaps,
    /// Number of hooked pools
    Pools,
}

impl SortKey {
    /// Parses a sort key name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "swaps" | "swap" => Some(SortKey::Swaps),
            "pools" | "pool" => Some(SortKey::Pools),
            _ => None,
        }
    }

    /// The value this key ranks by
    pub fn metric(&self, info: &HookInfo) -> u64 {
        match self {
            SortKey::Swaps => info.swap_count,
            SortKey::Pools => info.pool_count,
        }
    }
}

/// A network with its 1-based position on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub rank: usize,
    #[serde(flatten)]
    pub info: HookInfo,
}

/// Ranks networks by `key`, highest first
///
/// Ties are broken by network name so the order is stable across refreshes.
pub fn rank(infos: &[HookInfo], key: SortKey) -> Vec<Ranked> {
    let mut sorted = infos.to_vec();
    sorted.sort_by(|a, b| {
        key.metric(b)
            .cmp(&key.metric(a))
            .then_with(|| a.network.cmp(&b.network))
    });

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, info)| Ranked { rank: i + 1, info })
        .collect()
}

/// Formats a count with thousands separators (1234567 -> "1,234,567")
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Formats one leaderboard row
pub fn format_row(row: &Ranked) -> String {
    format!(
        "{:>4}  {:<20} {:>8} {:>10} {:>14}",
        format!("#{}", row.rank),
        row.info.network,
        format_count(row.info.hook_count),
        format_count(row.info.pool_count),
        format_count(row.info.swap_count),
    )
}

/// Keeps the first `limit` rows, or all of them when `limit` is `None`
pub fn top(rows: &[Ranked], limit: Option<usize>) -> &[Ranked] {
    match limit {
        Some(limit) => &rows[..limit.min(rows.len())],
        None => rows,
    }
}

/// Formats the header plus at most `limit` rows
pub fn format_board(rows: &[Ranked], limit: Option<usize>) -> String {
    let rows = top(rows, limit);
    if rows.is_empty() {
        return "No network activity".to_string();
    }

    let header = format!(
        "{:>4}  {:<20} {:>8} {:>10} {:>14}",
        "Rank", "Network", "Hooks", "Pools", "Swaps"
    );

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    lines.extend(rows.iter().map(format_row));
    lines.join("\n")
}

/// Renders at most `limit` rows as a pretty-printed JSON array
pub fn format_json(rows: &[Ranked], limit: Option<usize>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(top(rows, limit))
}
