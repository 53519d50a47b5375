//! Campaign-side follower buckets and free-form follower-count parsing.

use serde::{Deserialize, Serialize};

/// Eligibility bucket a campaign may restrict itself to.
///
/// Distinct from [`super::ProgramTier`]: these five buckets exist only to
/// express "who may apply" on a campaign and never show up as profile status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FollowerTier {
    #[serde(rename = "under_10k")]
    Under10k,
    #[serde(rename = "10k_30k")]
    From10k,
    #[serde(rename = "30k_50k")]
    From30k,
    #[serde(rename = "50k_70k")]
    From50k,
    #[serde(rename = "100k_plus")]
    Over100k,
}

impl FollowerTier {
    pub const ALL: [FollowerTier; 5] = [
        FollowerTier::Under10k,
        FollowerTier::From10k,
        FollowerTier::From30k,
        FollowerTier::From50k,
        FollowerTier::Over100k,
    ];

    /// Inclusive lower bound of the bucket.
    pub const fn floor(self) -> u64 {
        match self {
            FollowerTier::Under10k => 0,
            FollowerTier::From10k => 10_000,
            FollowerTier::From30k => 30_000,
            FollowerTier::From50k => 50_000,
            FollowerTier::Over100k => 100_000,
        }
    }

    /// Inclusive upper bound; `None` for the open-ended top bucket.
    pub const fn ceiling(self) -> Option<u64> {
        match self {
            FollowerTier::Under10k => Some(9_999),
            FollowerTier::From10k => Some(29_999),
            FollowerTier::From30k => Some(49_999),
            FollowerTier::From50k => Some(69_999),
            FollowerTier::Over100k => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FollowerTier::Under10k => "under_10k",
            FollowerTier::From10k => "10k_30k",
            FollowerTier::From30k => "30k_50k",
            FollowerTier::From50k => "50k_70k",
            FollowerTier::Over100k => "100k_plus",
        }
    }

    pub fn from_label(value: &str) -> Option<FollowerTier> {
        FollowerTier::ALL
            .into_iter()
            .find(|tier| tier.label() == value.trim())
    }
}

impl std::fmt::Display for FollowerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket a follower count for campaign eligibility checks.
///
/// The five buckets leave a hole at `[70_000, 100_000)`; counts in the hole
/// fold into `50k_70k`, and anything at or above 100k lands in `100k_plus`.
pub fn bucket_for_count(count: u64) -> FollowerTier {
    for tier in FollowerTier::ALL {
        let above_floor = count >= tier.floor();
        let below_ceiling = match tier.ceiling() {
            Some(max) => count <= max,
            None => true,
        };
        if above_floor && below_ceiling {
            return tier;
        }
    }

    if count < 100_000 {
        FollowerTier::From50k
    } else {
        FollowerTier::Over100k
    }
}

/// Parse free-form follower-count input such as "32000", "10k", or "3萬".
///
/// Every ASCII digit in the input is kept and concatenated before any scale
/// marker is applied, so "1,0 0 0" reads as 1000. A ten-thousand marker
/// (万/萬/만, or the token "man") scales by 10 000; a trailing "k" scales by
/// 1 000. Returns `None` when the input carries no digits.
pub fn parse_follower_count(input: &str) -> Option<u64> {
    let normalized: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let digits: String = normalized.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let base: u64 = digits.parse().ok()?;

    if normalized.contains('万')
        || normalized.contains('萬')
        || normalized.contains('만')
        || normalized.contains("man")
    {
        base.checked_mul(10_000)
    } else if normalized.ends_with('k') {
        base.checked_mul(1_000)
    } else {
        Some(base)
    }
}
