//! Follower tier program.
//!
//! Eight ordered reward tiers partition the follower-count axis `[0, ∞)` with
//! no gaps. A KOL's displayed tier is cosmetic status: it gates nothing, and
//! it only moves up, through an admin-reviewed upgrade request. Campaign
//! eligibility is governed by the separate [`FollowerTier`] buckets.

pub mod eligibility;
pub mod follower;

pub use follower::{parse_follower_count, FollowerTier};

use serde::{Deserialize, Serialize};

/// Reward-program level displayed on a KOL profile.
///
/// Declaration order is the program order; `PartialOrd`/`Ord` follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProgramTier {
    #[serde(rename = "INSIDER")]
    Insider,
    #[serde(rename = "OPERATIVE")]
    Operative,
    #[serde(rename = "ELITE")]
    Elite,
    #[serde(rename = "PRESTIGE")]
    Prestige,
    #[serde(rename = "AUTHORITY")]
    Authority,
    #[serde(rename = "SOVEREIGN")]
    Sovereign,
    #[serde(rename = "IMPERIAL")]
    Imperial,
    #[serde(rename = "THE ICON")]
    TheIcon,
}

/// Rank assigned to a profile with no tier yet; compares below every tier.
pub const UNRANKED: i8 = -1;

impl ProgramTier {
    pub const ALL: [ProgramTier; 8] = [
        ProgramTier::Insider,
        ProgramTier::Operative,
        ProgramTier::Elite,
        ProgramTier::Prestige,
        ProgramTier::Authority,
        ProgramTier::Sovereign,
        ProgramTier::Imperial,
        ProgramTier::TheIcon,
    ];

    /// Inclusive lower bound of the tier's follower range.
    pub const fn floor(self) -> u64 {
        match self {
            ProgramTier::Insider => 0,
            ProgramTier::Operative => 10_000,
            ProgramTier::Elite => 30_000,
            ProgramTier::Prestige => 50_000,
            ProgramTier::Authority => 100_000,
            ProgramTier::Sovereign => 200_000,
            ProgramTier::Imperial => 300_000,
            ProgramTier::TheIcon => 500_000,
        }
    }

    /// Inclusive upper bound; `None` for the open-ended top tier.
    pub const fn ceiling(self) -> Option<u64> {
        match self {
            ProgramTier::Insider => Some(9_999),
            ProgramTier::Operative => Some(29_999),
            ProgramTier::Elite => Some(49_999),
            ProgramTier::Prestige => Some(99_999),
            ProgramTier::Authority => Some(199_999),
            ProgramTier::Sovereign => Some(299_999),
            ProgramTier::Imperial => Some(499_999),
            ProgramTier::TheIcon => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProgramTier::Insider => "INSIDER",
            ProgramTier::Operative => "OPERATIVE",
            ProgramTier::Elite => "ELITE",
            ProgramTier::Prestige => "PRESTIGE",
            ProgramTier::Authority => "AUTHORITY",
            ProgramTier::Sovereign => "SOVEREIGN",
            ProgramTier::Imperial => "IMPERIAL",
            ProgramTier::TheIcon => "THE ICON",
        }
    }

    /// Classify a follower count into its program tier.
    ///
    /// The ranges cover `[0, ∞)` without holes, so this is total: the first
    /// tier whose range contains the count wins, and `THE ICON` catches
    /// everything from 500k up.
    pub fn classify(count: u64) -> ProgramTier {
        for tier in ProgramTier::ALL {
            let above_floor = count >= tier.floor();
            let below_ceiling = match tier.ceiling() {
                Some(max) => count <= max,
                None => true,
            };
            if above_floor && below_ceiling {
                return tier;
            }
        }
        ProgramTier::TheIcon
    }
}

impl std::fmt::Display for ProgramTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Position of a (possibly unassigned) tier in the program order.
///
/// Unassigned profiles rank at [`UNRANKED`], below `INSIDER`.
pub fn rank(tier: Option<ProgramTier>) -> i8 {
    match tier {
        Some(tier) => tier as i8,
        None => UNRANKED,
    }
}

/// A follower-count edit that would justify a tier upgrade request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeCandidate {
    pub follower_count: u64,
    pub tier: ProgramTier,
}

/// Decide whether a raw follower-count input unlocks an upgrade request.
///
/// The request affordance is offered only when the input parses, classifies
/// strictly above the currently granted tier, and no request is already
/// awaiting review. Pure; callers re-evaluate on every input change.
pub fn upgrade_candidate(
    current: Option<ProgramTier>,
    follower_input: &str,
    request_pending: bool,
) -> Option<UpgradeCandidate> {
    if request_pending {
        return None;
    }

    let follower_count = parse_follower_count(follower_input)?;
    let tier = ProgramTier::classify(follower_count);
    if rank(Some(tier)) > rank(current) {
        Some(UpgradeCandidate {
            follower_count,
            tier,
        })
    } else {
        None
    }
}
