//! Campaign eligibility over follower buckets.

use super::follower::{bucket_for_count, FollowerTier};

/// Highest follower ceiling across the allowed buckets.
///
/// `None` when any allowed bucket is open-ended, in which case nobody can sit
/// above the restriction.
fn ceiling_of(allowed: &[FollowerTier]) -> Option<u64> {
    let mut ceiling = 0;
    for tier in allowed {
        match tier.ceiling() {
            Some(max) if max > ceiling => ceiling = max,
            Some(_) => {}
            None => return None,
        }
    }
    Some(ceiling)
}

/// Whether a follower count may apply to a campaign restricted to `allowed`.
///
/// An empty restriction admits everyone, and an unknown follower count is
/// never admitted to a restricted campaign. A count landing inside an allowed
/// bucket is admitted directly. A count above every allowed bucket's ceiling
/// is admitted too: restricting a campaign to smaller buckets sets a floor,
/// not a cap, so a campaign open to `10k_30k` also welcomes a KOL with
/// 31 000 followers while still turning away one with 5 000.
pub fn can_apply(follower_count: Option<u64>, allowed: &[FollowerTier]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let Some(count) = follower_count else {
        return false;
    };

    let bucket = bucket_for_count(count);
    if allowed.contains(&bucket) {
        return true;
    }

    match ceiling_of(allowed) {
        Some(ceiling) => count > ceiling,
        None => false,
    }
}
