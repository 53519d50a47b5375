use crate::marketplace::tiers::{
    parse_follower_count, rank, upgrade_candidate, ProgramTier, UpgradeCandidate, UNRANKED,
};

#[test]
fn classify_respects_inclusive_boundaries() {
    assert_eq!(ProgramTier::classify(0), ProgramTier::Insider);
    assert_eq!(ProgramTier::classify(9_999), ProgramTier::Insider);
    assert_eq!(ProgramTier::classify(10_000), ProgramTier::Operative);
    assert_eq!(ProgramTier::classify(29_999), ProgramTier::Operative);
    assert_eq!(ProgramTier::classify(30_000), ProgramTier::Elite);
    assert_eq!(ProgramTier::classify(50_000), ProgramTier::Prestige);
    assert_eq!(ProgramTier::classify(100_000), ProgramTier::Authority);
    assert_eq!(ProgramTier::classify(200_000), ProgramTier::Sovereign);
    assert_eq!(ProgramTier::classify(499_999), ProgramTier::Imperial);
    assert_eq!(ProgramTier::classify(500_000), ProgramTier::TheIcon);
    assert_eq!(ProgramTier::classify(12_000_000), ProgramTier::TheIcon);
}

#[test]
fn tier_ranges_partition_the_axis() {
    let tiers = ProgramTier::ALL;
    assert_eq!(tiers[0].floor(), 0);
    assert!(tiers[tiers.len() - 1].ceiling().is_none());
    for pair in tiers.windows(2) {
        let ceiling = pair[0].ceiling().expect("only the top tier is open-ended");
        assert_eq!(pair[1].floor(), ceiling + 1, "gap between {} and {}", pair[0], pair[1]);
    }
}

#[test]
fn ranks_are_strictly_increasing() {
    assert_eq!(rank(Some(ProgramTier::Insider)), 0);
    assert_eq!(rank(Some(ProgramTier::TheIcon)), 7);
    assert_eq!(rank(None), UNRANKED);
    for pair in ProgramTier::ALL.windows(2) {
        assert!(rank(Some(pair[0])) < rank(Some(pair[1])));
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn parses_plain_scaled_and_cjk_inputs() {
    assert_eq!(parse_follower_count("10000"), Some(10_000));
    assert_eq!(parse_follower_count("10k"), Some(10_000));
    assert_eq!(parse_follower_count("1萬"), Some(10_000));
    assert_eq!(parse_follower_count("1万"), Some(10_000));
    assert_eq!(parse_follower_count("1만"), Some(10_000));
    assert_eq!(parse_follower_count("2man"), Some(20_000));
    assert_eq!(parse_follower_count("  32,000 "), Some(32_000));
}

#[test]
fn parse_rejects_digitless_input() {
    assert_eq!(parse_follower_count(""), None);
    assert_eq!(parse_follower_count("   "), None);
    assert_eq!(parse_follower_count("abc"), None);
    assert_eq!(parse_follower_count("萬"), None);
}

#[test]
fn parse_concatenates_every_digit_before_scaling() {
    // Digit extraction keeps all digits, separators included, then scales.
    assert_eq!(parse_follower_count("1,0 0 0"), Some(1_000));
    assert_eq!(parse_follower_count("3.5萬"), Some(350_000));
    assert_eq!(parse_follower_count("1.2k"), Some(12_000));
}

#[test]
fn upgrade_candidate_requires_a_strictly_higher_tier() {
    assert_eq!(
        upgrade_candidate(None, "12000", false),
        Some(UpgradeCandidate {
            follower_count: 12_000,
            tier: ProgramTier::Operative,
        })
    );
    assert_eq!(
        upgrade_candidate(Some(ProgramTier::Operative), "3萬", false),
        Some(UpgradeCandidate {
            follower_count: 30_000,
            tier: ProgramTier::Elite,
        })
    );

    // Same tier or lower never unlocks the request.
    assert_eq!(upgrade_candidate(Some(ProgramTier::Operative), "15000", false), None);
    assert_eq!(upgrade_candidate(Some(ProgramTier::Elite), "5000", false), None);
}

#[test]
fn upgrade_candidate_blocked_while_a_request_is_pending() {
    assert_eq!(upgrade_candidate(None, "500000", true), None);
}

#[test]
fn upgrade_candidate_rejects_unparseable_input() {
    assert_eq!(upgrade_candidate(None, "plenty", false), None);
    assert_eq!(upgrade_candidate(None, "", false), None);
}
