//! Property-based checks over the protocol's pure rules
//!
//! Everything here runs without a harness: rule conjunction, approval
//! windows, configuration bounds and sequence arithmetic are plain
//! functions of their inputs.

use proptest::prelude::*;
use warden_common::config::{MAX_RECOVERY_AUTHORITIES, MIN_RECOVERY_AUTHORITIES};
use warden_common::serializer::Serializer;
use warden_testing_framework::prelude::*;

fn key(index: usize) -> PublicKey {
    let mut bytes = [0u8; 32];
    bytes[0] = index as u8;
    bytes[1] = (index >> 8) as u8;
    PublicKey::from_bytes(bytes)
}

fn rule_strategy() -> impl Strategy<Value = TwoAuthRule> {
    prop_oneof![
        Just(TwoAuthRule::Always),
        Just(TwoAuthRule::Never),
        (1u64..=1_000_000).prop_map(|max| TwoAuthRule::OnMax { max }),
    ]
}

proptest! {
    #[test]
    fn rule_set_fires_only_when_every_rule_fires(
        amount in any::<u64>(),
        rules in prop::collection::vec(rule_strategy(), 0..5),
    ) {
        let params = TwoAuthParameters::new(key(1), key(2), rules.clone(), vec![key(3)], 0);

        let expected = rules.iter().all(|rule| rule.requires_approval(amount));
        prop_assert_eq!(params.requires_approval(amount), expected);
    }

    #[test]
    fn on_max_fires_at_and_above_threshold(amount in any::<u64>(), max in 1u64..=1_000_000) {
        let rule = TwoAuthRule::OnMax { max };
        prop_assert_eq!(rule.requires_approval(amount), amount >= max);
    }

    #[test]
    fn rule_wire_roundtrip(rule in rule_strategy()) {
        let bytes = rule.to_bytes();
        let decoded = <TwoAuthRule as Serializer>::from_bytes(&bytes).unwrap();
        prop_assert_eq!(rule, decoded);
        prop_assert_eq!(rule.size(), bytes.len());
    }

    #[test]
    fn approval_window_is_exact(
        start in 0u64..(u64::MAX / 2),
        elapsed in 0u64..(4 * APPROVAL_VALIDITY_MILLIS),
    ) {
        let approval = TransactionApproval::new(key(1), key(2), 100, start, key(3));
        prop_assert_eq!(
            approval.is_expired(start + elapsed),
            elapsed > APPROVAL_VALIDITY_MILLIS
        );
    }

    #[test]
    fn approval_matches_only_its_exact_tuple(
        amount in 1u64..1_000_000,
        other_amount in 1u64..1_000_000,
    ) {
        let approval = TransactionApproval::new(key(1), key(2), amount, 0, key(3));

        prop_assert!(approval.matches(&key(1), &key(2), amount));
        prop_assert_eq!(
            approval.matches(&key(1), &key(2), other_amount),
            amount == other_amount
        );
        prop_assert!(!approval.matches(&key(9), &key(2), amount));
        prop_assert!(!approval.matches(&key(1), &key(9), amount));
    }

    #[test]
    fn recovery_configuration_bounds(count in 0usize..40, threshold in 0u8..48) {
        let authorities: Vec<PublicKey> = (0..count).map(|i| key(i + 100)).collect();
        let set = RecoveryAuthority::new(key(1), authorities, threshold, 0);

        let expected_ok = count >= MIN_RECOVERY_AUTHORITIES
            && count <= MAX_RECOVERY_AUTHORITIES
            && threshold >= 1
            && (threshold as usize) <= count;
        prop_assert_eq!(set.validate().is_ok(), expected_ok);
    }

    #[test]
    fn sequence_counts_every_bump(bumps in 1usize..64) {
        let mut marker = LastTx::new(key(1), 0);
        let mut previous = marker.sequence;

        for step in 0..bumps {
            marker.bump(step as u64);
            prop_assert!(marker.sequence > previous);
            previous = marker.sequence;
        }
        prop_assert_eq!(marker.sequence, bumps as u64);
    }

    #[test]
    fn cosigned_message_binds_every_field(
        sequence in any::<u64>(),
        timestamp in any::<u64>(),
    ) {
        let build = |old: usize, new: usize, owner: usize, seq: u64| {
            RecoveryApproval::build_recovery_message(
                &key(old),
                &key(new),
                &key(owner),
                seq,
                timestamp,
            )
        };
        let base = build(1, 2, 3, sequence);

        prop_assert_ne!(&base, &build(9, 2, 3, sequence));
        prop_assert_ne!(&base, &build(1, 9, 3, sequence));
        prop_assert_ne!(&base, &build(1, 2, 9, sequence));
        prop_assert_ne!(&base, &build(1, 2, 3, sequence.wrapping_add(1)));
    }
}
