//! Identity lifecycle scenarios
//!
//! Issue, renew, revoke and expire identities against a moving clock,
//! and confirm what each state lets through the transfer gate.

use warden_testing_framework::prelude::*;

#[test]
fn test_issue_makes_identity_valid() {
    let mut harness = Harness::builder().with_seed(100).build().unwrap();
    let alice = harness.actor(100).unwrap();

    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::NotFound
    );

    harness.issue_identity(&alice, 60_000).unwrap();

    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Valid
    );
}

#[test]
fn test_identity_expires_with_time() {
    let mut harness = Harness::builder().with_seed(101).build().unwrap();
    let alice = harness.actor(0).unwrap();
    harness.issue_identity(&alice, 10_000).unwrap();

    harness.advance(9_999);
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Valid
    );

    // Expiry timestamp itself is already expired
    harness.advance(1);
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Expired
    );
}

#[test]
fn test_renewal_extends_validity() {
    let mut harness = Harness::builder().with_seed(102).build().unwrap();
    let alice = harness.actor(0).unwrap();
    harness.issue_identity(&alice, 10_000).unwrap();

    harness.advance(9_000);
    let issuer = harness.issuer_key();
    harness
        .protocol
        .renew_attestation(
            &issuer,
            &alice.token_account,
            harness.now() + 20_000,
            harness.now(),
        )
        .unwrap();

    // Past the original expiry, still valid on the renewed attestation
    harness.advance(5_000);
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Valid
    );
}

#[test]
fn test_revocation_is_immediate() {
    let mut harness = Harness::builder().with_seed(103).build().unwrap();
    let alice = harness.actor(0).unwrap();
    harness.issue_default_identity(&alice).unwrap();

    let issuer = harness.issuer_key();
    harness
        .protocol
        .revoke_attestation(&issuer, &alice.token_account, harness.now())
        .unwrap();

    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Expired
    );
}

#[test]
fn test_revoked_identity_blocks_transfers() {
    let mut harness = Harness::builder().with_seed(104).build().unwrap();
    let alice = harness.actor(500).unwrap();
    let bob = harness.actor(0).unwrap();
    harness.issue_default_identity(&alice).unwrap();
    harness.issue_default_identity(&bob).unwrap();

    let issuer = harness.issuer_key();
    harness
        .protocol
        .revoke_attestation(&issuer, &alice.token_account, harness.now())
        .unwrap();

    assert_eq!(
        harness.transfer(&alice, &bob, 100),
        Err(ProtocolError::Transfer(TransferError::IdentityExpired))
    );
    assert_eq!(harness.balance(&alice), 500);
}

#[test]
fn test_second_issuer_keeps_identity_alive() {
    let extra_issuer = TestRng::with_seed(777).keypair();
    let mut harness = Harness::builder()
        .with_seed(105)
        .with_extra_issuer(extra_issuer.public_key())
        .build()
        .unwrap();

    let alice = harness.actor(0).unwrap();
    harness.issue_identity(&alice, 10_000).unwrap();

    harness
        .protocol
        .add_issuer(
            &extra_issuer.public_key(),
            &alice.token_account,
            harness.now() + 60_000,
            harness.now(),
        )
        .unwrap();

    // First attestation lapses, the second carries the identity
    harness.advance(30_000);
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Valid
    );

    // Both lapsed
    harness.advance(40_000);
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Expired
    );
}

#[test]
fn test_untrusted_issuer_rejected() {
    let mut harness = Harness::builder().with_seed(106).build().unwrap();
    let alice = harness.actor(0).unwrap();

    let stranger = harness.env.rng.public_key();
    let result = harness.protocol.issue_identity(
        &stranger,
        alice.owner(),
        alice.token_account,
        harness.now() + 60_000,
        harness.now(),
    );
    assert_eq!(result, Err(ProtocolError::Unauthorized));
}

#[test]
fn test_born_expired_identity_is_recorded() {
    let mut harness = Harness::builder().with_seed(107).build().unwrap();
    let alice = harness.actor(0).unwrap();

    // Zero validity: issuance succeeds, the record starts expired
    harness.issue_identity(&alice, 0).unwrap();

    assert!(harness.protocol.identity(&alice.token_account).is_some());
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Expired
    );
}

#[test]
fn test_duplicate_issuance_rejected() {
    let mut harness = Harness::builder().with_seed(108).build().unwrap();
    let alice = harness.actor(0).unwrap();
    harness.issue_default_identity(&alice).unwrap();

    let err = harness.issue_identity(&alice, 60_000).unwrap_err();
    let protocol_err = err.downcast::<ProtocolError>().unwrap();
    assert_eq!(
        protocol_err,
        ProtocolError::Identity(IdentityError::AlreadyExists)
    );
}

#[test]
fn test_reissue_after_expiry_replaces_record() {
    let mut harness = Harness::builder().with_seed(109).build().unwrap();
    let alice = harness.actor(0).unwrap();
    harness.issue_identity(&alice, 5_000).unwrap();

    harness.advance(5_000);
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Expired
    );

    // A dead record does not block re-onboarding
    harness.issue_default_identity(&alice).unwrap();
    assert_eq!(
        harness
            .protocol
            .check_identity(&alice.token_account, harness.now()),
        IdentityStatus::Valid
    );

    let record = harness.protocol.identity(&alice.token_account).unwrap();
    assert_eq!(record.attestations.len(), 1);
}
