// End-to-end legacy flow: owner seals and registers a file, the heir gets it
// once the vault unlocks and opens it locally.

use candid::Principal;
use futures::executor::block_on;
use legacy_vault_backend::adapter::LocalLedger;
use legacy_vault_backend::error::VaultError;
use legacy_vault_backend::models::common::{AttestationPolicy, LegacyPhase, Timestamp};
use legacy_vault_backend::models::init::InitArgs;
use legacy_vault_backend::models::ledger_event::LedgerEventKind;
use legacy_vault_backend::models::vault_file::FileReference;
use legacy_vault_backend::services::coordinator::Coordinator;
use legacy_vault_backend::services::{anchor_service, did_service, file_service, ledger_service};
use legacy_vault_backend::storage::config::{get_config, init_config, LegacyConfig};
use legacy_vault_envelope::{content_id, decrypt, encrypt, matches_content_id, Envelope, EnvelopeError};
use std::collections::HashMap;

const T: Timestamp = 1_700_000_000;
const PASSPHRASE: &str = "correct-horse";
const LETTER: &[u8] = b"To my family: the deed is in the blue folder.";

fn owner() -> Principal {
    Principal::from_slice(&[1; 29])
}

fn heir() -> Principal {
    Principal::from_slice(b"0xAbc")
}

fn install() {
    init_config(LegacyConfig::from(InitArgs {
        owner: owner(),
        ledger: None,
        attestation_policy: Some(AttestationPolicy::OwnerOnly),
        max_ledger_attempts: Some(3),
        anchor_retry_interval_secs: None,
        min_cycles_threshold: None,
        coordinator: None,
    }))
    .unwrap();
    ledger_service::genesis(owner(), AttestationPolicy::OwnerOnly, T).unwrap();
}

fn acting_as(caller: Principal, now: Timestamp) -> Coordinator<LocalLedger> {
    Coordinator::new(LocalLedger::new(caller, now), &get_config())
}

/// Seals the letter, puts the ciphertext in `blobs` and registers the file.
fn upload(blobs: &mut HashMap<String, Vec<u8>>) -> FileReference {
    let did = did_service::register_did(owner(), T).unwrap().did;
    let sealed = encrypt(LETTER, PASSPHRASE, "letter.txt", "text/plain").unwrap();
    let storage_ref = "blob://letter.txt.enc".to_string();
    let cid = content_id(&sealed.ciphertext);
    blobs.insert(storage_ref.clone(), sealed.ciphertext);

    file_service::register_file(
        owner(),
        did,
        storage_ref,
        &sealed.envelope.to_json().unwrap(),
        Some(cid),
        T,
    )
    .unwrap()
}

fn open(reference: &FileReference, blobs: &HashMap<String, Vec<u8>>, passphrase: &str) -> Result<Vec<u8>, EnvelopeError> {
    let ciphertext = &blobs[&reference.storage_ref];
    assert!(matches_content_id(ciphertext, reference.cid.as_deref().unwrap()));
    let envelope = Envelope {
        iv: reference.envelope.iv.clone().try_into().unwrap(),
        salt: reference.envelope.salt.clone().try_into().unwrap(),
        original_name: reference.envelope.original_name.clone(),
        mime_type: reference.envelope.mime_type.clone(),
        algorithm: reference.envelope.algorithm.clone(),
    };
    decrypt(ciphertext, passphrase, &envelope)
}

#[test]
fn heir_opens_the_file_after_death_is_attested() {
    install();
    let mut blobs = HashMap::new();
    let file = upload(&mut blobs);

    let as_owner = acting_as(owner(), T);
    block_on(as_owner.register_heir(owner(), heir())).unwrap();
    block_on(as_owner.schedule_unlock(owner(), T + 3600)).unwrap();
    let anchored = block_on(as_owner.request_anchor(owner(), &file.id)).unwrap();
    assert!(anchored.anchored);

    // Locked: heir registered, unlock time in the future, not deceased.
    assert!(!ledger_service::can_access(&heir(), T + 10));
    let as_heir = acting_as(heir(), T + 10);
    assert!(block_on(as_heir.list_accessible_files(heir())).unwrap().is_empty());

    block_on(acting_as(owner(), T + 20).notify_death(owner())).unwrap();

    assert!(ledger_service::can_access(&heir(), T + 21));
    let as_heir = acting_as(heir(), T + 21);
    let files = block_on(as_heir.list_accessible_files(heir())).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, file.id);
    assert!(files[0].anchored);

    assert_eq!(open(&files[0], &blobs, PASSPHRASE).unwrap(), LETTER);
    assert_eq!(
        open(&files[0], &blobs, "battery-staple"),
        Err(EnvelopeError::AuthenticationFailure)
    );

    let status = ledger_service::get_legacy_status(T + 21).unwrap();
    assert_eq!(status.phase, LegacyPhase::DeceasedUnlocked);
    assert_eq!(status.marked_at, Some(T + 20));
    assert_eq!(status.unlock_timestamp, Some(T + 3600));
}

#[test]
fn dead_mans_switch_opens_the_vault_on_time() {
    install();
    let mut blobs = HashMap::new();
    let file = upload(&mut blobs);

    let as_owner = acting_as(owner(), T);
    block_on(as_owner.register_heir(owner(), heir())).unwrap();
    block_on(as_owner.schedule_unlock(owner(), T + 3600)).unwrap();

    let before = acting_as(heir(), T + 3599);
    assert!(matches!(
        block_on(before.get_accessible_file(heir(), &file.id)),
        Err(VaultError::Unauthorized(_))
    ));

    let after = acting_as(heir(), T + 3600);
    let reference = block_on(after.get_accessible_file(heir(), &file.id)).unwrap();
    assert_eq!(open(&reference, &blobs, PASSPHRASE).unwrap(), LETTER);

    let stranger = Principal::from_slice(&[3; 29]);
    assert!(block_on(acting_as(stranger, T + 9999).list_accessible_files(stranger))
        .unwrap()
        .is_empty());
}

#[test]
fn every_file_anchors_exactly_once() {
    install();
    let mut blobs = HashMap::new();
    let first = upload(&mut blobs);
    let second = upload(&mut blobs);
    let as_owner = acting_as(owner(), T + 1);

    for file in [&first, &second] {
        block_on(as_owner.request_anchor(owner(), &file.id)).unwrap();
        assert!(matches!(
            block_on(as_owner.request_anchor(owner(), &file.id)),
            Err(VaultError::AlreadyAnchored(_))
        ));
        let stored = file_service::get_file(&file.id).unwrap();
        assert_eq!(stored.content_hash, file.cid);
    }

    // Straight to the ledger, bypassing the Coordinator: still anchor-once.
    let key = legacy_vault_backend::utils::crypto::file_key_for(&first.id);
    assert!(matches!(
        anchor_service::set_file_cid(owner(), key.clone(), "bafy-other".into(), T + 2),
        Err(VaultError::AlreadyAnchored(_))
    ));
    assert_eq!(anchor_service::get_file_cid(&key), first.cid);
}

#[test]
fn ledger_history_is_a_verifiable_chain() {
    install();
    let as_owner = acting_as(owner(), T);
    let validator = Principal::from_slice(&[4; 29]);
    block_on(as_owner.register_heir(owner(), heir())).unwrap();
    let receipt = block_on(as_owner.add_validator(owner(), validator)).unwrap();
    assert_eq!(receipt.event.kind, LedgerEventKind::ValidatorRegistered { validator });

    // Rejected writes are not recorded.
    assert!(block_on(acting_as(heir(), T).notify_death(heir())).is_err());

    let events = ledger_service::get_ledger_events(0, 100);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, LedgerEventKind::Genesis { owner: owner() });
    assert_eq!(ledger_service::verify_event_chain().unwrap(), 3);
    assert_eq!(ledger_service::list_validators(), vec![validator]);
}
