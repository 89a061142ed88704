use fieldvault_crypto::FieldCipher;
use fieldvault_migrate::{migrate_all, migrate_collection, MigrationOptions};
use fieldvault_store::{
    fields, Collection, CollectionStore, FieldPath, MemoryStore, Record, StoreError, StoreResult,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn cipher() -> FieldCipher {
    FieldCipher::initialize(Some("test-secret"), "a,b")
}

fn message(id: &str, content: &str) -> Record {
    Record {
        id: id.to_string(),
        data: json!({ "user_id": "u-1", "content": content }),
    }
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(Collection::Messages, message("m1", "first message"));
    store.insert(Collection::Messages, message("m2", "second message"));
    store.insert(
        Collection::Reminders,
        Record {
            id: "r1".to_string(),
            data: json!({ "user_id": "u-2", "message": "water the plants" }),
        },
    );
    store.insert(
        Collection::Notes,
        Record {
            id: "n1".to_string(),
            data: json!({ "user_id": "u-1", "title": "groceries", "body": "milk, eggs", "pinned": true }),
        },
    );
    store
}

#[test]
fn encrypts_plaintext_fields_in_place() {
    let store = seeded_store();
    let cipher = cipher();
    let stats = migrate_collection(
        &store,
        &cipher,
        Collection::Messages,
        &MigrationOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.total_records, 2);
    assert_eq!(stats.processed_records, 2);
    assert_eq!(stats.encrypted_records, 2);

    for record in store.records(Collection::Messages) {
        let stored = fields::MESSAGE_CONTENT.get_str(&record.data).unwrap();
        assert!(cipher.is_encrypted(stored));
    }
    let first = &store.records(Collection::Messages)[0];
    let stored = fields::MESSAGE_CONTENT.get_str(&first.data).unwrap();
    assert_eq!(cipher.decrypt(stored), "first message");
}

#[test]
fn second_run_encrypts_nothing() {
    let store = seeded_store();
    let cipher = cipher();
    let options = MigrationOptions::default();

    migrate_collection(&store, &cipher, Collection::Messages, &options).unwrap();
    let after_first = store.records(Collection::Messages);

    let second = migrate_collection(&store, &cipher, Collection::Messages, &options).unwrap();
    assert_eq!(second.encrypted_records, 0);
    assert_eq!(second.processed_records, 2);
    // Already-encrypted values are never altered
    assert_eq!(store.records(Collection::Messages), after_first);
}

#[test]
fn dry_run_reports_counts_without_writing() {
    let store = seeded_store();
    let cipher = cipher();
    let before: Vec<_> = Collection::ALL
        .iter()
        .map(|&c| store.records(c))
        .collect();

    let options = MigrationOptions {
        dry_run: true,
        ..MigrationOptions::default()
    };
    let reports = migrate_all(&store, &cipher, &options);

    let encrypted: u64 = reports
        .iter()
        .map(|r| r.stats().unwrap().encrypted_records)
        .sum();
    assert_eq!(encrypted, 4);

    let after: Vec<_> = Collection::ALL
        .iter()
        .map(|&c| store.records(c))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn skips_empty_absent_and_null_fields() {
    let store = MemoryStore::new();
    store.insert(Collection::Messages, message("m1", "   "));
    store.insert(
        Collection::Messages,
        Record {
            id: "m2".to_string(),
            data: json!({ "user_id": "u-1" }),
        },
    );
    store.insert(
        Collection::Messages,
        Record {
            id: "m3".to_string(),
            data: json!({ "user_id": "u-1", "content": null }),
        },
    );

    let stats = migrate_collection(
        &store,
        &cipher(),
        Collection::Messages,
        &MigrationOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.processed_records, 3);
    assert_eq!(stats.encrypted_records, 0);
    let third = &store.records(Collection::Messages)[2];
    assert_eq!(third.data.pointer("/content"), Some(&json!(null)));
}

#[test]
fn non_string_sensitive_values_are_stringified_and_encrypted() {
    let store = MemoryStore::new();
    store.insert(
        Collection::Messages,
        Record {
            id: "m1".to_string(),
            data: json!({ "user_id": "u-1", "content": 42 }),
        },
    );

    let cipher = cipher();
    let stats = migrate_collection(
        &store,
        &cipher,
        Collection::Messages,
        &MigrationOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.encrypted_records, 1);

    let record = &store.records(Collection::Messages)[0];
    let stored = fields::MESSAGE_CONTENT.get_str(&record.data).unwrap();
    assert!(cipher.is_encrypted(stored));
    assert_eq!(cipher.decrypt(stored), "42");
}

#[test]
fn skips_values_already_in_payload_form() {
    let cipher = cipher();
    let sealed = cipher.encrypt("already done");
    let store = MemoryStore::new();
    store.insert(Collection::Messages, message("m1", &sealed));

    let stats = migrate_collection(
        &store,
        &cipher,
        Collection::Messages,
        &MigrationOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.encrypted_records, 0);
    let record = &store.records(Collection::Messages)[0];
    assert_eq!(fields::MESSAGE_CONTENT.get_str(&record.data), Some(sealed.as_str()));
}

#[test]
fn pass_through_cipher_writes_nothing() {
    let store = seeded_store();
    let before = store.records(Collection::Messages);

    let stats = migrate_collection(
        &store,
        &FieldCipher::pass_through(),
        Collection::Messages,
        &MigrationOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.encrypted_records, 0);
    assert_eq!(store.records(Collection::Messages), before);
}

#[test]
fn small_batches_cover_every_record() {
    let store = MemoryStore::new();
    for i in 0..7 {
        store.insert(Collection::Messages, message(&format!("m{i}"), "text"));
    }

    let options = MigrationOptions {
        batch_size: 2,
        dry_run: false,
    };
    let stats = migrate_collection(&store, &cipher(), Collection::Messages, &options).unwrap();
    assert_eq!(stats.processed_records, 7);
    assert_eq!(stats.encrypted_records, 7);
}

#[test]
fn only_changed_fields_are_rewritten() {
    let cipher = cipher();
    let sealed_title = cipher.encrypt("groceries");
    let store = MemoryStore::new();
    store.insert(
        Collection::Notes,
        Record {
            id: "n1".to_string(),
            data: json!({
                "user_id": "u-1",
                "title": sealed_title,
                "body": "milk, eggs",
                "pinned": true
            }),
        },
    );

    migrate_collection(
        &store,
        &cipher,
        Collection::Notes,
        &MigrationOptions::default(),
    )
    .unwrap();

    let record = &store.records(Collection::Notes)[0];
    // Encrypted title untouched, plaintext body sealed, unrelated field kept
    assert_eq!(
        fields::NOTE_TITLE.get_str(&record.data),
        Some(sealed_title.as_str())
    );
    let body = fields::NOTE_BODY.get_str(&record.data).unwrap();
    assert_eq!(cipher.decrypt(body), "milk, eggs");
    assert_eq!(record.data.pointer("/pinned"), Some(&json!(true)));
}

#[test]
fn migrate_all_reports_every_collection() {
    let store = seeded_store();
    let reports = migrate_all(&store, &cipher(), &MigrationOptions::default());

    assert_eq!(reports.len(), Collection::ALL.len());
    for report in &reports {
        assert!(report.error().is_none());
    }
    let encrypted: u64 = reports
        .iter()
        .map(|r| r.stats().unwrap().encrypted_records)
        .sum();
    assert_eq!(encrypted, 4);
}

// ── failure isolation ────────────────────────────────────────────

struct FailingStore {
    inner: MemoryStore,
    fail_on: Collection,
}

impl CollectionStore for FailingStore {
    fn count(&self, collection: Collection) -> StoreResult<u64> {
        if collection == self.fail_on {
            return Err(StoreError::Io(std::io::Error::other("simulated outage")));
        }
        self.inner.count(collection)
    }

    fn fetch_page(
        &self,
        collection: Collection,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Record>> {
        self.inner.fetch_page(collection, offset, limit)
    }

    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        changes: &[(FieldPath, String)],
    ) -> StoreResult<()> {
        self.inner.update_fields(collection, id, changes)
    }
}

#[test]
fn one_failing_collection_does_not_abort_the_rest() {
    let store = FailingStore {
        inner: seeded_store(),
        fail_on: Collection::Messages,
    };

    let reports = migrate_all(&store, &cipher(), &MigrationOptions::default());
    assert_eq!(reports.len(), Collection::ALL.len());

    let failed: Vec<Collection> = reports
        .iter()
        .filter(|r| r.error().is_some())
        .map(|r| r.collection)
        .collect();
    assert_eq!(failed, [Collection::Messages]);

    // The other collections were still migrated
    let reminder = &store.inner.records(Collection::Reminders)[0];
    let stored = fields::REMINDER_MESSAGE.get_str(&reminder.data).unwrap();
    assert!(cipher().is_encrypted(stored));
}
