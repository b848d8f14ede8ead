//! Property tests for record store save and sync-flag semantics.

use ashasathi_core::models::{Patient, Visit};
use ashasathi_core::storage::MemoryStore;
use ashasathi_core::store::RecordStore;
use proptest::prelude::*;

fn patient(id: String, age: u32) -> Patient {
    Patient {
        id,
        name: format!("Patient aged {}", age),
        age,
        gender: "other".to_string(),
        phone: String::new(),
        address: "Sub-centre".to_string(),
        created_at: "2024-02-01T00:00:00+00:00".to_string(),
        synced: false,
        latitude: None,
        longitude: None,
    }
}

fn visit(id: String) -> Visit {
    Visit {
        id,
        patient_id: "p1".to_string(),
        date: "2024-02-02T00:00:00+00:00".to_string(),
        notes: String::new(),
        vitals: None,
        synced: false,
        latitude: None,
        longitude: None,
    }
}

/// A small id space so that collisions are common.
fn id() -> impl Strategy<Value = String> {
    (0u8..6).prop_map(|n| format!("id-{}", n))
}

proptest! {
    #[test]
    fn patient_save_keeps_one_record_per_id_at_first_position(
        saves in prop::collection::vec((id(), 0u32..=120), 1..40)
    ) {
        let store = RecordStore::new(MemoryStore::new());
        for (id, age) in &saves {
            store.save(&patient(id.clone(), *age)).unwrap();
        }

        // Expected: first-seen order, last-saved values
        let mut expected: Vec<(String, u32)> = Vec::new();
        for (id, age) in &saves {
            match expected.iter_mut().find(|(seen, _)| seen == id) {
                Some(entry) => entry.1 = *age,
                None => expected.push((id.clone(), *age)),
            }
        }

        let actual: Vec<(String, u32)> = store
            .get_all::<Patient>()
            .into_iter()
            .map(|p| (p.id, p.age))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn visit_save_never_dedupes(ids in prop::collection::vec(id(), 0..40)) {
        let store = RecordStore::new(MemoryStore::new());
        for id in &ids {
            store.save(&visit(id.clone())).unwrap();
        }

        let stored: Vec<String> = store.get_all::<Visit>().into_iter().map(|v| v.id).collect();
        prop_assert_eq!(stored, ids);
    }

    #[test]
    fn unsynced_is_the_ordered_unsynced_subset(
        ages in prop::collection::vec(0u32..=120, 0..20),
        to_sync in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let store = RecordStore::new(MemoryStore::new());
        let ids: Vec<String> = (0..ages.len()).map(|i| format!("p{}", i)).collect();
        for (id, age) in ids.iter().zip(&ages) {
            store.save(&patient(id.clone(), *age)).unwrap();
        }
        if !ids.is_empty() {
            for index in &to_sync {
                store.mark_synced::<Patient>(index.get::<String>(&ids)).unwrap();
            }
        }

        let all = store.get_all::<Patient>();
        let expected: Vec<Patient> = all.iter().filter(|p| !p.synced).cloned().collect();
        prop_assert_eq!(store.get_unsynced::<Patient>(), expected);
        prop_assert_eq!(all.len(), ids.len());
    }

    #[test]
    fn mark_synced_changes_only_the_target(
        count in 1usize..15,
        target in any::<prop::sample::Index>(),
    ) {
        let store = RecordStore::new(MemoryStore::new());
        for i in 0..count {
            store.save(&visit(format!("v{}", i))).unwrap();
        }
        let before = store.get_all::<Visit>();
        let target = target.index(count);

        store.mark_synced::<Visit>(&format!("v{}", target)).unwrap();
        let once = store.get_all::<Visit>();
        store.mark_synced::<Visit>(&format!("v{}", target)).unwrap();
        let twice = store.get_all::<Visit>();

        for (i, (old, new)) in before.iter().zip(&once).enumerate() {
            if i == target {
                prop_assert!(new.synced);
                prop_assert_eq!(&Visit { synced: true, ..old.clone() }, new);
            } else {
                prop_assert_eq!(old, new);
            }
        }
        prop_assert_eq!(once, twice);
    }
}
