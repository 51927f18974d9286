mod common;

use std::sync::Arc;
use std::time::Duration;

use farmbot::game::store::{CharacterStore, MemoryStore};
use farmbot::game::{Document, Engine, StoreError};

/// Store that widens the read-modify-write window so unsynchronized writers
/// would clobber each other.
struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl CharacterStore for SlowStore {
    fn load(&self) -> Result<Document, StoreError> {
        let doc = self.inner.load()?;
        std::thread::sleep(self.delay);
        Ok(doc)
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        self.inner.save(document)
    }

    fn describe(&self) -> String {
        "slow-memory".to_string()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_attacks_on_two_characters_keep_both_updates() {
    let doc = common::document(vec![
        ("Arwen", common::fighter("u1", Some((2, 40)))),
        ("Boromir", common::fighter("u2", Some((2, 40)))),
    ]);
    let store = Arc::new(SlowStore {
        inner: MemoryStore::with_document(doc),
        delay: Duration::from_millis(30),
    });
    // entropy-seeded rolls: at most 16 damage, an Orc survives one hit
    let engine = Arc::new(Engine::new(store.clone()));

    let a = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.attack("u1", "Arwen", "attaque1").await })
    };
    let b = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.attack("u2", "Boromir", "attaque2").await })
    };
    let ra = a.await.unwrap().unwrap();
    let rb = b.await.unwrap().unwrap();

    let stored = store.inner.snapshot().unwrap();
    let arwen = stored.get("Arwen").unwrap();
    let boromir = stored.get("Boromir").unwrap();
    assert_eq!(arwen.current_monster.as_ref().unwrap().hp, ra.outcome.monster.hp);
    assert_eq!(boromir.current_monster.as_ref().unwrap().hp, rb.outcome.monster.hp);
    assert!(arwen.current_monster.as_ref().unwrap().hp < 40);
    assert!(boromir.current_monster.as_ref().unwrap().hp < 40);
    assert!(arwen.last_attack > 0.0);
    assert!(boromir.last_attack > 0.0);
    assert_eq!(store.inner.save_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_farms_each_consume_exactly_one_use() {
    let owners = ["u1", "u2", "u3", "u4", "u5"];
    let doc = common::document(
        owners
            .iter()
            .map(|o| (*o, common::fighter(o, None)))
            .collect(),
    );
    let store = Arc::new(SlowStore {
        inner: MemoryStore::with_document(doc),
        delay: Duration::from_millis(10),
    });
    let engine = Arc::new(Engine::new(store.clone()));

    let mut handles = Vec::new();
    for owner in owners {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.farm(owner, owner).await }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let stored = store.inner.snapshot().unwrap();
    for owner in owners {
        let c = stored.get(owner).unwrap();
        assert_eq!(c.farm_uses, 1, "{owner} lost its farm update");
        assert!(c.current_monster.is_some());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_attacks_on_one_character_respect_the_cooldown() {
    let doc = common::document(vec![("Arwen", common::fighter("u1", Some((2, 40))))]);
    let store = Arc::new(SlowStore {
        inner: MemoryStore::with_document(doc),
        delay: Duration::from_millis(10),
    });
    let engine = Arc::new(Engine::new(store.clone()));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.attack("u1", "Arwen", "attaque1").await }));
    }
    let mut accepted = 0;
    for h in handles {
        if h.await.unwrap().is_ok() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(store.inner.save_count(), 1);
}
