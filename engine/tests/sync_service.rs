//! Sync service behavior across every store backend.

use marksync_engine::{
    AnyStore, BookmarkDraft, BookmarkRecord, ChangeListener, DirectoryStore, Error, MemoryStore,
    RecoveryPolicy, SetChange, Store, SyncService, TableFileStore,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

/// Every backend, each with its own scratch directory kept alive alongside.
fn backends() -> Vec<(TempDir, AnyStore)> {
    let memory_dir = tempfile::tempdir().unwrap();
    let table_dir = tempfile::tempdir().unwrap();
    let table = TableFileStore::open(table_dir.path().join("bookmarks.json"), RecoveryPolicy::Strict)
        .unwrap();
    let dir_dir = tempfile::tempdir().unwrap();
    let directory = DirectoryStore::open(dir_dir.path().join("tokens"), RecoveryPolicy::Strict)
        .unwrap();

    vec![
        (memory_dir, MemoryStore::new().into()),
        (table_dir, table.into()),
        (dir_dir, directory.into()),
    ]
}

fn draft(id: &str) -> BookmarkDraft {
    BookmarkDraft::new(format!("http://{}.example", id), "tech").with_id(id)
}

#[test]
fn save_get_update_on_every_backend() {
    for (_dir, store) in backends() {
        let kind = store.kind();
        let svc = SyncService::new(store);

        svc.save_url(
            "abc123",
            BookmarkDraft::new("http://x.com", "tech")
                .with_id("1")
                .with_hashtags(["ai"]),
        )
        .unwrap();
        svc.save_url("abc123", draft("2")).unwrap();

        let set = svc.get_urls("abc123").unwrap();
        assert_eq!(set.len(), 2, "backend {}", kind);
        assert_eq!(set[0].url, "http://x.com");
        assert_eq!(set[0].hashtags, vec!["ai"]);
        assert!(!set[0].pinned);
        assert!(!set[0].timestamp.is_empty());

        svc.update_url(
            "abc123",
            BookmarkDraft::new("http://y.com", "news").with_id("1"),
        )
        .unwrap();
        let after = svc.get_urls("abc123").unwrap();
        assert_eq!(after[0].url, "http://y.com", "backend {}", kind);
        assert_eq!(after[0].timestamp, set[0].timestamp);
        assert_eq!(after[1], set[1]);

        assert!(matches!(
            svc.update_url("abc123", draft("missing")),
            Err(Error::NotFound(_))
        ));
        assert!(svc.get_urls("unknown").unwrap().is_empty());
    }
}

#[test]
fn concurrent_saves_lose_nothing() {
    const WRITERS: usize = 16;

    for (_dir, store) in backends() {
        let kind = store.kind();
        let svc = Arc::new(SyncService::new(store));

        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let svc = svc.clone();
                thread::spawn(move || svc.save_url("shared", draft(&format!("w{}", i))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(
            svc.get_urls("shared").unwrap().len(),
            WRITERS,
            "backend {}",
            kind
        );
    }
}

#[test]
fn concurrent_updates_and_saves_on_one_token() {
    for (_dir, store) in backends() {
        let svc = Arc::new(SyncService::new(store));
        for i in 0..4 {
            svc.save_url("t", draft(&format!("base{}", i))).unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..4 {
            let updater = svc.clone();
            handles.push(thread::spawn(move || {
                updater.update_url(
                    "t",
                    BookmarkDraft::new(format!("http://updated{}.example", i), "tech")
                        .with_id(format!("base{}", i)),
                )
                .map(|_| ())
            }));
            let saver = svc.clone();
            handles.push(thread::spawn(move || {
                saver.save_url("t", draft(&format!("new{}", i))).map(|_| ())
            }));
        }
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let set = svc.get_urls("t").unwrap();
        assert_eq!(set.len(), 8);
        for i in 0..4 {
            assert_eq!(set[i].id, format!("base{}", i));
            assert_eq!(set[i].url, format!("http://updated{}.example", i));
        }
    }
}

/// Keeps every published set, in the order it was published.
#[derive(Debug, Default)]
struct SetLog {
    sets: Mutex<Vec<Vec<BookmarkRecord>>>,
}

impl ChangeListener for SetLog {
    fn set_changed(&self, change: SetChange<'_>) {
        self.sets.lock().unwrap().push(change.bookmarks.to_vec());
    }
}

#[test]
fn concurrent_mutations_publish_in_commit_order() {
    for (_dir, store) in backends() {
        let log = Arc::new(SetLog::default());
        let svc = Arc::new(SyncService::new(store).with_listener(log.clone()));

        let handles: Vec<_> = (0..12)
            .map(|i| {
                let svc = svc.clone();
                thread::spawn(move || {
                    svc.save_url_from("shared", draft(&format!("s{}", i)), Some("worker"))
                        .unwrap();
                    if i % 3 == 0 {
                        svc.toggle_pin("shared", &format!("s{}", i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sets = log.sets.lock().unwrap();
        assert_eq!(sets.len(), 12 + 4);

        // Saves append and pins keep positions, so each published set
        // extends the one before it.
        for pair in sets.windows(2) {
            let before: Vec<_> = pair[0].iter().map(|r| &r.id).collect();
            let after: Vec<_> = pair[1].iter().map(|r| &r.id).collect();
            assert!(after.starts_with(&before));
        }
        assert_eq!(sets.last().unwrap(), &svc.get_urls("shared").unwrap());
    }
}

#[test]
fn file_backends_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");

    {
        let svc = SyncService::new(TableFileStore::open(&path, RecoveryPolicy::Strict).unwrap());
        svc.save_url("abc", draft("1")).unwrap();
        svc.bulk_replace("def", vec![draft("a"), draft("b")])
            .unwrap();
    }

    let svc = SyncService::new(TableFileStore::open(&path, RecoveryPolicy::Strict).unwrap());
    assert_eq!(svc.get_urls("abc").unwrap().len(), 1);
    let def = svc.get_urls("def").unwrap();
    assert_eq!(def.len(), 2);
    assert!(def.iter().all(|r| r.token.as_deref() == Some("def")));
}

#[test]
fn generated_token_is_not_in_use() {
    for (_dir, store) in backends() {
        let svc = SyncService::new(store);
        let token = svc.generate_token().unwrap();
        assert_eq!(token.len(), 32);
        assert!(!svc.store().contains(&token).unwrap());
        assert!(svc.get_urls(&token).unwrap().is_empty());
    }
}

fn seeded(ids: &[String]) -> (SyncService<MemoryStore>, Vec<BookmarkRecord>) {
    let svc = SyncService::new(MemoryStore::new());
    for id in ids {
        svc.save_url("prop", draft(id)).unwrap();
    }
    let before = svc.get_urls("prop").unwrap();
    (svc, before)
}

proptest! {
    #[test]
    fn update_touches_only_the_target(
        ids in prop::collection::hash_set("[a-z0-9]{1,8}", 1..12),
        pick in any::<prop::sample::Index>(),
        new_url in "https://[a-z]{1,10}\\.org",
    ) {
        let ids: Vec<String> = ids.into_iter().collect();
        let (svc, before) = seeded(&ids);
        let target = pick.index(ids.len());

        svc.update_url(
            "prop",
            BookmarkDraft::new(new_url.clone(), "updated").with_id(ids[target].clone()),
        )
        .unwrap();

        let after = svc.get_urls("prop").unwrap();
        prop_assert_eq!(after.len(), before.len());
        for (i, (old, new)) in before.iter().zip(after.iter()).enumerate() {
            prop_assert_eq!(&old.id, &new.id);
            if i == target {
                prop_assert_eq!(&new.url, &new_url);
                prop_assert_eq!(&new.timestamp, &old.timestamp);
            } else {
                prop_assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn update_of_unknown_id_changes_nothing(
        ids in prop::collection::hash_set("[a-z]{1,8}", 0..8),
        missing in "[0-9]{1,8}",
    ) {
        let ids: Vec<String> = ids.into_iter().collect();
        let (svc, before) = seeded(&ids);

        let result = svc.update_url("prop", draft(&missing));
        prop_assert!(matches!(result, Err(Error::NotFound(_))));
        prop_assert_eq!(svc.get_urls("prop").unwrap(), before);
    }
}
