//! Integration tests for the ordering of root transitions

mod common;

use std::collections::HashSet;

use bytes::Bytes;

#[tokio::test]
async fn test_each_mutation_persists_one_root() {
    let (bucket, datastore) = common::setup_recording_bucket();
    let initial = bucket.root().await.unwrap();

    let mut expected = vec![initial];
    let mut items = Vec::new();
    for i in 0..5 {
        let added = bucket.add(Bytes::from(format!("item {}", i))).await.unwrap();
        expected.push(added.root);
        items.push(added.item);
    }
    for item in &items[..2] {
        expected.push(bucket.remove(item).await.unwrap().root);
    }

    let roots = datastore.roots();
    assert_eq!(roots, expected);
    for pair in roots.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[tokio::test]
async fn test_roots_are_pinned_before_persisting() {
    let (bucket, datastore) = common::setup_recording_bucket();
    let empty = bucket.root().await.unwrap();

    let first = bucket.add(Bytes::from_static(b"first")).await.unwrap();
    bucket.add(Bytes::from_static(b"second")).await.unwrap();
    bucket.remove(&first.item).await.unwrap();
    bucket.set_root(&empty).await.unwrap();
    bucket.set_root(&first.root).await.unwrap();

    let pinned = datastore.pinned_on_persist();
    assert_eq!(pinned.len(), datastore.roots().len());
    assert_eq!(pinned.len(), 6);
    assert!(pinned.iter().all(|pinned| *pinned));
}

#[tokio::test]
async fn test_failed_mutations_persist_nothing() {
    let (bucket, datastore) = common::setup_recording_bucket();
    let added = bucket.add(Bytes::from_static(b"once")).await.unwrap();
    let before = datastore.roots().len();

    assert!(bucket.add(Bytes::from_static(b"once")).await.is_err());
    assert!(bucket
        .remove(&::common::linked_data::cid_for(
            ::common::linked_data::RAW,
            b"never"
        ))
        .await
        .is_err());

    assert_eq!(datastore.roots().len(), before);
    assert_eq!(datastore.roots().last(), Some(&added.root));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_are_serialised() {
    const M: usize = 32;
    let (bucket, datastore) = common::setup_recording_bucket();
    let initial = bucket.root().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..M {
        let bucket = bucket.clone();
        handles.push(tokio::spawn(async move {
            bucket.add(Bytes::from(format!("concurrent {}", i))).await
        }));
    }

    let mut items = HashSet::new();
    let mut roots = HashSet::new();
    for handle in handles {
        let added = handle.await.unwrap().unwrap();
        items.insert(added.item);
        roots.insert(added.root);
    }
    assert_eq!(items.len(), M);
    assert_eq!(roots.len(), M);

    let listing = bucket.list().await.unwrap();
    assert_eq!(listing.items.len(), M);
    assert_eq!(listing.items.iter().copied().collect::<HashSet<_>>(), items);

    // one initial root plus one transition per add, each from the previous
    let persisted = datastore.roots();
    assert_eq!(persisted.len(), M + 1);
    assert_eq!(persisted[0], initial);
    assert_eq!(persisted.last(), Some(&listing.root));
    assert!(datastore.pinned_on_persist().iter().all(|pinned| *pinned));
    let mut sizes = Vec::new();
    for root in &persisted {
        sizes.push(bucket.store().unixfs().ls(root).await.unwrap().len());
    }
    assert_eq!(sizes, (0..=M).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_listing_sees_whole_states() {
    let bucket = common::setup_bucket();
    let writer = {
        let bucket = bucket.clone();
        tokio::spawn(async move {
            for i in 0..20 {
                bucket.add(Bytes::from(format!("state {}", i))).await.unwrap();
            }
        })
    };

    let mut last = 0;
    while !writer.is_finished() {
        let listing = bucket.list().await.unwrap();
        let stored = bucket.store().unixfs().ls(&listing.root).await.unwrap();
        assert_eq!(stored.len(), listing.items.len());
        assert!(listing.items.len() >= last);
        last = listing.items.len();
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
    assert_eq!(bucket.list().await.unwrap().items.len(), 20);
}
