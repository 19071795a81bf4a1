//! Integration tests for pin lifecycle and reclamation

mod common;

use std::time::Duration;

use ::common::bucket::{BucketError, RemoveError};
use ::common::pins::{BUCKET_ITEM_TAG, BUCKET_ROOT_TAG};
use bytes::Bytes;

#[tokio::test]
async fn test_pins_follow_bucket_state() {
    let bucket = common::setup_bucket();
    let pins = bucket.store().pins();
    let empty = bucket.root().await.unwrap();
    assert_eq!(pins.get(&empty).await.unwrap().unwrap().tag, BUCKET_ROOT_TAG);

    let added = bucket.add(Bytes::from_static(b"pin me")).await.unwrap();
    assert_eq!(
        pins.get(&added.item).await.unwrap().unwrap().tag,
        BUCKET_ITEM_TAG
    );
    assert!(pins.is_pinned(&added.root).await.unwrap());
    assert!(!pins.is_pinned(&empty).await.unwrap());

    let removed = bucket.remove(&added.item).await.unwrap();
    assert!(pins.is_pinned(&removed.root).await.unwrap());
    assert!(!pins.is_pinned(&added.root).await.unwrap());
    assert!(!pins.is_pinned(&added.item).await.unwrap());

    // exactly the current root remains
    let remaining = pins.ls().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].cid, removed.root);
}

#[tokio::test]
async fn test_gc_keeps_bucket_contents() {
    let bucket = common::setup_bucket();
    let kept = bucket.add(Bytes::from_static(b"kept")).await.unwrap();
    let dropped = bucket.add(Bytes::from_static(b"dropped")).await.unwrap();
    bucket.remove(&dropped.item).await.unwrap();

    let report = bucket.store().gc().await.unwrap();
    assert!(report.is_clean());
    assert!(report.deleted.contains(&dropped.item));
    assert!(report.deleted.contains(&dropped.root));
    assert!(!report.deleted.contains(&kept.item));

    let listing = bucket.list().await.unwrap();
    assert_eq!(listing.items, vec![kept.item]);
    assert_eq!(
        bucket.store().unixfs().cat_bytes(&kept.item).await.unwrap().as_ref(),
        b"kept"
    );
    assert!(!bucket.store().blocks().has(&dropped.item).await.unwrap());
}

#[tokio::test]
async fn test_failed_unpin_leaves_extra_pin() {
    let (bucket, datastore) = common::setup_recording_bucket();
    let added = bucket.add(Bytes::from_static(b"sticky")).await.unwrap();

    datastore.fail_deletes(true);
    let err = bucket.remove(&added.item).await.unwrap_err();
    assert!(matches!(err, RemoveError::Bucket(BucketError::Pin(_))));
    datastore.fail_deletes(false);

    // the transition was committed before the unpin failed
    let listing = bucket.list().await.unwrap();
    assert!(listing.items.is_empty());
    let pins = bucket.store().pins();
    assert!(pins.is_pinned(&listing.root).await.unwrap());
    assert!(pins.is_pinned(&added.root).await.unwrap());
}

#[tokio::test]
async fn test_gc_under_the_gate() {
    let bucket = common::setup_bucket();
    bucket.add(Bytes::from_static(b"gated")).await.unwrap();

    let store = bucket.store().clone();
    let report = bucket
        .gate()
        .run_exclusive_timeout(Duration::from_millis(80), async {
            store.gc().await
        })
        .await
        .unwrap()
        .unwrap();
    // only the first, now unpinned, empty root is garbage
    assert_eq!(report.deleted.len(), 1);
}

#[tokio::test]
async fn test_gc_gives_up_on_held_gate() {
    let bucket = common::setup_bucket();
    let guard = bucket.gate().acquire().await;

    let store = bucket.store().clone();
    let result = bucket
        .gate()
        .run_exclusive_timeout(Duration::from_millis(80), async { store.gc().await })
        .await;
    assert!(result.is_err());
    drop(guard);

    assert!(bucket.list().await.is_ok());
}
