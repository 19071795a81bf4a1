//! Router tests for the `/mgr` admin routes

mod common;

use std::time::Duration;

use ::common::linked_data::{cid_for, Cid, RAW};
use ::common::pins::{BUCKET_ITEM_TAG, BUCKET_ROOT_TAG};
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::json;

#[tokio::test]
async fn test_gc_reclaims_removed_items() {
    let state = common::setup_state();
    let router = common::setup_router(&state);
    let kept = state.bucket().add(Bytes::from_static(b"kept")).await.unwrap();
    let dropped = state
        .bucket()
        .add(Bytes::from_static(b"dropped"))
        .await
        .unwrap();
    state.bucket().remove(&dropped.item).await.unwrap();

    let response = common::send(&router, common::post("/mgr/gc")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = common::body_json(response).await;
    let deleted: Vec<&str> = report["deletedIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect();
    assert!(deleted.contains(&dropped.item.to_string().as_str()));
    assert!(!deleted.contains(&kept.item.to_string().as_str()));
    assert!(report.get("errors").is_none());

    assert!(state.store().blocks().has(&kept.item).await.unwrap());
    assert!(!state.store().blocks().has(&dropped.item).await.unwrap());
}

#[tokio::test]
async fn test_gc_is_busy_while_the_gate_is_held() {
    let state = common::setup_state();
    let router = common::setup_router(&state);

    let guard = state.gate().acquire().await;
    let response = common::send(&router, common::post("/mgr/gc")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    drop(guard);

    let response = common::send(&router, common::post("/mgr/gc")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_pins_ls_and_rm() {
    let state = common::setup_state();
    let router = common::setup_router(&state);
    let added = state
        .bucket()
        .add(Bytes::from_static(b"pinned item"))
        .await
        .unwrap();

    let response = common::send(&router, common::post("/mgr/pins/ls")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = common::body_json(response).await;
    let pins = listing["pins"].as_array().unwrap();
    assert_eq!(pins.len(), 2);
    assert!(pins.contains(&json!({"id": added.root.to_string(), "tag": BUCKET_ROOT_TAG})));
    assert!(pins.contains(&json!({"id": added.item.to_string(), "tag": BUCKET_ITEM_TAG})));

    let uri = format!("/mgr/pins/rm/{}", added.item);
    let response = common::send(&router, common::post(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["unpinnedIds"], json!([added.item.to_string()]));
    assert!(!state.store().pins().is_pinned(&added.item).await.unwrap());

    // unpinning again is a no-op
    let response = common::send(&router, common::post(&uri)).await;
    assert_eq!(common::body_json(response).await["unpinnedIds"], json!([]));

    let response = common::send(&router, common::post("/mgr/pins/rm/bogus")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pin_routes_wait_for_the_gate() {
    let state = common::setup_state();
    let router = common::setup_router(&state);
    let root = state.bucket().root().await.unwrap();

    let guard = state.gate().acquire().await;
    let pending = {
        let router = router.clone();
        let uri = format!("/mgr/pins/rm/{}", root);
        tokio::spawn(async move { common::send(&router, common::post(&uri)).await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!pending.is_finished());
    assert!(state.store().pins().is_pinned(&root).await.unwrap());

    let listing = tokio::time::timeout(
        Duration::from_millis(200),
        common::send(&router, common::post("/mgr/pins/ls")),
    )
    .await;
    assert!(listing.is_err());

    drop(guard);
    let response = pending.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!state.store().pins().is_pinned(&root).await.unwrap());
}

/// A minimal CARv1 archive of raw blocks whose single root is the first block
fn write_car(blocks: &[&[u8]]) -> (Vec<u8>, Vec<Cid>) {
    let cids: Vec<Cid> = blocks.iter().map(|data| cid_for(RAW, data)).collect();
    let root = cids[0].to_bytes();

    // DAG-CBOR {"roots": [root], "version": 1}
    let mut header = vec![0xa2, 0x65];
    header.extend_from_slice(b"roots");
    header.extend_from_slice(&[0x81, 0xd8, 0x2a, 0x58, (root.len() + 1) as u8, 0x00]);
    header.extend_from_slice(&root);
    header.push(0x67);
    header.extend_from_slice(b"version");
    header.push(0x01);

    let mut car = vec![header.len() as u8];
    car.extend_from_slice(&header);
    for (cid, data) in cids.iter().zip(blocks) {
        let cid_bytes = cid.to_bytes();
        car.push((cid_bytes.len() + data.len()) as u8);
        car.extend_from_slice(&cid_bytes);
        car.extend_from_slice(data);
    }
    (car, cids)
}

#[tokio::test]
async fn test_car_import() {
    let state = common::setup_state();
    let router = common::setup_router(&state);
    let (car, cids) = write_car(&[b"first block", b"second block"]);

    let response = common::send(&router, common::upload("/mgr/car/import", "car", &car)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["imported"], 2);
    assert_eq!(body["roots"], json!([cids[0].to_string()]));

    for cid in &cids {
        assert!(state.store().blocks().has(cid).await.unwrap());
        assert!(!state.store().pins().is_pinned(cid).await.unwrap());
    }
    // imported content is servable but not part of the bucket
    let response = common::send(&router, common::get(&format!("/ipfs/{}", cids[1]))).await;
    assert_eq!(common::body_bytes(response).await, b"second block");
    assert!(state.bucket().list().await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_car_import_rejects_bad_archives() {
    let state = common::setup_state();
    let router = common::setup_router(&state);

    let response = common::send(
        &router,
        common::upload("/mgr/car/import", "car", b"\x05junk"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // a block that does not match its identifier stores nothing
    let (mut car, cids) = write_car(&[b"intact", b"tampered"]);
    let last = car.len() - 1;
    car[last] ^= 0xff;
    let response = common::send(&router, common::upload("/mgr/car/import", "car", &car)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!state.store().blocks().has(&cids[0]).await.unwrap());

    let response = common::send(
        &router,
        common::upload("/mgr/car/import", "archive", b""),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_car_import_waits_for_the_gate() {
    let state = common::setup_state();
    let router = common::setup_router(&state);
    let (car, cids) = write_car(&[b"gated block"]);

    let guard = state.gate().acquire().await;
    let pending = {
        let router = router.clone();
        tokio::spawn(async move {
            common::send(&router, common::upload("/mgr/car/import", "car", &car)).await
        })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!pending.is_finished());
    assert!(!state.store().blocks().has(&cids[0]).await.unwrap());

    drop(guard);
    let response = pending.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.store().blocks().has(&cids[0]).await.unwrap());
}
