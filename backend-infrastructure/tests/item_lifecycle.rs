mod common;

use std::sync::Arc;

use backend_application::commands::item_commands::{
    create_item, create_retailer_item, delete_item, dropoff_item, pickup_item, scan_item,
    update_item_metadata,
};
use backend_application::ledger::adjust_balance;
use backend_application::queries::item_queries::get_item;
use backend_application::queries::transaction_queries::list_transactions;
use backend_application::AppError;
use backend_domain::ports::AccountRepository;
use backend_domain::{
    AccountKind, CreateItemRequest, ImageUpload, ItemOrigin, ItemPatch, ItemStatus,
    QrCodeId, RetailerItemQuery, ScanQuery, SideEffect, TransactionType,
};
use backend_infrastructure::MemoryStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use common::{balance, build_state, seed, FailingAssets, FailingTransactions, RecordingAssets};

fn listing(owner: &str, qr: &str) -> CreateItemRequest {
    CreateItemRequest {
        name: "Camping stove".to_string(),
        description: "Single burner".to_string(),
        owner: owner.to_string(),
        qr_code_id: Some(qr.to_string()),
        ..CreateItemRequest::default()
    }
}

#[tokio::test]
async fn pickup_then_return_moves_points_and_ownership() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz-b", "b@example.com", 0, Some("Toronto")).await;
    seed(&store, AccountKind::Business, "biz-c", "c@example.com", 0, Some("Hamilton")).await;
    seed(&store, AccountKind::Tourist, "tourist-t", "t@example.com", 10, None).await;

    let created = create_item(&state, listing("biz-b", "X")).await.expect("create");
    assert_eq!(created.item.status, ItemStatus::Available);
    assert_eq!(created.transaction, SideEffect::skipped("not a donation"));
    let png = STANDARD.decode(&created.qr_code_base64).expect("base64");
    assert_eq!(&png[..4], b"\x89PNG");

    let picked = pickup_item(&state, "X", "tourist-t").await.expect("pickup");
    assert_eq!(picked.tourist_points, 5);
    assert_eq!(picked.item.owner, "tourist-t");
    assert_eq!(picked.item.status, ItemStatus::Unavailable);

    let dropped = dropoff_item(&state, "X", "c@example.com").await.expect("dropoff");
    assert_eq!(dropped.credit, SideEffect::Applied);
    assert_eq!(dropped.reward, 10);
    assert_eq!(dropped.item.owner, "biz-c");
    assert_eq!(dropped.item.status, ItemStatus::Available);
    assert_eq!(balance(&store, AccountKind::Tourist, "tourist-t").await, 15);
    assert_eq!(state.metrics.side_effect_failures(), 0);
}

#[tokio::test]
async fn status_machine_rejects_wrong_transitions() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, Some("Toronto")).await;
    seed(&store, AccountKind::Tourist, "t1", "t1@example.com", 10, None).await;

    create_item(&state, listing("biz", "qr-1")).await.expect("create");
    let err = dropoff_item(&state, "qr-1", "biz").await.expect_err("already available");
    assert!(matches!(err, AppError::Conflict(_)));

    pickup_item(&state, "qr-1", "t1").await.expect("pickup");
    let err = pickup_item(&state, "qr-1", "t1").await.expect_err("unavailable");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(balance(&store, AccountKind::Tourist, "t1").await, 5);

    let err = pickup_item(&state, "missing", "t1").await.expect_err("missing item");
    assert!(matches!(err, AppError::NotFound(_)));
    let err = pickup_item(&state, "qr-1", "nobody").await.expect_err("missing tourist");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn pickup_requires_enough_points() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;
    seed(&store, AccountKind::Tourist, "poor", "poor@example.com", 4, None).await;
    create_item(&state, listing("biz", "qr-1")).await.expect("create");

    let err = pickup_item(&state, "qr-1", "poor").await.expect_err("insufficient");
    match err {
        AppError::BadRequest(message) => assert!(message.starts_with("Not enough points")),
        other => panic!("unexpected error: {other:?}"),
    }
    let item = get_item(&state, "qr-1").await.expect("item");
    assert_eq!(item.status, ItemStatus::Available);
    assert_eq!(balance(&store, AccountKind::Tourist, "poor").await, 4);
}

#[tokio::test]
async fn concurrent_pickups_have_one_winner() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;
    seed(&store, AccountKind::Tourist, "t1", "t1@example.com", 10, None).await;
    seed(&store, AccountKind::Tourist, "t2", "t2@example.com", 10, None).await;
    create_item(&state, listing("biz", "hot")).await.expect("create");

    let first = tokio::spawn({
        let state = state.clone();
        async move { pickup_item(&state, "hot", "t1").await }
    });
    let second = tokio::spawn({
        let state = state.clone();
        async move { pickup_item(&state, "hot", "t2").await }
    });
    let results = [first.await.expect("join"), second.await.expect("join")];
    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);

    let item = get_item(&state, "hot").await.expect("item");
    let (winner, loser) = if item.owner == "t1" { ("t1", "t2") } else { ("t2", "t1") };
    assert_eq!(balance(&store, AccountKind::Tourist, winner).await, 5);
    assert_eq!(balance(&store, AccountKind::Tourist, loser).await, 10);
}

#[tokio::test]
async fn donation_confirmation_credits_donor_and_logs_entry() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, Some("Toronto")).await;
    seed(&store, AccountKind::Tourist, "donor", "donor@example.com", 10, None).await;

    let request = CreateItemRequest {
        donor: Some("donor@example.com".to_string()),
        date: Some("2025-10-26".to_string()),
        time: Some("9:00 AM - 10:00 AM".to_string()),
        image: Some(ImageUpload {
            bytes: vec![1, 2, 3],
            content_type: "image/jpeg".to_string(),
        }),
        ..listing("biz", "gift")
    };
    let created = create_item(&state, request).await.expect("create");
    assert_eq!(created.item.origin, ItemOrigin::Donation);
    assert_eq!(created.item.status, ItemStatus::Unavailable);
    assert_eq!(created.item.donor.as_deref(), Some("donor"));
    assert_eq!(created.transaction, SideEffect::Applied);
    assert_eq!(
        created.image_url.as_deref(),
        Some("https://assets.example.com/items/gift")
    );

    let log = list_transactions(&state, "biz").await.expect("list");
    assert_eq!(log.transactions.len(), 1);
    assert_eq!(log.transactions[0].transaction_type, TransactionType::Dropoff);
    assert!(log.transactions[0].scheduled_at.is_some());

    let confirmed = dropoff_item(&state, "gift", "biz").await.expect("confirm");
    assert_eq!(confirmed.reward, 20);
    assert_eq!(confirmed.credit, SideEffect::Applied);
    assert!(confirmed.item.donor.is_none());
    assert_eq!(balance(&store, AccountKind::Tourist, "donor").await, 30);
}

#[tokio::test]
async fn failed_side_effect_keeps_primary_result() {
    let store = Arc::new(MemoryStore::new());
    let mut state = build_state(store.clone());
    state.transaction_repo = Arc::new(FailingTransactions);
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;
    seed(&store, AccountKind::Tourist, "donor", "donor@example.com", 10, None).await;

    let request = CreateItemRequest {
        donor: Some("donor".to_string()),
        ..listing("biz", "gift")
    };
    let created = create_item(&state, request).await.expect("create");
    assert!(created.transaction.is_failed());
    assert!(get_item(&state, "gift").await.is_ok());
    assert_eq!(state.metrics.side_effect_failures(), 1);
}

#[tokio::test]
async fn retailer_listing_accepts_metadata_patch() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;
    seed(&store, AccountKind::Retailer, "shop", "shop@example.com", 0, Some("Toronto")).await;
    create_retailer_item(
        &state,
        RetailerItemQuery {
            name: "Lantern".to_string(),
            description: "Solar".to_string(),
            retailer_email: "shop@example.com".to_string(),
            image_url: None,
        },
    )
    .await
    .expect("create");
    let qr = backend_application::queries::item_queries::list_items(&state)
        .await
        .expect("list")[0]
        .qr_code_id
        .clone();

    let err = dropoff_item(&state, &qr, "biz").await.expect_err("listing is available");
    assert!(matches!(err, AppError::Conflict(_)));

    update_item_metadata(
        &state,
        &qr,
        ItemPatch {
            description: Some("Solar, with hook".to_string()),
            ..ItemPatch::default()
        },
    )
    .await
    .expect("patch");
    let item = get_item(&state, &qr).await.expect("item");
    assert_eq!(item.description, "Solar, with hook");
    assert_eq!(item.owner, "shop");
}

#[tokio::test]
async fn retailer_scan_credits_retailer_and_origin_business() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, Some("Toronto")).await;
    seed(&store, AccountKind::Retailer, "shop", "shop@example.com", 0, Some("Toronto")).await;
    create_item(&state, listing("biz", "scan-me")).await.expect("create");

    let scanned = scan_item(
        &state,
        ScanQuery {
            qr_code_id: "scan-me".to_string(),
            scanner_email: "shop@example.com".to_string(),
        },
    )
    .await
    .expect("scan");
    assert_eq!(scanned.scanner_points, 1);
    assert_eq!(scanned.origin_business_credit, SideEffect::Applied);
    assert_eq!(scanned.item.owner, "shop");
    assert_eq!(scanned.item.status, ItemStatus::Unavailable);
    assert_eq!(balance(&store, AccountKind::Business, "biz").await, 1);

    let err = scan_item(
        &state,
        ScanQuery {
            qr_code_id: "scan-me".to_string(),
            scanner_email: "shop@example.com".to_string(),
        },
    )
    .await
    .expect_err("already scanned");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(balance(&store, AccountKind::Retailer, "shop").await, 1);

    let dropped = dropoff_item(&state, "scan-me", "biz").await.expect("dropoff");
    assert_eq!(dropped.reward, 0);
    assert!(matches!(dropped.credit, SideEffect::Skipped { .. }));
    assert_eq!(balance(&store, AccountKind::Retailer, "shop").await, 1);
}

#[tokio::test]
async fn creation_validates_owner_and_uniqueness() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;

    let err = create_item(&state, listing("ghost", "a")).await.expect_err("owner");
    assert!(matches!(err, AppError::NotFound(_)));

    let created = create_item(&state, listing("biz@example.com", "a")).await.expect("create");
    assert_eq!(created.item.owner, "biz");
    let fetched = get_item(&state, "a").await.expect("get");
    assert_eq!(fetched.name, "Camping stove");
    assert_eq!(fetched.description, "Single burner");

    let err = create_item(&state, listing("biz", "a")).await.expect_err("duplicate");
    assert!(matches!(err, AppError::Conflict(_)));

    let generated = CreateItemRequest {
        qr_code_id: None,
        ..listing("biz", "")
    };
    let created = create_item(&state, generated).await.expect("generated id");
    assert_eq!(created.qr_code_id.len(), 36);

    delete_item(&state, "a").await.expect("delete");
    let err = get_item(&state, "a").await.expect_err("gone");
    assert!(matches!(err, AppError::NotFound(_)));
}

fn with_image(request: CreateItemRequest) -> CreateItemRequest {
    CreateItemRequest {
        image: Some(ImageUpload {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            content_type: "image/png".to_string(),
        }),
        ..request
    }
}

#[tokio::test]
async fn overlong_qr_code_id_is_a_client_error() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;

    let long_id = "q".repeat(4000);
    let err = create_item(&state, listing("biz", &long_id))
        .await
        .expect_err("too long");
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(matches!(
        get_item(&state, &long_id).await,
        Err(AppError::NotFound(_))
    ));

    let longest = "q".repeat(QrCodeId::MAX_LEN);
    let created = create_item(&state, listing("biz", &longest))
        .await
        .expect("longest id still renders");
    assert!(!created.qr_code_base64.is_empty());
}

#[tokio::test]
async fn failed_upload_leaves_no_item_behind() {
    let store = Arc::new(MemoryStore::new());
    let mut state = build_state(store.clone());
    state.asset_store = Arc::new(FailingAssets);
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;

    let err = create_item(&state, with_image(listing("biz", "lamp")))
        .await
        .expect_err("upload fails");
    assert!(matches!(err, AppError::Upstream(_)));
    assert!(matches!(get_item(&state, "lamp").await, Err(AppError::NotFound(_))));

    let state = build_state(store.clone());
    let created = create_item(&state, with_image(listing("biz", "lamp")))
        .await
        .expect("retry succeeds");
    assert_eq!(
        created.item.image_url.as_deref(),
        Some("https://assets.example.com/items/lamp")
    );
}

#[tokio::test]
async fn conflicting_create_never_touches_the_stored_asset() {
    let store = Arc::new(MemoryStore::new());
    let assets = Arc::new(RecordingAssets::default());
    let mut state = build_state(store.clone());
    state.asset_store = assets.clone();
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;

    create_item(&state, with_image(listing("biz", "tent")))
        .await
        .expect("first create");
    let err = create_item(&state, with_image(listing("biz", "tent")))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(*assets.uploads.lock().expect("uploads lock"), vec!["tent".to_string()]);
}

#[tokio::test]
async fn missing_donor_at_dropoff_is_counted_as_failure() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Business, "biz", "biz@example.com", 0, None).await;
    seed(&store, AccountKind::Tourist, "donor", "donor@example.com", 10, None).await;

    let request = CreateItemRequest {
        donor: Some("donor".to_string()),
        ..listing("biz", "gift")
    };
    create_item(&state, request).await.expect("create");
    assert!(store
        .delete_account(AccountKind::Tourist, "donor")
        .await
        .expect("delete donor"));

    let confirmed = dropoff_item(&state, "gift", "biz").await.expect("confirm");
    assert!(confirmed.credit.is_failed());
    assert_eq!(confirmed.item.status, ItemStatus::Available);
    assert_eq!(state.metrics.side_effect_failures(), 1);
}

#[tokio::test]
async fn overflowing_admin_adjustment_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone());
    seed(&store, AccountKind::Tourist, "t1", "t1@example.com", 10, None).await;

    let err = adjust_balance(&state, AccountKind::Tourist, "t1", i64::MAX)
        .await
        .expect_err("overflow");
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(balance(&store, AccountKind::Tourist, "t1").await, 10);

    let adjusted = adjust_balance(&state, AccountKind::Tourist, "t1", -25)
        .await
        .expect("negative correction");
    assert_eq!(adjusted.points, -15);
}
