use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use backend_domain::{
    normalize_optional_text, parse_schedule, Account, AccountKind, CreateItemRequest,
    CreateItemResponse, DropoffResponse, ImageUpload, Item, ItemOrigin, ItemPatch, ItemStatus,
    ItemTransition, PickupResponse, QrCodeId, RetailerItemQuery, ScanQuery, ScanResponse,
    SideEffect, Transaction, TransactionType, TransitionOutcome, DONATION_REWARD,
    DROPOFF_REWARD, PICKUP_COST, SCAN_REWARD,
};

use crate::commands::transaction_commands::new_transaction_id;
use crate::identity::{require_account, resolve_account, resolve_any};
use crate::ledger::{compensate, credit, credit_best_effort, debit};
use crate::{AppError, AppState};

pub async fn create_item(
    state: &AppState,
    request: CreateItemRequest,
) -> Result<CreateItemResponse, AppError> {
    let name = required_text(&request.name, "name")?;
    let description = required_text(&request.description, "description")?;

    let owner = resolve_any(state.account_repo.as_ref(), &request.owner)
        .await?
        .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;

    let donor = match normalize_optional_text(request.donor.clone()) {
        Some(raw) => Some(
            resolve_account(state.account_repo.as_ref(), AccountKind::Tourist, &raw)
                .await?
                .ok_or_else(|| AppError::NotFound("Donor not found".to_string()))?,
        ),
        None => None,
    };
    let origin = match (request.origin, donor.is_some()) {
        (_, true) => ItemOrigin::Donation,
        (Some(origin), false) => origin,
        (None, false) => ItemOrigin::Listing,
    };

    let qr_code_id = match normalize_optional_text(request.qr_code_id.clone()) {
        Some(raw) => QrCodeId::parse(&raw).map_err(AppError::BadRequest)?,
        None => QrCodeId::generate(),
    };
    if state.item_repo.get_item(qr_code_id.as_str()).await?.is_some() {
        return Err(AppError::Conflict(
            "Item with this QR code already exists".to_string(),
        ));
    }

    let qr_code_base64 = render_qr(state, qr_code_id.as_str(), owner.key())?;

    let now = Utc::now();
    let mut item = Item {
        qr_code_id: qr_code_id.to_string(),
        name,
        description,
        image_url: normalize_optional_text(request.image_url),
        status: origin.initial_status(),
        owner: owner.key().to_string(),
        origin,
        donor: donor.as_ref().map(|account| account.key().to_string()),
        origin_business: (owner.kind == AccountKind::Business).then(|| owner.key().to_string()),
        created_at: now,
        updated_at: now,
    };
    if !state.item_repo.insert_item(&item).await? {
        return Err(AppError::Conflict(
            "Item with this QR code already exists".to_string(),
        ));
    }
    // Upload only after the insert has claimed the id.
    if let Some(upload) = request.image {
        item = attach_image(state, item, upload).await?;
    }
    state.metrics.record_item_created();
    info!(
        "item '{}' created by '{}' ({})",
        item.qr_code_id,
        item.owner,
        origin.as_str()
    );

    let transaction = match (&donor, origin) {
        (Some(donor), ItemOrigin::Donation) => {
            record_donation(
                state,
                &owner,
                donor,
                &item,
                request.date.as_deref(),
                request.time.as_deref(),
            )
            .await
        }
        _ => SideEffect::skipped("not a donation"),
    };

    Ok(CreateItemResponse {
        message: "Item created successfully".to_string(),
        qr_code_id: item.qr_code_id.clone(),
        qr_code_base64,
        image_url: item.image_url.clone(),
        item,
        transaction,
    })
}

/// Uploads the image under the item's id and stores its URL. A failed upload
/// removes the just-inserted item.
async fn attach_image(state: &AppState, item: Item, upload: ImageUpload) -> Result<Item, AppError> {
    let uploaded = state
        .asset_store
        .upload_image(
            &state.config.asset_folder,
            &item.qr_code_id,
            upload.bytes,
            &upload.content_type,
        )
        .await;
    let url = match uploaded {
        Ok(url) => url,
        Err(err) => {
            if let Err(cleanup) = state.item_repo.delete_item(&item.qr_code_id).await {
                warn!("removing item '{}' after failed upload: {}", item.qr_code_id, cleanup);
            }
            return Err(AppError::Upstream(err));
        }
    };
    let patch = ItemPatch {
        image_url: Some(url),
        ..ItemPatch::default()
    };
    state
        .item_repo
        .update_item(&item.qr_code_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

/// Listing created by a retailer, identified by email.
pub async fn create_retailer_item(
    state: &AppState,
    query: RetailerItemQuery,
) -> Result<CreateItemResponse, AppError> {
    let retailer = require_account(state, AccountKind::Retailer, &query.retailer_email).await?;
    let request = CreateItemRequest {
        name: query.name,
        description: query.description,
        owner: retailer.key().to_string(),
        image_url: query.image_url,
        origin: Some(ItemOrigin::Listing),
        ..CreateItemRequest::default()
    };
    create_item(state, request).await
}

pub async fn pickup_item(
    state: &AppState,
    qr_code_id: &str,
    tourist_ref: &str,
) -> Result<PickupResponse, AppError> {
    let tourist = require_account(state, AccountKind::Tourist, tourist_ref).await?;
    let item = require_item(state, qr_code_id).await?;
    if item.status != ItemStatus::Available {
        return Err(not_available(item.status));
    }

    let balance = debit(state, &tourist, PICKUP_COST).await.map_err(|err| match err {
        AppError::BadRequest(_) => AppError::BadRequest(format!(
            "Not enough points. You need {PICKUP_COST} points to pick up this item."
        )),
        other => other,
    })?;

    let transition = ItemTransition::new(ItemStatus::Available, tourist.key(), ItemStatus::Unavailable);
    let item = match state.item_repo.transition_item(&item.qr_code_id, &transition).await {
        Ok(TransitionOutcome::Applied(item)) => item,
        Ok(TransitionOutcome::NotFound) => {
            compensate(state, &tourist, PICKUP_COST).await;
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        Ok(TransitionOutcome::StatusMismatch { actual }) => {
            warn!("pickup of '{}' lost a race, refunding '{}'", item.qr_code_id, tourist.key());
            compensate(state, &tourist, PICKUP_COST).await;
            return Err(not_available(actual));
        }
        Err(err) => {
            compensate(state, &tourist, PICKUP_COST).await;
            return Err(err.into());
        }
    };

    state.metrics.record_pickup();
    info!("item '{}' picked up by '{}'", item.qr_code_id, tourist.key());
    Ok(PickupResponse {
        message: "Item picked up successfully".to_string(),
        item,
        tourist_points: balance,
    })
}

/// Hands an item to a business. Returns credit the previous tourist owner,
/// donation confirmations credit the donor.
pub async fn dropoff_item(
    state: &AppState,
    qr_code_id: &str,
    business_ref: &str,
) -> Result<DropoffResponse, AppError> {
    let business = require_account(state, AccountKind::Business, business_ref).await?;
    let item = require_item(state, qr_code_id).await?;
    if item.status != ItemStatus::Unavailable {
        return Err(AppError::Conflict("Item is already available".to_string()));
    }

    let previous_owner = item.owner.clone();
    let donor = item.donor.clone();
    let mut transition =
        ItemTransition::new(ItemStatus::Unavailable, business.key(), ItemStatus::Available);
    if donor.is_some() {
        transition = transition.clearing_donor();
    }
    let item = match state.item_repo.transition_item(&item.qr_code_id, &transition).await? {
        TransitionOutcome::Applied(item) => item,
        TransitionOutcome::NotFound => return Err(AppError::NotFound("Item not found".to_string())),
        TransitionOutcome::StatusMismatch { .. } => {
            return Err(AppError::Conflict("Item is already available".to_string()))
        }
    };
    state.metrics.record_dropoff();

    let (reward, credited_account, credit) = match donor {
        Some(donor) => {
            let effect =
                credit_best_effort(state, AccountKind::Tourist, &donor, DONATION_REWARD).await;
            (DONATION_REWARD, Some(donor), effect)
        }
        None => {
            match resolve_account(state.account_repo.as_ref(), AccountKind::Tourist, &previous_owner)
                .await
            {
                Ok(Some(tourist)) => {
                    let key = tourist.key().to_string();
                    let effect =
                        credit_best_effort(state, AccountKind::Tourist, &key, DROPOFF_REWARD).await;
                    (DROPOFF_REWARD, Some(key), effect)
                }
                Ok(None) => (
                    0,
                    None,
                    SideEffect::skipped("previous owner is not a tourist"),
                ),
                Err(err) => {
                    warn!("resolving previous owner '{}' failed: {}", previous_owner, err);
                    state.metrics.record_side_effect_failure();
                    (DROPOFF_REWARD, Some(previous_owner), SideEffect::failed(err))
                }
            }
        }
    };

    info!(
        "item '{}' dropped off at '{}' (credit {:?})",
        item.qr_code_id,
        business.key(),
        credit
    );
    Ok(DropoffResponse {
        message: "Item dropped off successfully".to_string(),
        item,
        reward,
        credited_account,
        credit,
    })
}

/// Retailer scan: ownership moves to the retailer, who earns a point, and
/// the business the item came from earns one too.
pub async fn scan_item(state: &AppState, query: ScanQuery) -> Result<ScanResponse, AppError> {
    let retailer = require_account(state, AccountKind::Retailer, &query.scanner_email).await?;
    let item = require_item(state, &query.qr_code_id).await?;
    if item.status != ItemStatus::Available {
        return Err(not_available(item.status));
    }

    let balance = credit(state, &retailer, SCAN_REWARD).await?;
    let transition =
        ItemTransition::new(ItemStatus::Available, retailer.key(), ItemStatus::Unavailable);
    let item = match state.item_repo.transition_item(&item.qr_code_id, &transition).await {
        Ok(TransitionOutcome::Applied(item)) => item,
        Ok(TransitionOutcome::NotFound) => {
            compensate(state, &retailer, -SCAN_REWARD).await;
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        Ok(TransitionOutcome::StatusMismatch { actual }) => {
            compensate(state, &retailer, -SCAN_REWARD).await;
            return Err(not_available(actual));
        }
        Err(err) => {
            compensate(state, &retailer, -SCAN_REWARD).await;
            return Err(err.into());
        }
    };
    state.metrics.record_scan();

    let origin_business_credit = match item.origin_business.as_deref() {
        Some(business) => {
            credit_best_effort(state, AccountKind::Business, business, SCAN_REWARD).await
        }
        None => SideEffect::skipped("item has no origin business"),
    };

    Ok(ScanResponse {
        message: "Item scanned successfully".to_string(),
        item,
        scanner_points: balance,
        origin_business_credit,
    })
}

pub async fn update_item_metadata(
    state: &AppState,
    qr_code_id: &str,
    patch: ItemPatch,
) -> Result<Item, AppError> {
    let mut patch = ItemPatch {
        name: normalize_optional_text(patch.name),
        description: normalize_optional_text(patch.description),
        owner: normalize_optional_text(patch.owner),
        image_url: normalize_optional_text(patch.image_url),
    };
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    if let Some(owner) = patch.owner.take() {
        let account = resolve_any(state.account_repo.as_ref(), &owner)
            .await?
            .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;
        patch.owner = Some(account.identity.key);
    }
    state
        .item_repo
        .update_item(qr_code_id.trim(), &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

pub async fn delete_item(state: &AppState, qr_code_id: &str) -> Result<(), AppError> {
    if !state.item_repo.delete_item(qr_code_id.trim()).await? {
        return Err(AppError::NotFound("Item not found".to_string()));
    }
    warn!("item '{}' deleted", qr_code_id.trim());
    Ok(())
}

pub(crate) async fn require_item(state: &AppState, qr_code_id: &str) -> Result<Item, AppError> {
    state
        .item_repo
        .get_item(qr_code_id.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

fn not_available(actual: ItemStatus) -> AppError {
    AppError::Conflict(format!("Item is not available (status: {actual})"))
}

fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn render_qr(state: &AppState, qr_code_id: &str, owner: &str) -> Result<String, AppError> {
    let payload = json!({ "qr_code_id": qr_code_id, "owner": owner }).to_string();
    let png = state.qr_renderer.render_png(&payload)?;
    Ok(STANDARD.encode(png))
}

async fn record_donation(
    state: &AppState,
    owner: &Account,
    donor: &Account,
    item: &Item,
    date: Option<&str>,
    time: Option<&str>,
) -> SideEffect {
    if owner.kind != AccountKind::Business {
        return SideEffect::skipped("donation owner is not a business");
    }
    let date = normalize_optional_text(date.map(str::to_string));
    let time = normalize_optional_text(time.map(str::to_string));
    let transaction = Transaction {
        id: new_transaction_id(),
        business_key: owner.key().to_string(),
        business_name: owner.name.clone(),
        name: Some(donor.name.clone()),
        item_name: item.name.clone(),
        qr_code_id: Some(item.qr_code_id.clone()),
        transaction_type: TransactionType::Dropoff,
        scheduled_at: parse_schedule(date.as_deref(), time.as_deref()),
        date,
        time,
        created_at: Utc::now(),
        created_by: donor.identity.uid.clone(),
    };
    match state.transaction_repo.append_transaction(&transaction).await {
        Ok(()) => SideEffect::Applied,
        Err(err) => {
            warn!("donation entry for '{}' failed: {}", item.qr_code_id, err);
            state.metrics.record_side_effect_failure();
            SideEffect::failed(err)
        }
    }
}
