// Request and response shapes exchanged with the HTTP layer

use serde::{Deserialize, Serialize};

use crate::entities::{Account, Item, SideEffect, Transaction};
use crate::value_objects::{AccountKind, ItemOrigin};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAccountRequest {
    #[serde(alias = "username")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterAccountResponse {
    pub message: String,
    pub account: Account,
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Item creation input, gathered from a multipart form or query string.
#[derive(Debug, Clone, Default)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: String,
    pub owner: String,
    pub image: Option<ImageUpload>,
    pub image_url: Option<String>,
    pub qr_code_id: Option<String>,
    pub donor: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub origin: Option<ItemOrigin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateItemResponse {
    pub message: String,
    pub qr_code_id: String,
    pub qr_code_base64: String,
    pub image_url: Option<String>,
    pub item: Item,
    pub transaction: SideEffect,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupResponse {
    pub message: String,
    pub item: Item,
    pub tourist_points: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DropoffResponse {
    pub message: String,
    pub item: Item,
    pub reward: i64,
    /// Account the reward was aimed at, if any.
    pub credited_account: Option<String>,
    pub credit: SideEffect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanQuery {
    pub qr_code_id: String,
    pub scanner_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub message: String,
    pub item: Item,
    pub scanner_points: i64,
    pub origin_business_credit: SideEffect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailerItemQuery {
    pub name: String,
    pub description: String,
    pub retailer_email: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransactionRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub item_name: String,
    #[serde(default)]
    pub qr_code_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(alias = "type")]
    pub transaction_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessIdentifierQuery {
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionList {
    pub business: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyQuery {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyAccount {
    pub id: String,
    pub name: String,
    pub address: String,
    pub points: i64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyItem {
    #[serde(flatten)]
    pub item: Item,
    pub holder_name: String,
    pub holder_address: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub role: AccountKind,
    pub profile: Account,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointsResponse {
    pub account: String,
    pub kind: AccountKind,
    pub points: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointsAdjustment {
    pub delta: i64,
}
