#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use backend_application::{AppState, Metrics};
use backend_domain::ports::{
    AccountRepository, AssetStore, Geocoder, IdentityProvider, TransactionRepository,
};
use backend_domain::{
    Account, AccountIdentity, AccountKind, Coordinates, RuntimeConfig, Transaction,
    VerifiedClaims,
};
use backend_infrastructure::{MemoryStore, PngQrRenderer};

pub struct FakeGeocoder {
    known: HashMap<String, Coordinates>,
    failing: Vec<String>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        let known = HashMap::from([
            ("Toronto".to_string(), Coordinates::new(43.6532, -79.3832)),
            ("Mississauga".to_string(), Coordinates::new(43.5890, -79.6441)),
            ("Hamilton".to_string(), Coordinates::new(43.2557, -79.8711)),
            ("Montreal".to_string(), Coordinates::new(45.5017, -73.5673)),
        ]);
        Self {
            known,
            failing: vec!["Broken".to_string()],
        }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> anyhow::Result<Option<Coordinates>> {
        if self.failing.iter().any(|value| value == address) {
            anyhow::bail!("geocoder unavailable");
        }
        Ok(self.known.get(address).copied())
    }
}

/// Accepts `token-<uid>` tokens; the email claim is `<uid>@example.com`.
pub struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_token(&self, token: &str) -> anyhow::Result<VerifiedClaims> {
        let uid = token
            .strip_prefix("token-")
            .ok_or_else(|| anyhow::anyhow!("bad token"))?;
        Ok(VerifiedClaims {
            uid: uid.to_string(),
            email: Some(format!("{uid}@example.com")),
            name: None,
        })
    }

    async fn create_user(&self, email: &str, _password: &str, _name: &str) -> anyhow::Result<String> {
        Ok(format!("uid-{}", email.split('@').next().unwrap_or(email)))
    }
}

pub struct FakeAssets;

#[async_trait]
impl AssetStore for FakeAssets {
    async fn upload_image(
        &self,
        folder: &str,
        public_id: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<String> {
        Ok(format!("https://assets.example.com/{folder}/{public_id}"))
    }
}

/// Records every public id it is asked to upload.
#[derive(Default)]
pub struct RecordingAssets {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl AssetStore for RecordingAssets {
    async fn upload_image(
        &self,
        folder: &str,
        public_id: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<String> {
        self.uploads
            .lock()
            .expect("uploads lock")
            .push(public_id.to_string());
        Ok(format!("https://assets.example.com/{folder}/{public_id}"))
    }
}

pub struct FailingAssets;

#[async_trait]
impl AssetStore for FailingAssets {
    async fn upload_image(
        &self,
        _folder: &str,
        _public_id: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<String> {
        anyhow::bail!("asset host unreachable")
    }
}

pub struct FailingTransactions;

#[async_trait]
impl TransactionRepository for FailingTransactions {
    async fn append_transaction(&self, _transaction: &Transaction) -> anyhow::Result<()> {
        anyhow::bail!("transaction store offline")
    }

    async fn list_transactions(&self, _business_key: &str) -> anyhow::Result<Vec<Transaction>> {
        Ok(Vec::new())
    }

    async fn delete_transaction(&self, _business_key: &str, _id: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}

pub fn build_state(store: Arc<MemoryStore>) -> AppState {
    AppState {
        config: RuntimeConfig::default(),
        account_repo: store.clone(),
        item_repo: store.clone(),
        transaction_repo: store.clone(),
        store_health: store,
        geocoder: Arc::new(FakeGeocoder::new()),
        identity_provider: Arc::new(FakeIdentity),
        asset_store: Arc::new(FakeAssets),
        qr_renderer: Arc::new(PngQrRenderer::new()),
        metrics: Arc::new(Metrics::default()),
    }
}

pub async fn seed(
    store: &MemoryStore,
    kind: AccountKind,
    key: &str,
    email: &str,
    points: i64,
    address: Option<&str>,
) -> Account {
    let account = Account {
        kind,
        identity: AccountIdentity::new(key, Some(key.to_string()), Some(email.to_string())),
        name: format!("{} {}", kind.as_str(), key),
        points,
        address: address.map(str::to_string),
        created_at: Utc::now(),
    };
    assert!(store.insert_account(&account).await.expect("seed account"));
    account
}

pub async fn balance(store: &MemoryStore, kind: AccountKind, key: &str) -> i64 {
    store
        .get_account(kind, key)
        .await
        .expect("read account")
        .expect("account exists")
        .points
}
