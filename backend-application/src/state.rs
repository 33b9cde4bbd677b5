use std::sync::Arc;

use backend_domain::ports::{
    AccountRepository, AssetStore, Geocoder, IdentityProvider, ItemRepository, QrCodeRenderer,
    StoreHealth, TransactionRepository,
};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub account_repo: Arc<dyn AccountRepository>,
    pub item_repo: Arc<dyn ItemRepository>,
    pub transaction_repo: Arc<dyn TransactionRepository>,
    pub store_health: Arc<dyn StoreHealth>,
    pub geocoder: Arc<dyn Geocoder>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub asset_store: Arc<dyn AssetStore>,
    pub qr_renderer: Arc<dyn QrCodeRenderer>,
    pub metrics: Arc<Metrics>,
}
