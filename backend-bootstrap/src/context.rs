use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use backend_application::{AppState, Metrics};
use backend_domain::StoreBackend;
use backend_infrastructure::{
    AppConfig, CloudinaryAssetStore, FirebaseIdentityProvider, MemoryStore, NominatimGeocoder,
    PngQrRenderer, PostgresStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let store_config = config.to_store_config();

        let geocoder = Arc::new(NominatimGeocoder::new(config.to_geocoder_settings())?);
        let identity_provider =
            Arc::new(FirebaseIdentityProvider::new(config.to_firebase_settings())?);
        let asset_store = Arc::new(CloudinaryAssetStore::new(config.to_cloudinary_settings())?);
        let qr_renderer = Arc::new(PngQrRenderer::new());
        let metrics = Arc::new(Metrics::default());

        let state = match store_config.backend {
            StoreBackend::Memory => {
                info!("using in-memory store");
                let store = Arc::new(MemoryStore::new());
                AppState {
                    config: runtime_config,
                    account_repo: store.clone(),
                    item_repo: store.clone(),
                    transaction_repo: store.clone(),
                    store_health: store,
                    geocoder,
                    identity_provider,
                    asset_store,
                    qr_renderer,
                    metrics,
                }
            }
            StoreBackend::Postgres => {
                let url = store_config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("database_url is required for postgres"))?;
                let store =
                    Arc::new(PostgresStore::connect(url, store_config.max_connections).await?);
                store.ensure_schema().await?;
                info!("using postgres store");
                AppState {
                    config: runtime_config,
                    account_repo: store.clone(),
                    item_repo: store.clone(),
                    transaction_repo: store.clone(),
                    store_health: store,
                    geocoder,
                    identity_provider,
                    asset_store,
                    qr_renderer,
                    metrics,
                }
            }
        };

        Ok(Self { state })
    }
}
