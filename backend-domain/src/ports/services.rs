use async_trait::async_trait;

use crate::entities::{Coordinates, VerifiedClaims};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service has no match for the address.
    async fn geocode(&self, address: &str) -> anyhow::Result<Option<Coordinates>>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> anyhow::Result<VerifiedClaims>;
    /// Creates a sign-in account and returns its UID.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> anyhow::Result<String>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Uploads an image and returns its public URL.
    async fn upload_image(
        &self,
        folder: &str,
        public_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<String>;
}

pub trait QrCodeRenderer: Send + Sync {
    fn render_png(&self, payload: &str) -> anyhow::Result<Vec<u8>>;
}
