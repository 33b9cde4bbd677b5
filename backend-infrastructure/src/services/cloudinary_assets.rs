use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use backend_domain::ports::AssetStore;

#[derive(Debug, Clone)]
pub struct CloudinarySettings {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Signed image uploads to Cloudinary.
pub struct CloudinaryAssetStore {
    client: Client,
    settings: CloudinarySettings,
}

impl CloudinaryAssetStore {
    pub fn new(settings: CloudinarySettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self { client, settings })
    }
}

/// Signature over the sorted upload parameters followed by the secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let digest = Sha256::digest(format!("{joined}{api_secret}").as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn upload_image(
        &self,
        folder: &str,
        public_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let (Some(cloud_name), Some(api_key), Some(api_secret)) = (
            self.settings.cloud_name.as_deref(),
            self.settings.api_key.as_deref(),
            self.settings.api_secret.as_deref(),
        ) else {
            return Err(anyhow!("cloudinary credentials not configured"));
        };

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", folder),
                ("public_id", public_id),
                ("timestamp", &timestamp),
            ],
            api_secret,
        );
        let file = Part::bytes(bytes)
            .file_name(public_id.to_string())
            .mime_str(content_type)
            .context("invalid image content type")?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", api_key.to_string())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("public_id", public_id.to_string())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let url = format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .context("uploading image")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("image upload failed ({}): {}", status, body);
        }
        let uploaded: UploadResponse = response.json().await.context("parsing upload response")?;
        info!("uploaded image {}/{}", folder, public_id);
        Ok(uploaded.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_parameters() {
        let a = sign(&[("timestamp", "1"), ("folder", "items")], "secret");
        let b = sign(&[("folder", "items"), ("timestamp", "1")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let expected = Sha256::digest(b"folder=items&timestamp=1secret");
        let expected = expected.iter().map(|byte| format!("{byte:02x}")).collect::<String>();
        assert_eq!(a, expected);
    }

    #[tokio::test]
    async fn missing_credentials_fail_fast() {
        let store = CloudinaryAssetStore::new(CloudinarySettings {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            request_timeout_seconds: 5,
        })
        .expect("client");
        let err = store
            .upload_image("items", "qr", vec![1, 2, 3], "image/png")
            .await
            .expect_err("reject");
        assert!(err.to_string().contains("cloudinary"));
    }
}
