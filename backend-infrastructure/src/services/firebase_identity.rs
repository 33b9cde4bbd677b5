use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use backend_domain::ports::IdentityProvider;
use backend_domain::VerifiedClaims;

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const SIGN_UP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// JWKS cache TTL (1 hour)
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Minimum age before an unknown `kid` may trigger a refetch.
const JWKS_MIN_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct FirebaseSettings {
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkKey {
    kid: String,
    kty: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

struct JwksCache {
    keys: HashMap<String, JwkKey>,
    fetched_at: Instant,
}

enum CacheLookup<'a> {
    Hit(&'a JwkKey),
    Refresh,
    UnknownKid,
}

fn lookup_cached<'a>(cache: Option<&'a JwksCache>, kid: &str) -> CacheLookup<'a> {
    let Some(cached) = cache else {
        return CacheLookup::Refresh;
    };
    let age = cached.fetched_at.elapsed();
    if age >= JWKS_CACHE_TTL {
        return CacheLookup::Refresh;
    }
    match cached.keys.get(kid) {
        Some(key) => CacheLookup::Hit(key),
        None if age < JWKS_MIN_REFRESH => CacheLookup::UnknownKid,
        None => CacheLookup::Refresh,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

/// Verifies Firebase ID tokens (RS256 against the published JWKS) and
/// creates email/password users through the Identity Toolkit REST API.
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    client: Client,
    settings: FirebaseSettings,
    cache: Arc<RwLock<Option<JwksCache>>>,
}

impl FirebaseIdentityProvider {
    pub fn new(settings: FirebaseSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            settings,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    fn project_id(&self) -> Result<&str> {
        self.settings
            .project_id
            .as_deref()
            .ok_or_else(|| anyhow!("firebase_project_id not configured"))
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey> {
        {
            let cache = self.cache.read().await;
            match lookup_cached(cache.as_ref(), kid) {
                CacheLookup::Hit(key) => return jwk_to_decoding_key(key),
                CacheLookup::UnknownKid => bail!("key '{}' not found in jwks", kid),
                CacheLookup::Refresh => {}
            }
        }

        let jwks: JwksResponse = self
            .client
            .get(JWKS_URL)
            .send()
            .await
            .context("fetching jwks")?
            .error_for_status()?
            .json()
            .await
            .context("parsing jwks")?;
        let keys = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect::<HashMap<_, _>>();
        debug!("refreshed jwks ({} keys)", keys.len());

        let decoding_key = keys
            .get(kid)
            .ok_or_else(|| anyhow!("key '{}' not found in jwks", kid))
            .and_then(jwk_to_decoding_key);

        *self.cache.write().await = Some(JwksCache {
            keys,
            fetched_at: Instant::now(),
        });
        decoding_key
    }
}

fn jwk_to_decoding_key(key: &JwkKey) -> Result<DecodingKey> {
    if key.kty != "RSA" {
        bail!("unsupported key type: {}", key.kty);
    }
    DecodingKey::from_rsa_components(&key.n, &key.e).context("building rsa key")
}

fn validation_for(project_id: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[project_id]);
    validation.set_issuer(&[format!("{ISSUER_PREFIX}{project_id}")]);
    validation
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<VerifiedClaims> {
        let project_id = self.project_id()?;
        let header = decode_header(token).context("invalid token header")?;
        let kid = header.kid.ok_or_else(|| anyhow!("token missing kid header"))?;
        let key = self.decoding_key(&kid).await?;
        let data = decode::<IdTokenClaims>(token, &key, &validation_for(project_id))
            .context("token validation failed")?;
        if data.claims.sub.trim().is_empty() {
            bail!("token has empty subject");
        }
        Ok(VerifiedClaims {
            uid: data.claims.sub,
            email: data.claims.email.map(|email| email.to_lowercase()),
            name: data.claims.name,
        })
    }

    async fn create_user(&self, email: &str, password: &str, display_name: &str) -> Result<String> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("firebase_api_key not configured"))?;
        let response = self
            .client
            .post(SIGN_UP_URL)
            .query(&[("key", api_key)])
            .json(&json!({
                "email": email,
                "password": password,
                "displayName": display_name,
                "returnSecureToken": false,
            }))
            .send()
            .await
            .context("calling identity toolkit")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("sign-up failed ({}): {}", status, body);
        }
        let created: SignUpResponse = response.json().await.context("parsing sign-up response")?;
        info!("created identity user {}", created.local_id);
        Ok(created.local_id)
    }
}
