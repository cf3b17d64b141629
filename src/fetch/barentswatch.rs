//! BarentsWatch AIS fetcher
//!
//! Obtains an OAuth2 client-credentials token, pulls AIS messages for the
//! recent window, and filters them down to the monitored fleet, newest
//! message per rig only.
//!
//! The client id must already be URL-encoded (it is an email-style id with
//! a literal `@`), so the token body is assembled by hand instead of going
//! through form serialization, which would encode it twice.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

use super::{http_client, FetchError};
use crate::config::BwConfig;
use crate::registry::RigRegistry;
use crate::types::AisMessage;

/// Environment variable holding the URL-encoded client id.
const CLIENT_ID_ENV: &str = "BWAPI_CLIENTID_URLENCODED";
/// Environment variable holding the client secret.
const CLIENT_SECRET_ENV: &str = "BWAPI_PWSECRET";

/// BarentsWatch API credentials.
#[derive(Debug, Clone)]
pub struct BwCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl BwCredentials {
    /// Read credentials from the environment.
    pub fn from_env() -> Result<Self, FetchError> {
        let client_id =
            std::env::var(CLIENT_ID_ENV).map_err(|_| FetchError::Credentials(CLIENT_ID_ENV))?;
        let client_secret = std::env::var(CLIENT_SECRET_ENV)
            .map_err(|_| FetchError::Credentials(CLIENT_SECRET_ENV))?;
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(FetchError::Credentials(CLIENT_ID_ENV));
        }
        Ok(Self { client_id, client_secret })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the BarentsWatch live AIS API.
pub struct BwClient {
    http: reqwest::Client,
    token_url: String,
    ais_url: String,
    window_minutes: i64,
}

impl BwClient {
    /// Build a client from endpoint configuration.
    pub fn new(config: &BwConfig) -> Result<Self, FetchError> {
        Ok(Self {
            http: http_client()?,
            token_url: config.token_url.clone(),
            ais_url: config.ais_url.clone(),
            window_minutes: config.window_minutes,
        })
    }

    /// Obtain an access token with the `ais` scope.
    pub async fn fetch_token(&self, credentials: &BwCredentials) -> Result<String, FetchError> {
        let body = format!(
            "grant_type=client_credentials&client_id={}&client_secret={}&scope=ais",
            credentials.client_id, credentials.client_secret
        );

        let resp = self
            .http
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let token: TokenResponse = resp.json().await?;
        Ok(token.access_token)
    }

    /// Fetch all AIS messages newer than the configured window.
    pub async fn fetch_latest_ais(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AisMessage>, FetchError> {
        let since = (now - Duration::minutes(self.window_minutes))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        info!(since = %since, "fetching AIS messages");

        let resp = self
            .http
            .get(&self.ais_url)
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .query(&[("since", since.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let messages: Vec<AisMessage> = resp.json().await?;
        info!(messages = messages.len(), "received AIS messages");
        Ok(messages)
    }
}

/// Filter raw AIS messages to monitored rigs, keeping only the newest
/// message per MMSI and stamping the canonical rig name.
pub fn latest_by_rig(messages: Vec<AisMessage>, registry: &RigRegistry) -> Vec<AisMessage> {
    let mut latest: HashMap<u64, (DateTime<Utc>, AisMessage)> = HashMap::new();

    for mut msg in messages {
        let Some(mmsi) = msg.mmsi else { continue };
        if !registry.contains_mmsi(mmsi) {
            continue;
        }
        if msg.position().is_none() {
            continue;
        }
        let Some(msgtime) = msg.msgtime_utc() else {
            continue;
        };

        msg.rig_name = registry.name_for_mmsi(mmsi).map(str::to_string);
        msg.source.get_or_insert_with(|| "barentswatch".to_string());

        let newer = latest
            .get(&mmsi)
            .is_none_or(|(existing, _)| msgtime > *existing);
        if newer {
            latest.insert(mmsi, (msgtime, msg));
        }
    }

    let mut rigs: Vec<AisMessage> = latest.into_values().map(|(_, msg)| msg).collect();
    rigs.sort_by(|a, b| a.rig_name.cmp(&b.rig_name));
    info!(rigs = rigs.len(), "rigs with valid positions");
    rigs
}
