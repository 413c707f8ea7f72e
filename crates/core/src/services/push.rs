//! Push messaging gateway.
//!
//! Wraps the external messaging provider (FCM HTTP API) behind an
//! explicitly constructed client with a documented lifecycle: built once
//! at process start, queried for availability before use, never
//! reconstructed mid-process. Provider unavailability is a recoverable,
//! non-fatal condition at startup and at call time.

use koinonia_common::config::PushConfig;
use koinonia_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Minimum accepted push-token length.
const TOKEN_MIN_LEN: usize = 100;

/// Maximum accepted push-token length.
const TOKEN_MAX_LEN: usize = 300;

/// Placeholder strings some clients send instead of a real token.
const TOKEN_DENYLIST: [&str; 4] = ["null", "undefined", "(null)", "test_token"];

/// Defensive shape check for client-supplied push tokens.
///
/// Pure predicate, no network call: accepts non-empty strings of
/// provider-plausible length composed of `[A-Za-z0-9_:-]`, rejecting the
/// obvious placeholder values. Not a provider-side validation.
#[must_use]
pub fn is_valid_push_token(token: &str) -> bool {
    if TOKEN_DENYLIST.contains(&token) {
        return false;
    }
    if token.len() < TOKEN_MIN_LEN || token.len() > TOKEN_MAX_LEN {
        return false;
    }
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

/// Push payload: what one delivery attempt carries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Structured payload for client-side deep linking.
    pub data: serde_json::Value,
}

/// One delivery target: the token plus the recipient's badge number,
/// with the owning user id kept for token cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTarget {
    pub user_id: String,
    pub token: String,
    pub badge: u64,
}

/// Aggregate result of a batched send.
#[derive(Debug, Default)]
pub struct SendOutcome {
    pub success: usize,
    pub failure: usize,
    /// Tokens the provider reported as permanently dead, with their
    /// owning user ids; callers clear these best-effort.
    pub invalid: Vec<PushTarget>,
}

/// Per-send error classification.
enum SendError {
    /// Provider says the token will never work again.
    InvalidToken,
    Other(String),
}

/// Subset of the provider's per-message response we care about.
#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    #[serde(default)]
    error: Option<String>,
}

/// Push gateway over the FCM HTTP API.
#[derive(Clone)]
pub struct PushGateway {
    config: Option<PushConfig>,
    http_client: reqwest::Client,
}

impl PushGateway {
    /// Create a new gateway. `None` config means push is disabled; every
    /// pipeline gates on [`Self::is_enabled`] before doing any work.
    #[must_use]
    pub fn new(config: Option<PushConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("Push gateway disabled: no provider credentials configured");
        }
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Whether the provider was initialized with credentials.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send one message to one device token.
    pub async fn send_to_token(
        &self,
        token: &str,
        badge: u64,
        message: &PushMessage,
    ) -> AppResult<()> {
        match self.send_single(token, badge, message).await {
            Ok(()) => Ok(()),
            Err(SendError::InvalidToken) => Err(AppError::ExternalService(
                "push token rejected by provider".to_string(),
            )),
            Err(SendError::Other(e)) => Err(AppError::ExternalService(e)),
        }
    }

    /// Send one message to many targets, one request per token.
    ///
    /// Per-target failures are isolated and counted; the batch itself
    /// never fails. Permanently-invalid tokens are collected separately.
    pub async fn send_to_targets(
        &self,
        targets: &[PushTarget],
        message: &PushMessage,
    ) -> SendOutcome {
        let mut outcome = SendOutcome::default();

        for target in targets {
            match self.send_single(&target.token, target.badge, message).await {
                Ok(()) => outcome.success += 1,
                Err(SendError::InvalidToken) => {
                    outcome.failure += 1;
                    outcome.invalid.push(target.clone());
                }
                Err(SendError::Other(e)) => {
                    outcome.failure += 1;
                    tracing::warn!(user_id = %target.user_id, error = %e, "Push send failed");
                }
            }
        }

        outcome
    }

    /// Send one message to a topic subscription.
    pub async fn send_to_topic(&self, topic: &str, message: &PushMessage) -> AppResult<()> {
        let to = format!("/topics/{topic}");
        match self.post_message(&to, None, message).await {
            Ok(_) => Ok(()),
            Err(SendError::InvalidToken) => Err(AppError::ExternalService(
                "topic rejected by provider".to_string(),
            )),
            Err(SendError::Other(e)) => Err(AppError::ExternalService(e)),
        }
    }

    async fn send_single(
        &self,
        token: &str,
        badge: u64,
        message: &PushMessage,
    ) -> Result<(), SendError> {
        let response = self.post_message(token, Some(badge), message).await?;

        if let Some(result) = response.results.first()
            && let Some(error) = &result.error
        {
            return if error == "NotRegistered" || error == "InvalidRegistration" {
                Err(SendError::InvalidToken)
            } else {
                Err(SendError::Other(format!("provider error: {error}")))
            };
        }

        Ok(())
    }

    async fn post_message(
        &self,
        to: &str,
        badge: Option<u64>,
        message: &PushMessage,
    ) -> Result<FcmResponse, SendError> {
        let Some(config) = &self.config else {
            return Err(SendError::Other("push gateway not configured".to_string()));
        };

        let mut notification = json!({
            "title": message.title,
            "body": message.body,
            "sound": "default",
        });
        if let Some(badge) = badge {
            // iOS shows the numeric unread badge; the provider expects a string
            notification["badge"] = json!(badge.to_string());
        }

        let payload = json!({
            "to": to,
            "notification": notification,
            "data": message.data,
            "priority": "high",
        });

        let response = self
            .http_client
            .post(&config.endpoint)
            .header("Authorization", format!("key={}", config.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::Other(format!("push request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SendError::Other(format!(
                "provider returned {}",
                response.status()
            )));
        }

        response
            .json::<FcmResponse>()
            .await
            .map_err(|e| SendError::Other(format!("unparseable provider response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_token() -> String {
        // ~150 chars in the provider's alphabet
        let mut token = String::from("dXrT9:");
        while token.len() < 150 {
            token.push_str("aB3_-");
        }
        token
    }

    #[test]
    fn test_rejects_empty_and_short_tokens() {
        assert!(!is_valid_push_token(""));
        assert!(!is_valid_push_token("short12345"));
    }

    #[test]
    fn test_rejects_token_with_space() {
        let mut token = well_formed_token();
        token.truncate(250);
        token.replace_range(100..101, " ");
        assert!(!is_valid_push_token(&token));
    }

    #[test]
    fn test_accepts_well_formed_token() {
        assert!(is_valid_push_token(&well_formed_token()));
    }

    #[test]
    fn test_rejects_placeholders() {
        assert!(!is_valid_push_token("null"));
        assert!(!is_valid_push_token("undefined"));
        assert!(!is_valid_push_token("test_token"));
    }

    #[test]
    fn test_rejects_overlong_token() {
        let token: String = "a".repeat(301);
        assert!(!is_valid_push_token(&token));
    }

    #[test]
    fn test_gateway_disabled_without_config() {
        let gateway = PushGateway::new(None);
        assert!(!gateway.is_enabled());
    }
}
