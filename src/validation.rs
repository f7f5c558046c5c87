//! Credential validation
//!
//! Sends the cheapest request a vendor accepts and classifies the answer. A
//! vendor that refuses the request because the account has no credit is a
//! separate outcome: the key itself is fine.

use secrecy::SecretString;
use serde::Serialize;
use tokio::time::Instant;

use crate::error::{ErrorKind, NormalizedError, TransportError, is_billing_condition};
use crate::orchestrator::{StreamBridge, resolve_target};

/// Outcome of [`StreamBridge::validate_credential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CredentialCheck {
    Valid,
    /// The vendor accepted the key but the account cannot place requests.
    BillingIssue { message: String },
    Invalid(NormalizedError),
}

impl CredentialCheck {
    /// Whether the key itself was accepted.
    pub fn is_usable_key(&self) -> bool {
        matches!(self, Self::Valid | Self::BillingIssue { .. })
    }
}

impl StreamBridge {
    /// Check `credential` against `provider_id` with a minimal probe request.
    ///
    /// `model_ref` picks the model the probe targets where the vendor needs one;
    /// the provider's default model is used when it is `None`.
    pub async fn validate_credential(
        &self,
        provider_id: &str,
        credential: &SecretString,
        model_ref: Option<&str>,
    ) -> CredentialCheck {
        match self.probe(provider_id, credential, model_ref).await {
            Ok(()) => CredentialCheck::Valid,
            Err(check) => check,
        }
    }

    async fn probe(
        &self,
        provider_id: &str,
        credential: &SecretString,
        model_ref: Option<&str>,
    ) -> Result<(), CredentialCheck> {
        let model_ref = match model_ref {
            Some(model_ref) => model_ref.to_string(),
            None => self
                .registry()
                .default_model(provider_id)
                .map(|m| m.api_id.clone())
                .ok_or_else(|| {
                    CredentialCheck::Invalid(NormalizedError::unknown(format!(
                        "Unknown provider: {provider_id}"
                    )))
                })?,
        };
        let (adapter, api_id) =
            resolve_target(self.registry(), provider_id, &model_ref).map_err(CredentialCheck::Invalid)?;
        let probe = adapter
            .build_probe_request(&api_id, credential)
            .map_err(CredentialCheck::Invalid)?;

        let deadline = Instant::now() + self.config().request_timeout();
        let response = tokio::time::timeout_at(deadline, self.transport().send(probe))
            .await
            .map_err(|_| TransportError::Timeout)
            .and_then(|sent| sent)
            .map_err(|e| CredentialCheck::Invalid(e.into()))?;
        if response.is_success() {
            tracing::debug!(provider = provider_id, "credential accepted");
            return Ok(());
        }

        let status = response.status;
        let headers = response.headers.clone();
        let body = match tokio::time::timeout_at(deadline, response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::debug!(provider = provider_id, error = %e, "failed to read probe error body");
                String::new()
            }
            Err(_) => {
                tracing::debug!(provider = provider_id, status, "probe error body stalled past the deadline");
                String::new()
            }
        };
        let error = adapter.normalize_error(status, &headers, &body);
        if error.kind != ErrorKind::AuthFailure && is_billing_condition(status, &error.message) {
            tracing::info!(provider = provider_id, status, "credential valid but account has a billing issue");
            return Err(CredentialCheck::BillingIssue {
                message: error.message,
            });
        }
        tracing::debug!(provider = provider_id, status, kind = %error.kind, "credential rejected");
        Err(CredentialCheck::Invalid(error))
    }
}
