//! Stream orchestrator
//!
//! [`StreamBridge`] is the entry point of the crate. For each call it resolves
//! the provider and model, lets the provider's [`WireAdapter`] describe the
//! HTTP request, sends it through the [`HttpTransport`], and re-emits the
//! decoded fragments as a normalized [`CompletionStream`]:
//!
//! ```text
//! Delta* (Error | Done)
//! ```
//!
//! Exactly one terminal element is produced. A stream that ends normally
//! without a single fragment is reported as an empty-response error, for
//! every vendor alike. A single deadline covers the whole call.

use std::sync::Arc;

use futures::StreamExt;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::BridgeConfig;
use crate::error::{NormalizedError, TransportError};
use crate::providers::WireAdapter;
use crate::registry::ProviderRegistry;
use crate::streaming::{CompletionStream, DeltaStream, with_deadline};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{StreamElement, StreamRequest};
use crate::utils::cancel::{CancelHandle, with_cancel_handle};

/// Vendor-agnostic streaming chat completions.
///
/// Cheap to clone; clones share the registry and the HTTP transport.
#[derive(Clone)]
pub struct StreamBridge {
    registry: Arc<ProviderRegistry>,
    transport: Arc<dyn HttpTransport>,
    config: BridgeConfig,
}

impl std::fmt::Debug for StreamBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamBridge")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StreamBridge {
    /// Bridge over the built-in providers and a `reqwest` transport.
    pub fn new(config: BridgeConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(&config)?;
        let registry = Arc::new(ProviderRegistry::builtin(&config));
        Ok(Self::with_parts(config, registry, Arc::new(transport)))
    }

    /// Bridge over the process-wide registry; see [`crate::registry::global`].
    pub fn from_global(config: BridgeConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(&config)?;
        let registry = Arc::clone(crate::registry::global());
        Ok(Self::with_parts(config, registry, Arc::new(transport)))
    }

    pub fn with_parts(
        config: BridgeConfig,
        registry: Arc<ProviderRegistry>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            registry,
            transport,
            config,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Stream one chat completion.
    ///
    /// Nothing happens until the returned stream is polled. Dropping it at any
    /// point aborts the upstream request.
    pub fn stream_completion(&self, request: StreamRequest) -> CompletionStream {
        let registry = Arc::clone(&self.registry);
        let transport = Arc::clone(&self.transport);
        let timeout = self.config.request_timeout();
        let request_id = Uuid::new_v4();

        let s = async_stream::stream! {
            let deadline = Instant::now() + timeout;
            let opened = open_stream(&registry, transport.as_ref(), &request, deadline, request_id).await;
            let mut deltas = match opened {
                Ok(deltas) => deltas,
                Err(error) => {
                    tracing::warn!(%request_id, provider = %request.provider_id, kind = %error.kind, "completion failed before streaming");
                    yield StreamElement::Error(error);
                    return;
                }
            };

            let mut forwarded = 0usize;
            while let Some(item) = deltas.next().await {
                match item {
                    Ok(delta) => {
                        forwarded += 1;
                        yield StreamElement::Delta(delta);
                    }
                    Err(error) => {
                        tracing::warn!(%request_id, provider = %request.provider_id, kind = %error.kind, forwarded, "completion stream failed");
                        yield StreamElement::Error(error);
                        return;
                    }
                }
            }

            if forwarded == 0 {
                tracing::warn!(%request_id, provider = %request.provider_id, "completion ended without content");
                yield StreamElement::Error(NormalizedError::empty_response(&request.provider_id));
            } else {
                tracing::debug!(%request_id, provider = %request.provider_id, forwarded, "completion finished");
                yield StreamElement::Done;
            }
        };
        Box::pin(s)
    }

    /// [`stream_completion`](Self::stream_completion) that also stops when `handle` is cancelled.
    pub fn stream_completion_cancellable(
        &self,
        request: StreamRequest,
        handle: &CancelHandle,
    ) -> CompletionStream {
        with_cancel_handle(self.stream_completion(request), handle.clone())
    }
}

/// Resolve the provider and model for `request`.
pub(crate) fn resolve_target(
    registry: &ProviderRegistry,
    provider_id: &str,
    model_ref: &str,
) -> Result<(Arc<dyn WireAdapter>, String), NormalizedError> {
    let adapter = registry
        .adapter(provider_id)
        .ok_or_else(|| NormalizedError::unknown(format!("Unknown provider: {provider_id}")))?;
    let api_id = registry
        .resolve_model(provider_id, model_ref)
        .ok_or_else(|| {
            NormalizedError::model_not_found(format!(
                "Model `{model_ref}` is not available for provider {provider_id}"
            ))
        })?;
    Ok((adapter, api_id.to_string()))
}

/// Everything up to the first body byte: resolution, request, response head.
async fn open_stream(
    registry: &ProviderRegistry,
    transport: &dyn HttpTransport,
    request: &StreamRequest,
    deadline: Instant,
    request_id: Uuid,
) -> Result<DeltaStream, NormalizedError> {
    let (adapter, api_id) = resolve_target(registry, &request.provider_id, &request.model_ref)?;
    let outbound = adapter.build_outbound_request(&api_id, request)?;
    tracing::debug!(
        %request_id,
        provider = adapter.provider_id(),
        model = %api_id,
        url = %outbound.redacted_url(),
        "dispatching completion"
    );

    let response = tokio::time::timeout_at(deadline, transport.send(outbound))
        .await
        .map_err(|_| NormalizedError::from(TransportError::Timeout))??;

    if !response.is_success() {
        let status = response.status;
        let headers = response.headers.clone();
        let body = match tokio::time::timeout_at(deadline, response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::debug!(%request_id, error = %e, "failed to read error body");
                String::new()
            }
            Err(_) => String::new(),
        };
        tracing::debug!(%request_id, status, "upstream rejected the request");
        return Err(adapter.normalize_error(status, &headers, &body));
    }

    Ok(adapter.decode(with_deadline(response.body, deadline)))
}

/// Drain a completion stream into the full text, or its terminal error.
pub async fn collect_text(mut stream: CompletionStream) -> Result<String, NormalizedError> {
    let mut text = String::new();
    while let Some(element) = stream.next().await {
        match element {
            StreamElement::Delta(delta) => text.push_str(delta.as_str()),
            StreamElement::Error(error) => return Err(error),
            StreamElement::Done => break,
        }
    }
    Ok(text)
}
