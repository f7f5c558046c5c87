//! # chatbridge - multi-provider LLM streaming bridge
//!
//! One vendor-agnostic chat-completion request in, one normalized stream of
//! text fragments out, whichever vendor serves it. OpenAI, Anthropic and
//! Google Gemini are built in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatbridge::{BridgeConfig, ChatMessage, StreamBridge, StreamElement, StreamRequest};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = StreamBridge::new(BridgeConfig::from_env())?;
//!     let request = StreamRequest::new("openai", "GPT-4o Mini", "sk-...")
//!         .with_message(ChatMessage::user("Hello!"));
//!
//!     let mut stream = bridge.stream_completion(request);
//!     while let Some(element) = stream.next().await {
//!         match element {
//!             StreamElement::Delta(delta) => print!("{}", delta.as_str()),
//!             StreamElement::Error(error) => eprintln!("\n[{}] {}", error.kind, error),
//!             StreamElement::Done => println!(),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Stream contract
//!
//! - Fragments arrive in the order the vendor produced them, as soon as a
//!   network chunk completes them.
//! - Every stream ends with exactly one terminal element: `Done` or `Error`.
//!   A vendor answer without any text is reported as an error.
//! - Dropping the stream (or cancelling a [`CancelHandle`]) aborts the
//!   upstream request.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod registry;
pub mod server_adapters;
pub mod streaming;
pub mod telemetry;
pub mod transport;
pub mod types;
pub mod utils;
pub mod validation;

pub use config::BridgeConfig;
pub use error::{ErrorKind, NormalizedError, RegistryError, TransportError};
pub use orchestrator::{StreamBridge, collect_text};
pub use providers::WireAdapter;
pub use registry::{ModelDescriptor, ProviderDescriptor, ProviderRegistry};
pub use streaming::CompletionStream;
pub use transport::{HttpTransport, OutboundRequest, ReqwestTransport, TransportResponse};
pub use types::{ChatMessage, ContentDelta, Role, StreamElement, StreamRequest};
pub use utils::cancel::CancelHandle;
pub use validation::CredentialCheck;
