//! # Resend Client
//! Asynchronous wrapper around the Resend transactional email HTTP API: send emails, manage sending domains, API keys, audiences and contacts from Rust using [`Client`] and [`ClientBuilder`].
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest` by default; any other [`Transport`] can be plugged in through [`ClientBuilder::transport`].
//!
//! ## Out of scope
//! No retries, backoff or batching beyond the API's own batch endpoint. Each method is a single request; retry policy is left to the caller.
//!
//! ## Errors
//! Every method returns a [`Response`] envelope inside the crate-wide [`Result`]. By default failures are returned as `Err`:
//! non-2xx statuses become [`Error::Status`], unusable bodies become [`Error::Deserialize`] (`RC001`), [`Error::NullPayload`] (`RC002`) or [`Error::Mapping`] (`RC003`).
//! With `throw_errors(false)` those failures come back as [`Response::Failure`] instead. Transport errors, local validation errors and cancellation are always `Err`.
//!
//! ## Example
//! ```no_run
//! use resend_client::{CancellationToken, Client, EmailMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), resend_client::Error> {
//!     let client = Client::builder().api_token("re_123456789").build()?;
//!     let cancel = CancellationToken::new();
//!
//!     let message = EmailMessage::new("Acme <onboarding@acme.dev>", ["delivered@resend.dev"], "Hello")
//!         .text("It works!");
//!     let id = client.send_email(&message, &cancel).await?;
//!     println!("Sent: {:?}", id.content());
//!
//!     if let Some(domains) = client.list_domains(&cancel).await?.into_content() {
//!         for domain in domains {
//!             println!("{} ({:?})", domain.name, domain.status);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;
mod response;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use error::{Error, ErrorCode};
pub use models::{
    ApiKey, ApiKeyData, Audience, Contact, ContactData, DeliveryRegion, DeliveryStatus, DnsRecord,
    Domain, DomainStatus, DomainUpdateData, EmailAttachment, EmailMessage, EmailReceipt, EmailTag,
    Permission, TlsMode, Webhook,
};
pub use response::Response;
pub use tokio_util::sync::CancellationToken;
pub use transport::Transport;

/// Result type alias for Resend operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
