//! # furs-client — FURS Fiscal Verification Client
//!
//! Submits invoices and registers business premises with the Slovenian tax
//! administration (FURS), and checks connectivity with echo requests.
//!
//! ```text
//! InvoiceRequest ──► prepare ──► Transport ──► open ──► interpret ──► EOR
//!                    │ header                   │ verify
//!                    │ ZOI                      │ parse
//!                    │ seal                     │
//! ```
//!
//! ## Usage
//!
//! Build an [`ExchangeContext`] from a [`FursConfig`] and a shared
//! [`furs_crypto::Credential`], pick a transport, and wrap both in a
//! [`FursClient`] (blocking) or [`AsyncFursClient`].
//!
//! ## Crate Policy
//!
//! - No automatic retries anywhere. A resubmitted invoice is a fiscal event
//!   and must be the caller's decision.
//! - No timeouts invented by the exchange; the transport owns cancellation.
//! - Private keys, tokens and full payloads are never logged.

pub mod client;
pub mod client_async;
pub mod codec;
pub mod config;
pub mod dto;
pub mod error;
pub mod exchange;
pub mod http;
pub mod transport;

pub use client::FursClient;
pub use client_async::AsyncFursClient;
pub use codec::JsonCodec;
pub use config::{FursConfig, FursEnvironment};
pub use error::{DomainError, FursError, ProtocolError, UNKNOWN_ERROR_CODE};
pub use exchange::ExchangeContext;
pub use http::{BlockingReqwestTransport, ReqwestTransport, TlsIdentity};
pub use transport::{AsyncTransport, BlockingTransportAdapter, HttpRequest, Transport, TransportError};
