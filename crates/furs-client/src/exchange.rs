//! # Exchange Steps
//!
//! Every exchange runs the same four steps: prepare the request, round-trip
//! it through a transport, open the response, interpret it. Only the round
//! trip differs between [`crate::FursClient`] and
//! [`crate::AsyncFursClient`]; both call the synchronous step functions
//! defined here.
//!
//! Echo is a plain exchange: JSON out, JSON back. Invoice submission and
//! premise registration are sealed: the request is wrapped in a signed
//! envelope and the response envelope must verify against the configured
//! server certificate before its payload is even parsed.
//!
//! ## Security Invariant
//!
//! A sealed response is trusted only after `parse_and_verify` against the
//! server trust anchor held by the credential. The token's own header is
//! never consulted.
//!
//! ## Interpretation
//!
//! - Success payload present: return it.
//! - Structured error present: [`DomainError`] with the server's code and
//!   message, or [`UNKNOWN_ERROR_CODE`] and the operation's default message
//!   where either is missing.
//! - Neither: [`ProtocolError`]. A response is never taken as implicit
//!   success.

use std::sync::Arc;

use furs_crypto::envelope::{self, TokenEnvelope};
use furs_crypto::Credential;
use tracing::Span;
use uuid::Uuid;

use crate::codec::JsonCodec;
use crate::config::{FursConfig, FursEnvironment};
use crate::dto::{
    BusinessPremiseRequest, FursHeader, FursRequest, FursResponse, InvoiceRequest, ServerError,
};
use crate::error::{DomainError, FursError, ProtocolError, UNKNOWN_ERROR_CODE};
use crate::transport::HttpRequest;

const INVOICE_DEFAULT_MESSAGE: &str = "Unknown error while submitting invoice";
const PREMISE_DEFAULT_MESSAGE: &str = "Unknown error while registering business premise";

/// Everything an exchange needs besides the transport. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    environment: Arc<FursEnvironment>,
    credential: Arc<Credential>,
    codec: Arc<JsonCodec>,
}

impl ExchangeContext {
    pub fn new(environment: FursEnvironment, credential: Arc<Credential>, codec: Arc<JsonCodec>) -> Self {
        Self {
            environment: Arc::new(environment),
            credential,
            codec,
        }
    }

    pub fn from_config(config: &FursConfig, credential: Arc<Credential>) -> Self {
        Self::new(
            config.environment.clone(),
            credential,
            Arc::new(JsonCodec::new(config.max_response_bytes)),
        )
    }

    pub fn environment(&self) -> &FursEnvironment {
        &self.environment
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn codec(&self) -> &JsonCodec {
        &self.codec
    }

    fn seal(&self, request: &FursRequest) -> Result<Vec<u8>, FursError> {
        let payload = self.codec.encode(request, request.kind())?;
        let token = envelope::build(&payload, &self.credential)?;
        tracing::debug!(
            payload_bytes = payload.len(),
            token_bytes = token.len(),
            "sealed request"
        );
        Ok(self.codec.encode(&TokenEnvelope { token }, "token wrapper")?)
    }

    fn open_plain(&self, body: &[u8]) -> Result<FursResponse, FursError> {
        Ok(self.codec.decode(body, "response")?)
    }

    fn open_sealed(&self, body: &[u8]) -> Result<FursResponse, FursError> {
        let wrapper: TokenEnvelope = self.codec.decode(body, "token wrapper")?;
        let payload = envelope::parse_and_verify(&wrapper.token, self.credential.server_anchor())
            .map_err(|err| {
                tracing::warn!(error = %err, "response envelope rejected");
                FursError::from(err)
            })?;
        tracing::debug!(payload_bytes = payload.len(), "opened response");
        Ok(self.codec.decode(&payload, "response payload")?)
    }
}

/// A request ready for the transport, plus what is needed to make sense of
/// the response.
#[derive(Debug)]
pub struct Prepared<R> {
    pub request: HttpRequest,
    span: Span,
    sealed: bool,
    interpret: fn(FursResponse) -> Result<R, FursError>,
}

impl<R> Prepared<R> {
    /// The tracing span covering this exchange.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Open and interpret the transport's response body.
    pub fn complete(self, context: &ExchangeContext, body: &[u8]) -> Result<R, FursError> {
        let _entered = self.span.enter();
        let response = if self.sealed {
            context.open_sealed(body)?
        } else {
            context.open_plain(body)?
        };
        (self.interpret)(response)
    }
}

pub fn prepare_echo(context: &ExchangeContext, message: &str) -> Result<Prepared<String>, FursError> {
    let span = tracing::info_span!("furs_exchange", operation = "echo");
    let body = span.in_scope(|| {
        context
            .codec
            .encode(&FursRequest::Echo(message.to_string()), "EchoRequest")
    })?;
    Ok(Prepared {
        request: HttpRequest::post_json(context.environment.echo_url.clone(), body),
        span,
        sealed: false,
        interpret: interpret_echo,
    })
}

/// Fill in a missing header and protective mark, then seal.
pub fn prepare_invoice(
    context: &ExchangeContext,
    mut request: InvoiceRequest,
) -> Result<Prepared<Uuid>, FursError> {
    let message_id = request.header.get_or_insert_with(FursHeader::new).message_id;
    let span = tracing::info_span!("furs_exchange", operation = "invoice", %message_id);
    let body = span.in_scope(|| -> Result<Vec<u8>, FursError> {
        request.invoice.ensure_protected_id(&context.credential)?;
        context.seal(&FursRequest::Invoice(request))
    })?;
    Ok(Prepared {
        request: HttpRequest::post_json(context.environment.invoices_url.clone(), body),
        span,
        sealed: true,
        interpret: interpret_invoice,
    })
}

/// Fill in a missing header, then seal.
pub fn prepare_premise(
    context: &ExchangeContext,
    mut request: BusinessPremiseRequest,
) -> Result<Prepared<()>, FursError> {
    let message_id = request.header.get_or_insert_with(FursHeader::new).message_id;
    let span = tracing::info_span!("furs_exchange", operation = "premise", %message_id);
    let body = span.in_scope(|| context.seal(&FursRequest::BusinessPremise(request)))?;
    Ok(Prepared {
        request: HttpRequest::post_json(context.environment.premises_url.clone(), body),
        span,
        sealed: true,
        interpret: interpret_premise,
    })
}

fn interpret_echo(response: FursResponse) -> Result<String, FursError> {
    match response {
        FursResponse::Echo(message) => Ok(message),
        other => Err(unexpected("EchoResponse", &other)),
    }
}

fn interpret_invoice(response: FursResponse) -> Result<Uuid, FursError> {
    let FursResponse::Invoice(response) = response else {
        return Err(unexpected("InvoiceResponse", &response));
    };
    if let Some(eor) = response.unique_invoice_id {
        tracing::info!(%eor, "invoice accepted");
        return Ok(eor);
    }
    match response.error {
        Some(error) => Err(rejected(error, INVOICE_DEFAULT_MESSAGE)),
        None => Err(ProtocolError::Incomplete("Missing both uniqueInvoiceId and error in response").into()),
    }
}

fn interpret_premise(response: FursResponse) -> Result<(), FursError> {
    let FursResponse::BusinessPremise(response) = response else {
        return Err(unexpected("BusinessPremiseResponse", &response));
    };
    match response.error {
        Some(error) => Err(rejected(error, PREMISE_DEFAULT_MESSAGE)),
        None => {
            tracing::info!("business premise registered");
            Ok(())
        }
    }
}

fn unexpected(expected: &'static str, received: &FursResponse) -> FursError {
    ProtocolError::UnexpectedKind {
        expected,
        received: received.kind(),
    }
    .into()
}

fn rejected(error: ServerError, default_message: &str) -> FursError {
    let error = DomainError {
        code: error.code.unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
        message: error.message.unwrap_or_else(|| default_message.to_string()),
    };
    tracing::warn!(code = %error.code, message = %error.message, "request rejected");
    error.into()
}
