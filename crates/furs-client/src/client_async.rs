//! Non-blocking FURS client.
//!
//! Same steps as [`crate::FursClient`]; only the round trip is awaited. A
//! failure at any step resolves the returned future with that error. In
//! order: transport, then decoding and verification, then the server's
//! verdict.

use tracing::Instrument;
use uuid::Uuid;

use crate::dto::{BusinessPremiseRequest, InvoiceRequest};
use crate::error::FursError;
use crate::exchange::{self, ExchangeContext, Prepared};
use crate::transport::AsyncTransport;

#[derive(Debug, Clone)]
pub struct AsyncFursClient<T> {
    context: ExchangeContext,
    transport: T,
}

impl<T: AsyncTransport> AsyncFursClient<T> {
    pub fn new(context: ExchangeContext, transport: T) -> Self {
        Self { context, transport }
    }

    pub fn context(&self) -> &ExchangeContext {
        &self.context
    }

    pub async fn echo(&self, message: &str) -> Result<String, FursError> {
        self.run(exchange::prepare_echo(&self.context, message)?).await
    }

    pub async fn register_business_premise(
        &self,
        request: BusinessPremiseRequest,
    ) -> Result<(), FursError> {
        self.run(exchange::prepare_premise(&self.context, request)?).await
    }

    pub async fn submit_invoice(&self, request: InvoiceRequest) -> Result<Uuid, FursError> {
        self.run(exchange::prepare_invoice(&self.context, request)?).await
    }

    async fn run<R>(&self, prepared: Prepared<R>) -> Result<R, FursError> {
        let body = self
            .transport
            .execute(&prepared.request)
            .instrument(prepared.span().clone())
            .await?;
        prepared.complete(&self.context, &body)
    }
}
