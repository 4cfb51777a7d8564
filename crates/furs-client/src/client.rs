//! Blocking FURS client.

use uuid::Uuid;

use crate::dto::{BusinessPremiseRequest, InvoiceRequest};
use crate::error::FursError;
use crate::exchange::{self, ExchangeContext, Prepared};
use crate::transport::Transport;

/// Blocking client: each call returns once the server has answered (or the
/// transport has given up).
///
/// Holds only shared immutable state, so clones are cheap and may be used
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct FursClient<T> {
    context: ExchangeContext,
    transport: T,
}

impl<T: Transport> FursClient<T> {
    pub fn new(context: ExchangeContext, transport: T) -> Self {
        Self { context, transport }
    }

    pub fn context(&self) -> &ExchangeContext {
        &self.context
    }

    /// Connectivity check. Returns the server's echo of `message`.
    pub fn echo(&self, message: &str) -> Result<String, FursError> {
        self.run(exchange::prepare_echo(&self.context, message)?)
    }

    /// Register (or close) a business premise.
    pub fn register_business_premise(&self, request: BusinessPremiseRequest) -> Result<(), FursError> {
        self.run(exchange::prepare_premise(&self.context, request)?)
    }

    /// Submit an invoice and return its EOR (`UniqueInvoiceID`).
    pub fn submit_invoice(&self, request: InvoiceRequest) -> Result<Uuid, FursError> {
        self.run(exchange::prepare_invoice(&self.context, request)?)
    }

    fn run<R>(&self, prepared: Prepared<R>) -> Result<R, FursError> {
        let body = {
            let _entered = prepared.span().enter();
            self.transport.execute(&prepared.request)?
        };
        prepared.complete(&self.context, &body)
    }
}
