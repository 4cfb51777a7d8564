//! # Request and Response Wrappers
//!
//! Every document travels as a JSON object with exactly one key naming its
//! kind: `{"EchoRequest": "..."}`, `{"InvoiceRequest": {...}}`,
//! `{"InvoiceResponse": {...}}`. Requests map onto [`FursRequest`] and
//! responses onto [`FursResponse`]; a response carrying none of the known
//! keys, or more than one, does not decode.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::header::ResponseHeader;
use crate::dto::invoice::InvoiceRequest;
use crate::dto::premise::BusinessPremiseRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FursRequest {
    #[serde(rename = "EchoRequest")]
    Echo(String),
    #[serde(rename = "InvoiceRequest")]
    Invoice(InvoiceRequest),
    #[serde(rename = "BusinessPremiseRequest")]
    BusinessPremise(BusinessPremiseRequest),
}

impl FursRequest {
    /// The wire key of this request.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Echo(_) => "EchoRequest",
            Self::Invoice(_) => "InvoiceRequest",
            Self::BusinessPremise(_) => "BusinessPremiseRequest",
        }
    }
}

/// The `Error` object of a rejected request. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerError {
    #[serde(rename = "ErrorCode", default)]
    pub code: Option<String>,
    #[serde(rename = "ErrorMessage", default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InvoiceResponse {
    #[serde(rename = "Header", default)]
    pub header: Option<ResponseHeader>,
    /// The EOR assigned to an accepted invoice.
    #[serde(rename = "UniqueInvoiceID", default)]
    pub unique_invoice_id: Option<Uuid>,
    #[serde(rename = "Error", default)]
    pub error: Option<ServerError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BusinessPremiseResponse {
    #[serde(rename = "Header", default)]
    pub header: Option<ResponseHeader>,
    #[serde(rename = "Error", default)]
    pub error: Option<ServerError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawResponse")]
pub enum FursResponse {
    Echo(String),
    Invoice(InvoiceResponse),
    BusinessPremise(BusinessPremiseResponse),
}

impl FursResponse {
    /// The wire key of this response.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Echo(_) => "EchoResponse",
            Self::Invoice(_) => "InvoiceResponse",
            Self::BusinessPremise(_) => "BusinessPremiseResponse",
        }
    }
}

/// Unknown keys are ignored; the known ones are mutually exclusive.
#[derive(Deserialize)]
struct RawResponse {
    #[serde(rename = "EchoResponse", default)]
    echo: Option<String>,
    #[serde(rename = "InvoiceResponse", default)]
    invoice: Option<InvoiceResponse>,
    #[serde(rename = "BusinessPremiseResponse", default)]
    business_premise: Option<BusinessPremiseResponse>,
}

impl TryFrom<RawResponse> for FursResponse {
    type Error = String;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        match (raw.echo, raw.invoice, raw.business_premise) {
            (Some(echo), None, None) => Ok(Self::Echo(echo)),
            (None, Some(invoice), None) => Ok(Self::Invoice(invoice)),
            (None, None, Some(premise)) => Ok(Self::BusinessPremise(premise)),
            (None, None, None) => Err(
                "response carries none of EchoResponse, InvoiceResponse, BusinessPremiseResponse"
                    .to_string(),
            ),
            _ => Err("response carries more than one message".to_string()),
        }
    }
}
