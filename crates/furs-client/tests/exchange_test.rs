//! # End-to-End Exchange Tests
//!
//! Drives both clients through a stub transport that plays the server: it
//! verifies the sealed request with the client certificate and answers with
//! envelopes signed by the server fixture key. No network.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;
use furs_client::dto::{
    BpIdentifier, BusinessPremise, BusinessPremiseRequest, FursHeader, Invoice, InvoiceIdentifier,
    InvoiceRequest, NumberingStructure, PremiseType, TaxesPerSeller, Vat,
};
use furs_client::{
    AsyncFursClient, BlockingTransportAdapter, ExchangeContext, FursClient, FursConfig, FursError,
    HttpRequest, ProtocolError, Transport, TransportError,
};
use furs_core::{BusinessPremiseId, CivilDateTime, Decimal, ProtectedId, TaxNumber};
use furs_crypto::envelope::{self, TokenEnvelope};
use furs_crypto::{CertificateIdentity, Credential, TrustAnchor};
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use uuid::Uuid;

const CLIENT_BUNDLE: &str = include_str!("../../furs-crypto/tests/fixtures/client-bundle.pem");
const CLIENT_CERT: &str = include_str!("../../furs-crypto/tests/fixtures/client.crt.pem");
const SERVER_CERT: &str = include_str!("../../furs-crypto/tests/fixtures/server.crt.pem");
const SERVER_KEY: &str = include_str!("../../furs-crypto/tests/fixtures/server.key.pem");
const SERVER_TOKEN: &str = include_str!("../../furs-crypto/tests/fixtures/server-signed.token");

/// ZOI of [`invoice`] under the client fixture key, computed with OpenSSL.
const EXPECTED_ZOI: &str = "b371e65cdbdb73f821798d3e452df8fc";

// ── Fixtures ─────────────────────────────────────────────────────────────

fn client_credential() -> Arc<Credential> {
    Arc::new(
        Credential::from_pem(
            CLIENT_BUNDLE.as_bytes(),
            SERVER_CERT.as_bytes(),
            "DavPotRacTEST",
        )
        .expect("client credential"),
    )
}

fn server_credential() -> Credential {
    let key = RsaPrivateKey::from_pkcs8_pem(SERVER_KEY).expect("server key");
    let identity = CertificateIdentity::new(
        "CN=blagajne-test.fu.gov.si,O=Test Tax Administration,C=SI",
        "CN=blagajne-test.fu.gov.si,O=Test Tax Administration,C=SI",
        "1",
    )
    .expect("identity");
    let anchor = TrustAnchor::from_certificate_pem(CLIENT_CERT.as_bytes()).expect("anchor");
    Credential::new(key, identity, anchor)
}

fn context() -> ExchangeContext {
    let config = FursConfig::local_mock("http://127.0.0.1:9").expect("config");
    ExchangeContext::from_config(&config, client_credential())
}

fn invoice() -> Invoice {
    Invoice::builder()
        .tax_number(TaxNumber::new(10_000_000).unwrap())
        .issue_date_time(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        )
        .numbering_structure(NumberingStructure::PerDevice)
        .invoice_identifier(InvoiceIdentifier::new("BP1", "DEV1", "1").unwrap())
        .try_invoice_amount(Decimal::new(10_000, 2))
        .unwrap()
        .try_payment_amount(Decimal::new(10_000, 2))
        .unwrap()
        .taxes_per_seller(TaxesPerSeller::new().with_vat(
            Vat::new(
                Decimal::new(2_200, 2),
                Decimal::new(8_197, 2),
                Decimal::new(1_803, 2),
            )
            .unwrap(),
        ))
        .build()
        .expect("invoice")
}

fn premise() -> BusinessPremise {
    BusinessPremise::new(
        TaxNumber::new(10_000_000).unwrap(),
        BusinessPremiseId::new("STALL7").unwrap(),
        BpIdentifier::Mobile(PremiseType::MovableObject),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
}

// ── Stub server ──────────────────────────────────────────────────────────

type Responder = dyn Fn(&HttpRequest) -> Result<Vec<u8>, TransportError> + Send + Sync;

struct StubServer {
    respond: Box<Responder>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl StubServer {
    fn new(
        respond: impl Fn(&HttpRequest) -> Result<Vec<u8>, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Answers every request with `payload` sealed by the server key.
    fn sealing(payload: Value) -> Arc<Self> {
        Self::new(move |_| Ok(sealed_by(&server_credential(), &payload)))
    }

    fn last_request(&self) -> HttpRequest {
        self.seen
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("a request was sent")
    }
}

impl Transport for StubServer {
    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}

fn sealed_by(credential: &Credential, payload: &Value) -> Vec<u8> {
    let token = envelope::build(&serde_json::to_vec(payload).unwrap(), credential).unwrap();
    serde_json::to_vec(&json!({ "token": token })).unwrap()
}

/// What the server would see after verifying the client's envelope.
fn opened(request: &HttpRequest) -> Value {
    let wrapper: TokenEnvelope = serde_json::from_slice(&request.body).expect("token wrapper");
    let anchor = TrustAnchor::from_certificate_pem(CLIENT_CERT.as_bytes()).unwrap();
    let payload = envelope::parse_and_verify(&wrapper.token, &anchor).expect("client signature");
    serde_json::from_slice(&payload).expect("payload JSON")
}

fn accepted(eor: Uuid) -> Value {
    json!({ "InvoiceResponse": { "UniqueInvoiceID": eor.to_string() } })
}

// ── Invoice submission ───────────────────────────────────────────────────

#[test]
fn submit_invoice_returns_the_eor() {
    let eor = Uuid::new_v4();
    let stub = StubServer::sealing(accepted(eor));
    let client = FursClient::new(context(), Arc::clone(&stub));

    let returned = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .expect("accepted");
    assert_eq!(returned, eor);

    let request = stub.last_request();
    assert_eq!(
        request.url.as_str(),
        "http://127.0.0.1:9/cash_registers/invoices"
    );
    let sent = opened(&request);
    let body = &sent["InvoiceRequest"];
    assert!(body["Header"]["MessageID"].is_string());
    assert!(body["Header"]["DateTime"].is_string());
    assert_eq!(body["Invoice"]["ProtectedID"], json!(EXPECTED_ZOI));
    assert_eq!(body["Invoice"]["TaxNumber"], json!(10_000_000));
}

#[tokio::test]
async fn async_submit_invoice_returns_the_eor() {
    let eor = Uuid::new_v4();
    let stub = StubServer::sealing(accepted(eor));
    let client = AsyncFursClient::new(context(), BlockingTransportAdapter::new(Arc::clone(&stub)));

    let returned = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .await
        .expect("accepted");
    assert_eq!(returned, eor);
    assert_eq!(
        opened(&stub.last_request())["InvoiceRequest"]["Invoice"]["ProtectedID"],
        json!(EXPECTED_ZOI)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn many_async_submissions_in_flight() {
    let eor = Uuid::new_v4();
    let stub = StubServer::sealing(accepted(eor));
    let client = AsyncFursClient::new(context(), BlockingTransportAdapter::new(Arc::clone(&stub)));

    let calls = (0..8).map(|_| client.submit_invoice(InvoiceRequest::new(invoice())));
    let results = futures::future::join_all(calls).await;

    assert!(results.into_iter().all(|r| r.expect("accepted") == eor));
    assert_eq!(stub.seen.lock().unwrap().len(), 8);
}

#[test]
fn response_token_signed_independently_verifies() {
    let stub = StubServer::new(|_| {
        Ok(serde_json::to_vec(&json!({ "token": SERVER_TOKEN.trim() })).unwrap())
    });
    let client = FursClient::new(context(), stub);

    let eor = client.submit_invoice(InvoiceRequest::new(invoice())).unwrap();
    assert_eq!(eor.to_string(), "7a1d2c3e-4b5f-4a6b-8c7d-9e0f1a2b3c4d");
}

#[test]
fn caller_header_and_protected_id_are_kept() {
    let header = FursHeader::with(
        Uuid::parse_str("4a2c5e1f-0b3d-4c6e-8f7a-1b2c3d4e5f60").unwrap(),
        CivilDateTime::parse("2024-03-15T10:00:05").unwrap(),
    );
    let restored = ProtectedId::new("0123456789abcdef0123456789abcdef").unwrap();
    let stub = StubServer::sealing(accepted(Uuid::new_v4()));
    let client = FursClient::new(context(), Arc::clone(&stub));

    client
        .submit_invoice(
            InvoiceRequest::new(invoice().with_protected_id(restored)).with_header(header),
        )
        .unwrap();

    let sent = opened(&stub.last_request());
    assert_eq!(
        sent["InvoiceRequest"]["Header"],
        json!({
            "MessageID": "4a2c5e1f-0b3d-4c6e-8f7a-1b2c3d4e5f60",
            "DateTime": "2024-03-15T10:00:05"
        })
    );
    assert_eq!(
        sent["InvoiceRequest"]["Invoice"]["ProtectedID"],
        json!("0123456789abcdef0123456789abcdef")
    );
}

#[test]
fn response_without_eor_or_error_is_a_protocol_error() {
    let client = FursClient::new(context(), StubServer::sealing(json!({ "InvoiceResponse": {} })));

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .unwrap_err();
    assert!(matches!(
        err,
        FursError::Protocol(ProtocolError::Incomplete(_))
    ));
    assert_eq!(err.code(), "C002");
}

#[test]
fn server_rejection_carries_its_code() {
    let client = FursClient::new(
        context(),
        StubServer::sealing(json!({
            "InvoiceResponse": {
                "Error": { "ErrorCode": "S002", "ErrorMessage": "Invalid tax number" }
            }
        })),
    );

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .unwrap_err();
    assert_eq!(err.code(), "S002");
    assert_eq!(
        err.to_string(),
        "server rejected the request: S002 - Invalid tax number"
    );
}

#[test]
fn rejection_without_code_gets_the_placeholder() {
    let client = FursClient::new(
        context(),
        StubServer::sealing(json!({
            "InvoiceResponse": { "Error": { "ErrorMessage": "Try later" } }
        })),
    );

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .unwrap_err();
    assert_eq!(err.code(), "????");
    assert!(err.to_string().ends_with("???? - Try later"));
}

#[test]
fn response_signed_with_another_key_is_a_security_error() {
    let impostor = client_credential();
    let client = FursClient::new(
        context(),
        StubServer::new(move |_| Ok(sealed_by(&impostor, &accepted(Uuid::new_v4())))),
    );

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .unwrap_err();
    assert!(matches!(err, FursError::Security(_)), "{err:?}");
    assert_eq!(err.code(), "C003");
}

#[test]
fn tampered_response_payload_is_a_security_error() {
    let stub = StubServer::new(|_| {
        let genuine = sealed_by(&server_credential(), &accepted(Uuid::new_v4()));
        let wrapper: TokenEnvelope = serde_json::from_slice(&genuine).unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&accepted(Uuid::nil())).unwrap());
        let parts: Vec<&str> = wrapper.token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        Ok(serde_json::to_vec(&json!({ "token": forged })).unwrap())
    });
    let client = FursClient::new(context(), stub);

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .unwrap_err();
    assert!(matches!(err, FursError::Security(_)), "{err:?}");
}

#[test]
fn unsealed_response_to_a_sealed_request_is_a_protocol_error() {
    let client = FursClient::new(
        context(),
        StubServer::new(|_| Ok(serde_json::to_vec(&accepted(Uuid::new_v4())).unwrap())),
    );

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .unwrap_err();
    assert!(matches!(
        err,
        FursError::Protocol(ProtocolError::Json { context: "token wrapper", .. })
    ));
}

#[test]
fn transport_failures_pass_through() {
    let client = FursClient::new(
        context(),
        StubServer::new(|request| {
            Err(TransportError::Status {
                url: request.url.to_string(),
                status: 503,
                body: "maintenance".into(),
            })
        }),
    );

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .unwrap_err();
    assert!(matches!(
        err,
        FursError::Transport(TransportError::Status { status: 503, .. })
    ));
    assert_eq!(err.code(), "C004");
}

#[tokio::test]
async fn async_failures_resolve_the_future() {
    let client = AsyncFursClient::new(
        context(),
        BlockingTransportAdapter::new(StubServer::sealing(json!({ "EchoResponse": "?" }))),
    );

    let err = client
        .submit_invoice(InvoiceRequest::new(invoice()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FursError::Protocol(ProtocolError::UnexpectedKind {
            expected: "InvoiceResponse",
            received: "EchoResponse"
        })
    ));
}

// ── Echo ─────────────────────────────────────────────────────────────────

#[test]
fn echo_is_a_plain_exchange() {
    let stub = StubServer::new(|request| {
        let sent: Value = serde_json::from_slice(&request.body).unwrap();
        Ok(serde_json::to_vec(&json!({ "EchoResponse": sent["EchoRequest"] })).unwrap())
    });
    let client = FursClient::new(context(), Arc::clone(&stub));

    assert_eq!(client.echo("ping").unwrap(), "ping");

    let request = stub.last_request();
    assert_eq!(request.body, br#"{"EchoRequest":"ping"}"#);
    assert_eq!(
        request.url.as_str(),
        "http://127.0.0.1:9/cash_registers/echo"
    );
    assert!(request
        .headers
        .contains(&("Content-Type".into(), "application/json; charset=UTF-8".into())));
}

#[tokio::test]
async fn async_echo() {
    let client = AsyncFursClient::new(
        context(),
        BlockingTransportAdapter::new(StubServer::new(|_| {
            Ok(br#"{"EchoResponse":"pong"}"#.to_vec())
        })),
    );
    assert_eq!(client.echo("pong").await.unwrap(), "pong");
}

#[test]
fn echo_without_response_is_a_protocol_error() {
    let client = FursClient::new(context(), StubServer::new(|_| Ok(b"{}".to_vec())));
    let err = client.echo("ping").unwrap_err();
    assert_eq!(err.code(), "C002");
}

// ── Business premise ─────────────────────────────────────────────────────

#[test]
fn register_premise_succeeds_without_error() {
    let stub = StubServer::sealing(json!({
        "BusinessPremiseResponse": {
            "Header": { "MessageID": "4a2c5e1f-0b3d-4c6e-8f7a-1b2c3d4e5f60", "DateTime": "2024-03-15T10:00:01" }
        }
    }));
    let client = FursClient::new(context(), Arc::clone(&stub));

    client
        .register_business_premise(BusinessPremiseRequest::new(premise()))
        .expect("registered");

    let request = stub.last_request();
    assert_eq!(
        request.url.as_str(),
        "http://127.0.0.1:9/cash_registers/invoices/register"
    );
    let sent = opened(&request);
    assert_eq!(
        sent["BusinessPremiseRequest"]["BusinessPremise"]["BPIdentifier"],
        json!({ "PremiseType": "A" })
    );
    assert!(sent["BusinessPremiseRequest"]["Header"]["MessageID"].is_string());
}

#[test]
fn premise_rejection_without_message_gets_the_default() {
    let client = FursClient::new(
        context(),
        StubServer::sealing(json!({
            "BusinessPremiseResponse": { "Error": { "ErrorCode": "S100" } }
        })),
    );

    let err = client
        .register_business_premise(BusinessPremiseRequest::new(premise().closed()))
        .unwrap_err();
    assert_eq!(err.code(), "S100");
    assert_eq!(
        err.to_string(),
        "server rejected the request: S100 - Unknown error while registering business premise"
    );
}

#[test]
fn premise_response_missing_is_a_protocol_error() {
    let client = FursClient::new(context(), StubServer::sealing(json!({ "EchoResponse": "x" })));
    let err = client
        .register_business_premise(BusinessPremiseRequest::new(premise()))
        .unwrap_err();
    assert!(matches!(err, FursError::Protocol(_)));
}
