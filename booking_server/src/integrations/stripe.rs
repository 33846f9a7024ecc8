//! Stripe-style payment processor client.
//!
//! Outbound calls use the processor's form-encoded REST API with a bearer key and a bounded timeout. Webhook
//! verification operates on the exact raw request body: the `Stripe-Signature` header carries
//! `t=<unix-ts>,v1=<hex(hmac_sha256(secret, "{t}.{body}"))>`, and signatures older than the tolerance window are
//! rejected to blunt replays.
use std::{collections::HashMap, sync::Arc};

use booking_engine::{
    db_types::BookingId,
    traits::{
        CustomerRef, NewPaymentRequest, PaymentEvent, PaymentProcessor, PaymentRequest, PaymentRequestDetails,
        ProcessorError,
    },
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use sha2::Sha256;

use crate::{config::StripeConfig, errors::ServerError};

type HmacSha256 = Hmac<Sha256>;

/// Signatures whose timestamp deviates from the server clock by more than this are rejected.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct StripeClient {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Result<Self, ServerError> {
        let mut headers = HeaderMap::with_capacity(1);
        let mut val = HeaderValue::from_str(&format!("Bearer {}", config.secret_key.reveal()))
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, ProcessorError> {
        let url = self.url(path);
        trace!("💳️ POST {url}");
        let response = self.client.post(url).form(form).send().await.map_err(|e| {
            warn!("💳️ Processor request failed. {e}");
            ProcessorError::Upstream(e.to_string())
        })?;
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| ProcessorError::MalformedResponse(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(ProcessorError::Upstream(format!("HTTP {status}: {message}")))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, ProcessorError> {
        let url = self.url(path);
        trace!("💳️ GET {url}");
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| ProcessorError::Upstream(e.to_string()))?;
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| ProcessorError::MalformedResponse(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(ProcessorError::Upstream(format!("HTTP {status}: {message}")))
        }
    }
}

impl PaymentProcessor for StripeClient {
    async fn create_customer(
        &self,
        email: &str,
        name: &str,
        booking_id: &BookingId,
    ) -> Result<CustomerRef, ProcessorError> {
        #[derive(Deserialize)]
        struct CustomerResponse {
            id: String,
        }
        let form = vec![
            ("email".to_string(), email.to_string()),
            ("name".to_string(), name.to_string()),
            ("metadata[booking_id]".to_string(), booking_id.to_string()),
        ];
        let customer: CustomerResponse = self.post_form("/customers", &form).await?;
        debug!("💳️ Created processor customer {} for booking [{booking_id}]", customer.id);
        Ok(CustomerRef(customer.id))
    }

    async fn create_payment_request(&self, request: NewPaymentRequest<'_>) -> Result<PaymentRequest, ProcessorError> {
        #[derive(Deserialize)]
        struct PaymentIntentResponse {
            id: String,
            client_secret: String,
        }
        let mut form = vec![
            ("amount".to_string(), request.amount.value().to_string()),
            ("currency".to_string(), request.currency.to_string()),
            ("customer".to_string(), request.customer_ref.to_string()),
            ("metadata[booking_id]".to_string(), request.booking_id.to_string()),
            ("metadata[purpose]".to_string(), request.purpose.to_string()),
        ];
        for (key, value) in &request.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }
        let intent: PaymentIntentResponse = self.post_form("/payment_intents", &form).await?;
        debug!("💳️ Created payment request {} ({}) for booking [{}]", intent.id, request.purpose, request.booking_id);
        Ok(PaymentRequest { id: intent.id, client_secret: intent.client_secret })
    }

    async fn fetch_payment_request(&self, payment_ref: &str) -> Result<PaymentRequestDetails, ProcessorError> {
        let path = format!("/payment_intents/{payment_ref}");
        let intent: Value = self.get_json(&path, &[("expand[]", "latest_charge")]).await?;
        let id = intent["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProcessorError::MalformedResponse("payment request response has no id".to_string()))?;
        let receipt_url = intent["latest_charge"]["receipt_url"].as_str().map(str::to_string);
        Ok(PaymentRequestDetails { id, receipt_url })
    }

    fn verify_webhook(&self, raw_body: &[u8], signature_header: Option<&str>) -> Result<PaymentEvent, ProcessorError> {
        let secret = self.config.webhook_secret.reveal();
        if secret.is_empty() {
            return Err(ProcessorError::Authentication("No webhook secret is configured".to_string()));
        }
        let header =
            signature_header.ok_or_else(|| ProcessorError::Authentication("Missing signature header".to_string()))?;
        let (timestamp, signature) = parse_signature_header(header)?;
        let age = (Utc::now().timestamp() - timestamp).abs();
        if age > SIGNATURE_TOLERANCE_SECS {
            return Err(ProcessorError::Authentication(format!("Signature timestamp is {age}s old")));
        }
        let signature = hex::decode(&signature)
            .map_err(|_| ProcessorError::Authentication("Signature is not valid hex".to_string()))?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(raw_body);
        // Constant-time comparison; a string compare of the digests would leak a timing oracle.
        mac.verify_slice(&signature).map_err(|_| ProcessorError::Authentication("Signature mismatch".to_string()))?;
        parse_event(raw_body)
    }
}

fn parse_signature_header(header: &str) -> Result<(i64, String), ProcessorError> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = v.parse::<i64>().ok(),
            Some(("v1", v)) => signature = Some(v.to_string()),
            _ => {},
        }
    }
    match (timestamp, signature) {
        (Some(t), Some(s)) => Ok((t, s)),
        _ => Err(ProcessorError::Authentication("Malformed signature header".to_string())),
    }
}

/// Computes the hex signature over `"{timestamp}.{body}"`.
pub fn sign_payload(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn parse_event(raw_body: &[u8]) -> Result<PaymentEvent, ProcessorError> {
    #[derive(Deserialize)]
    struct Envelope {
        id: String,
        #[serde(rename = "type")]
        event_type: String,
        data: EventData,
    }
    #[derive(Deserialize)]
    struct EventData {
        object: ChargeObject,
    }
    #[derive(Deserialize)]
    struct ChargeObject {
        #[serde(default)]
        payment_intent: Option<String>,
        #[serde(default)]
        receipt_url: Option<String>,
        #[serde(default)]
        metadata: HashMap<String, String>,
    }
    let envelope: Envelope =
        serde_json::from_slice(raw_body).map_err(|e| ProcessorError::MalformedResponse(e.to_string()))?;
    let charge = envelope.data.object;
    Ok(PaymentEvent {
        event_id: envelope.id,
        event_type: envelope.event_type,
        payment_request_id: charge.payment_intent,
        booking_id: charge.metadata.get("booking_id").cloned().map(BookingId),
        purpose: charge.metadata.get("purpose").cloned(),
        receipt_url: charge.receipt_url,
    })
}
