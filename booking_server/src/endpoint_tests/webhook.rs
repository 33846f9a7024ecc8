use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use booking_engine::{
    db_types::{ContractStatus, PaymentStatus},
    traits::{PaymentEvent, ProcessorError, TransitionResult},
    ContractApi,
    WebhookApi,
};
use chrono::{TimeZone, Utc};

use super::{
    helpers::{booking_fixture, BOOKING_ID},
    mocks::{MockBookingDb, MockProcessor, MockRenderer},
};
use crate::routes::{PaymentWebhookRoute, SIGNATURE_HEADER};

#[actix_web::test]
async fn unsigned_webhook_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = webhook_request(None, configure_bad_signature).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("signature verification failed"), "unexpected body: {body}");
}

#[actix_web::test]
async fn unhandled_event_type_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let (status, body) = webhook_request(Some("t=1,v1=aa"), configure_refund_event).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn deposit_confirmation_transitions_and_drafts() {
    let _ = env_logger::try_init().ok();
    let (status, body) = webhook_request(Some("t=1,v1=aa"), configure_deposit_event).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn event_for_unknown_booking_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = webhook_request(Some("t=1,v1=aa"), configure_unknown_booking).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("does not exist"), "unexpected body: {body}");
}

#[actix_web::test]
async fn final_payment_confirmation_marks_booking_paid() {
    let _ = env_logger::try_init().ok();
    let (status, body) = webhook_request(Some("t=1,v1=aa"), configure_final_event).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

async fn webhook_request(signature: Option<&str>, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri("/webhook/payments").set_payload(r#"{"id":"evt_1"}"#);
    if let Some(sig) = signature {
        req = req.insert_header((SIGNATURE_HEADER, sig));
    }
    let service = test::init_service(App::new().configure(configure)).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let Ok(bytes) = res.into_body().try_into_bytes() else { panic!("Response body was not ready") };
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn deposit_event() -> PaymentEvent {
    PaymentEvent {
        event_id: "evt_1".to_string(),
        event_type: "charge.succeeded".to_string(),
        payment_request_id: Some("pi_deposit123".to_string()),
        booking_id: Some(BOOKING_ID.parse().unwrap()),
        purpose: Some("deposit".to_string()),
        receipt_url: Some("https://pay.example.com/receipts/dep123".to_string()),
    }
}

fn register(cfg: &mut ServiceConfig, processor: MockProcessor, api: WebhookApi<MockBookingDb, MockRenderer>) {
    cfg.service(
        web::scope("/webhook").service(PaymentWebhookRoute::<MockBookingDb, MockProcessor, MockRenderer>::new()),
    )
    .app_data(web::Data::new(processor))
    .app_data(web::Data::new(api));
}

fn configure_bad_signature(cfg: &mut ServiceConfig) {
    let mut processor = MockProcessor::new();
    processor
        .expect_verify_webhook()
        .returning(|_, _| Err(ProcessorError::Authentication("No signature header was provided".to_string())));
    let api = WebhookApi::new(MockBookingDb::new(), ContractApi::new(MockBookingDb::new(), MockRenderer::new()));
    register(cfg, processor, api);
}

fn configure_refund_event(cfg: &mut ServiceConfig) {
    let mut processor = MockProcessor::new();
    processor.expect_verify_webhook().returning(|_, _| {
        let mut event = deposit_event();
        event.event_type = "charge.refunded".to_string();
        Ok(event)
    });
    // No store expectations: an unhandled event type must not touch the database.
    let api = WebhookApi::new(MockBookingDb::new(), ContractApi::new(MockBookingDb::new(), MockRenderer::new()));
    register(cfg, processor, api);
}

fn configure_deposit_event(cfg: &mut ServiceConfig) {
    let mut processor = MockProcessor::new();
    processor.expect_verify_webhook().returning(|_, _| Ok(deposit_event()));

    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(booking_fixture(PaymentStatus::Pending))));
    store
        .expect_mark_deposit_paid()
        .withf(|_, receipt| *receipt == Some("https://pay.example.com/receipts/dep123"))
        .returning(|_, _| {
            Ok(TransitionResult { booking: booking_fixture(PaymentStatus::DepositPaid), transitioned: true })
        });

    let mut contract_store = MockBookingDb::new();
    contract_store.expect_fetch_booking_by_id().returning(|_| Ok(Some(booking_fixture(PaymentStatus::DepositPaid))));
    contract_store.expect_set_contract_draft().returning(|_, url| {
        let mut booking = booking_fixture(PaymentStatus::DepositPaid);
        booking.contract_status = ContractStatus::Draft;
        booking.contract_draft_url = Some(url.to_string());
        booking.contract_created_at = Some(Utc.with_ymd_and_hms(2026, 1, 6, 10, 0, 0).unwrap());
        Ok(TransitionResult { booking, transitioned: true })
    });
    let mut renderer = MockRenderer::new();
    renderer.expect_render().returning(|_, _| Ok("https://venue.example.com/contracts/draft.txt".to_string()));

    let api = WebhookApi::new(store, ContractApi::new(contract_store, renderer));
    register(cfg, processor, api);
}

fn configure_unknown_booking(cfg: &mut ServiceConfig) {
    let mut processor = MockProcessor::new();
    processor.expect_verify_webhook().returning(|_, _| Ok(deposit_event()));
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(None));
    let api = WebhookApi::new(store, ContractApi::new(MockBookingDb::new(), MockRenderer::new()));
    register(cfg, processor, api);
}

fn configure_final_event(cfg: &mut ServiceConfig) {
    let mut processor = MockProcessor::new();
    processor.expect_verify_webhook().returning(|_, _| {
        let mut event = deposit_event();
        event.purpose = Some("final_payment".to_string());
        event.receipt_url = Some("https://pay.example.com/receipts/fin456".to_string());
        Ok(event)
    });
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(booking_fixture(PaymentStatus::DepositPaid))));
    store
        .expect_mark_paid()
        .withf(|_, receipt| *receipt == Some("https://pay.example.com/receipts/fin456"))
        .returning(|_, _| Ok(TransitionResult { booking: booking_fixture(PaymentStatus::Paid), transitioned: true }));
    let api = WebhookApi::new(store, ContractApi::new(MockBookingDb::new(), MockRenderer::new()));
    register(cfg, processor, api);
}
