use actix_web::{http::StatusCode, web, web::ServiceConfig};
use booking_engine::{
    db_types::{ContractStatus, PaymentStatus},
    traits::{TemplateKind, TransitionResult},
    ContractApi,
};
use chrono::{TimeZone, Utc};
use serde_json::json;

use super::{
    helpers::{booking_fixture, get_request, post_request, BOOKING_ID},
    mocks::{MockBookingDb, MockRenderer},
};
use crate::routes::{ContractDraftRoute, ContractStatusRoute, SignContractRoute};

const DRAFT_URL: &str = "https://venue.example.com/contracts/contract_a1b2c3d4e5f60718293a4b5c_draft.txt";
const SIGNED_URL: &str = "https://venue.example.com/contracts/contract_a1b2c3d4e5f60718293a4b5c_signed.txt";

#[actix_web::test]
async fn draft_is_created_for_deposit_paid_booking() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/bookings/contract/draft", json!({ "booking_id": BOOKING_ID }), configure_draft).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, format!(r#"{{"booking_id":"{BOOKING_ID}","draft_url":"{DRAFT_URL}","created":true}}"#));
}

#[actix_web::test]
async fn duplicate_draft_request_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/bookings/contract/draft", json!({ "booking_id": BOOKING_ID }), configure_existing_draft).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("already exists"), "unexpected body: {body}");
}

#[actix_web::test]
async fn signing_requires_a_draft() {
    let _ = env_logger::try_init().ok();
    let params = json!({ "booking_id": BOOKING_ID, "signer_name": "Alice Adams" });
    let (status, body) = post_request("/bookings/contract/sign", params, configure_no_draft).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("No draft contract"), "unexpected body: {body}");
}

#[actix_web::test]
async fn signing_a_drafted_contract_succeeds() {
    let _ = env_logger::try_init().ok();
    let params = json!({ "booking_id": BOOKING_ID, "signer_name": "Alice Adams" });
    let (status, body) = post_request("/bookings/contract/sign", params, configure_sign).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(SIGNED_URL), "unexpected body: {body}");
    assert!(body.contains(r#""status":"signed""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn blank_signer_name_is_rejected() {
    let _ = env_logger::try_init().ok();
    let params = json!({ "booking_id": BOOKING_ID, "signer_name": "   " });
    let (status, body) = post_request("/bookings/contract/sign", params, configure_no_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("signer_name"), "unexpected body: {body}");
}

#[actix_web::test]
async fn status_reports_contract_and_payment_position() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&format!("/bookings/contract/{BOOKING_ID}"), configure_existing_draft).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"draft""#), "unexpected body: {body}");
    assert!(body.contains(r#""payment_status":"deposit_paid""#), "unexpected body: {body}");
}

fn drafted_booking() -> booking_engine::db_types::Booking {
    let mut booking = booking_fixture(PaymentStatus::DepositPaid);
    booking.contract_status = ContractStatus::Draft;
    booking.contract_draft_url = Some(DRAFT_URL.to_string());
    booking.contract_created_at = Some(Utc.with_ymd_and_hms(2026, 1, 6, 10, 0, 0).unwrap());
    booking
}

fn configure_draft(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(booking_fixture(PaymentStatus::DepositPaid))));
    store
        .expect_set_contract_draft()
        .returning(|_, _| Ok(TransitionResult { booking: drafted_booking(), transitioned: true }));
    let mut renderer = MockRenderer::new();
    renderer
        .expect_render()
        .withf(|kind, _| *kind == TemplateKind::Draft)
        .returning(|_, _| Ok(DRAFT_URL.to_string()));
    let api = ContractApi::new(store, renderer);
    cfg.service(web::scope("/bookings").service(ContractDraftRoute::<MockBookingDb, MockRenderer>::new()))
        .app_data(web::Data::new(api));
}

fn configure_existing_draft(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(drafted_booking())));
    let api = ContractApi::new(store, MockRenderer::new());
    cfg.service(
        web::scope("/bookings")
            .service(ContractDraftRoute::<MockBookingDb, MockRenderer>::new())
            .service(ContractStatusRoute::<MockBookingDb, MockRenderer>::new()),
    )
    .app_data(web::Data::new(api));
}

fn configure_no_draft(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(booking_fixture(PaymentStatus::DepositPaid))));
    let api = ContractApi::new(store, MockRenderer::new());
    cfg.service(web::scope("/bookings").service(SignContractRoute::<MockBookingDb, MockRenderer>::new()))
        .app_data(web::Data::new(api));
}

fn configure_sign(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(drafted_booking())));
    store.expect_set_contract_signed().withf(|_, _, signer| signer == "Alice Adams").returning(|_, url, signer| {
        let mut booking = drafted_booking();
        booking.contract_status = ContractStatus::Signed;
        booking.contract_signed_url = Some(url.to_string());
        booking.contract_signer_name = Some(signer.to_string());
        booking.contract_signed_at = Some(Utc.with_ymd_and_hms(2026, 1, 7, 12, 0, 0).unwrap());
        Ok(booking)
    });
    let mut renderer = MockRenderer::new();
    renderer
        .expect_render()
        .withf(|kind, fields| *kind == TemplateKind::Signed && fields.signer_name == Some("Alice Adams"))
        .returning(|_, _| Ok(SIGNED_URL.to_string()));
    let api = ContractApi::new(store, renderer);
    cfg.service(web::scope("/bookings").service(SignContractRoute::<MockBookingDb, MockRenderer>::new()))
        .app_data(web::Data::new(api));
}

fn configure_no_calls(cfg: &mut ServiceConfig) {
    let api = ContractApi::new(MockBookingDb::new(), MockRenderer::new());
    cfg.service(web::scope("/bookings").service(SignContractRoute::<MockBookingDb, MockRenderer>::new()))
        .app_data(web::Data::new(api));
}
