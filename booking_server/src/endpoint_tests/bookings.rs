use actix_web::{http::StatusCode, web, web::ServiceConfig};
use booking_engine::{
    db_types::PaymentStatus,
    traits::{CustomerRef, PaymentRequest},
    BookingApi,
    PaymentFlowApi,
};
use serde_json::json;

use super::{
    helpers::{booking_fixture, get_request, post_raw_request, post_request, BOOKING_ID},
    mocks::{MockBookingDb, MockProcessor},
};
use crate::routes::{CreateBookingRoute, FinalPaymentRoute, GetReceiptsRoute, MyBookingsRoute, SearchBookingsRoute};

#[actix_web::test]
async fn create_booking_returns_deposit_handle() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "customer_name": "Alice Adams",
        "customer_email": "alice@example.com",
        "event_date": "2026-06-20T16:00:00Z",
        "hall": "Rose Hall",
        "package": "gold",
        "guests": 120,
        "total_price": 1000.0
    });
    let (status, body) = post_request("/bookings", body, configure_create).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        format!(r#"{{"booking_id":"{BOOKING_ID}","client_secret":"pi_deposit123_secret_xyz","deposit_amount":300.0}}"#)
    );
}

#[actix_web::test]
async fn create_booking_rejects_invalid_input() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "customer_name": "Alice Adams",
        "customer_email": "alice@example.com",
        "event_date": "2026-06-20T16:00:00Z",
        "hall": "Rose Hall",
        "package": "gold",
        "guests": 120,
        "total_price": 0.0
    });
    // The mocks carry no expectations: validation must fail before any store or processor call.
    let (status, body) = post_request("/bookings", body, configure_no_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("total_price"), "unexpected body: {body}");
}

#[actix_web::test]
async fn malformed_request_body_gets_a_json_error() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_raw_request("/bookings", "{not json", configure_no_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body"#), "unexpected body: {body}");
}

#[actix_web::test]
async fn my_bookings_filters_by_email() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/bookings/me?email=alice@example.com", configure_queries).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(BOOKING_ID), "unexpected body: {body}");
}

#[actix_web::test]
async fn admin_search_passes_filters_through() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/bookings/admin?status=paid&hall=Rose%20Hall", configure_admin_search).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""payment_status":"paid""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn final_payment_collects_remaining_balance() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/bookings/final-payment", json!({ "booking_id": BOOKING_ID }), configure_final_payment).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""amount":700.0"#), "unexpected body: {body}");
    assert!(body.contains("pi_final456_secret_xyz"), "unexpected body: {body}");
}

#[actix_web::test]
async fn final_payment_requires_deposit_first() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/bookings/final-payment", json!({ "booking_id": BOOKING_ID }), configure_pending_booking).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Deposit must be paid"), "unexpected body: {body}");
}

#[actix_web::test]
async fn receipts_for_unknown_booking_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/bookings/doesnotexist/receipts", configure_missing_booking).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("does not exist"), "unexpected body: {body}");
}

#[actix_web::test]
async fn receipts_report_includes_the_payment_position() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&format!("/bookings/{BOOKING_ID}/receipts"), configure_queries).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        format!(
            r#"{{"booking_id":"{BOOKING_ID}","payment_status":"deposit_paid","total_price":1000.0,"deposit_amount":300.0,"currency":"usd","receipts":{{"deposit":"https://pay.example.com/receipts/dep123"}}}}"#
        )
    );
}

fn configure_create(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_create_booking().returning(|_| Ok(booking_fixture(PaymentStatus::Pending)));
    store.expect_set_customer_ref().returning(|_, _| Ok(booking_fixture(PaymentStatus::Pending)));
    store.expect_set_deposit_payment_ref().returning(|_, _| Ok(booking_fixture(PaymentStatus::Pending)));
    let mut processor = MockProcessor::new();
    processor.expect_create_customer().returning(|_, _, _| Ok(CustomerRef("cus_test123".to_string())));
    processor.expect_create_payment_request().returning(|_| {
        Ok(PaymentRequest { id: "pi_deposit123".to_string(), client_secret: "pi_deposit123_secret_xyz".to_string() })
    });
    let api = PaymentFlowApi::new(store, processor);
    cfg.service(web::scope("/bookings").service(CreateBookingRoute::<MockBookingDb, MockProcessor>::new()))
        .app_data(web::Data::new(api));
}

fn configure_no_calls(cfg: &mut ServiceConfig) {
    let api = PaymentFlowApi::new(MockBookingDb::new(), MockProcessor::new());
    cfg.service(web::scope("/bookings").service(CreateBookingRoute::<MockBookingDb, MockProcessor>::new()))
        .app_data(web::Data::new(api));
}

fn configure_queries(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store
        .expect_search_bookings()
        .withf(|q| q.customer_email.as_deref() == Some("alice@example.com"))
        .returning(|_| Ok(vec![booking_fixture(PaymentStatus::DepositPaid)]));
    store.expect_fetch_booking_by_id().returning(|_| {
        let mut booking = booking_fixture(PaymentStatus::DepositPaid);
        booking.deposit_receipt_url = Some("https://pay.example.com/receipts/dep123".to_string());
        Ok(Some(booking))
    });
    let api = BookingApi::new(store);
    cfg.service(
        web::scope("/bookings")
            .service(MyBookingsRoute::<MockBookingDb>::new())
            .service(GetReceiptsRoute::<MockBookingDb>::new()),
    )
    .app_data(web::Data::new(api));
}

fn configure_admin_search(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store
        .expect_search_bookings()
        .withf(|q| q.payment_status == Some(PaymentStatus::Paid) && q.hall.as_deref() == Some("Rose Hall"))
        .returning(|_| Ok(vec![booking_fixture(PaymentStatus::Paid)]));
    let api = BookingApi::new(store);
    cfg.service(web::scope("/bookings").service(SearchBookingsRoute::<MockBookingDb>::new()))
        .app_data(web::Data::new(api));
}

fn configure_final_payment(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(booking_fixture(PaymentStatus::DepositPaid))));
    store.expect_set_final_payment_ref().returning(|_, _| {
        let mut booking = booking_fixture(PaymentStatus::DepositPaid);
        booking.final_payment_ref = Some("pi_final456".to_string());
        Ok(booking)
    });
    let mut processor = MockProcessor::new();
    processor
        .expect_create_payment_request()
        .withf(|req| req.amount.value() == 70_000)
        .returning(|_| Ok(PaymentRequest { id: "pi_final456".to_string(), client_secret: "pi_final456_secret_xyz".to_string() }));
    let api = PaymentFlowApi::new(store, processor);
    cfg.service(web::scope("/bookings").service(FinalPaymentRoute::<MockBookingDb, MockProcessor>::new()))
        .app_data(web::Data::new(api));
}

fn configure_pending_booking(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(Some(booking_fixture(PaymentStatus::Pending))));
    let api = PaymentFlowApi::new(store, MockProcessor::new());
    cfg.service(web::scope("/bookings").service(FinalPaymentRoute::<MockBookingDb, MockProcessor>::new()))
        .app_data(web::Data::new(api));
}

fn configure_missing_booking(cfg: &mut ServiceConfig) {
    let mut store = MockBookingDb::new();
    store.expect_fetch_booking_by_id().returning(|_| Ok(None));
    let api = BookingApi::new(store);
    cfg.service(web::scope("/bookings").service(GetReceiptsRoute::<MockBookingDb>::new()))
        .app_data(web::Data::new(api));
}
