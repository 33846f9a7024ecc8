use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use booking_engine::{BookingApi, ContractApi, PaymentFlowApi, SqliteDatabase, WebhookApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{renderer::FileContractRenderer, stripe::StripeClient},
    routes::{
        health, BackfillReceiptsRoute, ContractDraftRoute, ContractStatusRoute, CreateBookingRoute,
        FinalPaymentRoute, GetReceiptsRoute, MyBookingsRoute, PaymentWebhookRoute, SearchBookingsRoute,
        SignContractRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    sqlx::migrate!("../booking_engine/src/sqlite/migrations")
        .run(db.pool())
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Malformed request bodies get the same JSON error shape as every other client error.
pub fn json_extractor_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into())
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let stripe = StripeClient::new(config.stripe.clone())?;
    let renderer = FileContractRenderer::new(config.contracts.clone())?;
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone(), stripe.clone());
        let bookings_api = BookingApi::new(db.clone());
        let contracts_api = ContractApi::new(db.clone(), renderer.clone());
        let webhook_api = WebhookApi::new(db.clone(), ContractApi::new(db.clone(), renderer.clone()));
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("vbg::access_log"))
            .app_data(json_extractor_config())
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(bookings_api))
            .app_data(web::Data::new(contracts_api))
            .app_data(web::Data::new(webhook_api))
            .app_data(web::Data::new(stripe.clone()));
        let bookings_scope = web::scope("/bookings")
            .service(CreateBookingRoute::<SqliteDatabase, StripeClient>::new())
            .service(MyBookingsRoute::<SqliteDatabase>::new())
            .service(SearchBookingsRoute::<SqliteDatabase>::new())
            .service(FinalPaymentRoute::<SqliteDatabase, StripeClient>::new())
            .service(ContractDraftRoute::<SqliteDatabase, FileContractRenderer>::new())
            .service(SignContractRoute::<SqliteDatabase, FileContractRenderer>::new())
            .service(ContractStatusRoute::<SqliteDatabase, FileContractRenderer>::new())
            .service(GetReceiptsRoute::<SqliteDatabase>::new())
            .service(BackfillReceiptsRoute::<SqliteDatabase, StripeClient>::new());
        let webhook_scope = web::scope("/webhook")
            .service(PaymentWebhookRoute::<SqliteDatabase, StripeClient, FileContractRenderer>::new());
        app.service(health).service(bookings_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
