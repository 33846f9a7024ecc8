//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions. Async handlers get executed
//! concurrently by worker threads and thus don't block execution.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use booking_engine::{
    db_types::{BookingId, NewBooking},
    traits::{BookingStore, ContractRenderer, PaymentProcessor, ProcessorError},
    BookingApi, ContractApi, DraftMode, PaymentFlowApi, WebhookApi,
};
use log::*;

use crate::{
    data_objects::{
        BookingSearchQuery, ContractDraftParams, FinalPaymentParams, MyBookingsQuery, SignContractParams, WebhookAck,
    },
    errors::ServerError,
};

/// The header carrying the processor's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Bookings  ----------------------------------------------------
route!(create_booking => Post "" impl BookingStore, PaymentProcessor);
/// Creates a new booking and returns the deposit payment handle.
///
/// The response carries the `client_secret` the client needs to complete the deposit payment, along with the
/// computed deposit amount. The booking stays `pending` until the processor confirms the payment via webhook.
pub async fn create_booking<B, P>(
    body: web::Json<NewBooking>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: BookingStore,
    P: PaymentProcessor,
{
    let booking = body.into_inner();
    trace!("💻️ POST new booking for {}", booking.customer_email);
    let init = api.initiate_deposit(booking).await?;
    Ok(HttpResponse::Created().json(init))
}

route!(my_bookings => Get "/me" impl BookingStore);
pub async fn my_bookings<B: BookingStore>(
    query: web::Query<MyBookingsQuery>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let email = query.into_inner().email;
    trace!("💻️ GET bookings for {email}");
    let bookings = api.customer_bookings(&email).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

route!(search_bookings => Get "/admin" impl BookingStore);
pub async fn search_bookings<B: BookingStore>(
    query: web::Query<BookingSearchQuery>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner().into();
    debug!("💻️ GET booking search: {filter:?}");
    let bookings = api.search(filter).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(final_payment => Post "/final-payment" impl BookingStore, PaymentProcessor);
/// Creates the payment request for the remaining balance of a deposit-paid booking.
pub async fn final_payment<B, P>(
    body: web::Json<FinalPaymentParams>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: BookingStore,
    P: PaymentProcessor,
{
    let params = body.into_inner();
    trace!("💻️ POST final payment for booking [{}]", params.booking_id);
    let init = api.initiate_final_payment(&params.booking_id).await?;
    Ok(HttpResponse::Ok().json(init))
}

route!(get_receipts => Get "/{booking_id}/receipts" impl BookingStore);
/// The receipt URLs on record, with the payment position they settle.
pub async fn get_receipts<B: BookingStore>(
    path: web::Path<String>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = BookingId(path.into_inner());
    trace!("💻️ GET receipts for booking [{id}]");
    let report = api.receipts(&id).await?;
    Ok(HttpResponse::Ok().json(report))
}

route!(backfill_receipts => Put "/{booking_id}/receipts" impl BookingStore, PaymentProcessor);
/// Fetches the latest receipt URL from the processor for the booking's confirmed payment and stores it.
pub async fn backfill_receipts<B, P>(
    path: web::Path<String>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: BookingStore,
    P: PaymentProcessor,
{
    let id = BookingId(path.into_inner());
    debug!("💻️ PUT receipt backfill for booking [{id}]");
    let receipts = api.backfill_receipts(&id).await?;
    Ok(HttpResponse::Ok().json(receipts))
}

//----------------------------------------------   Contracts  ----------------------------------------------------
route!(contract_draft => Post "/contract/draft" impl BookingStore, ContractRenderer);
/// Explicit (administrative) draft creation. Unlike the webhook path, an existing draft is an error here.
pub async fn contract_draft<B, R>(
    body: web::Json<ContractDraftParams>,
    api: web::Data<ContractApi<B, R>>,
) -> Result<HttpResponse, ServerError>
where
    B: BookingStore,
    R: ContractRenderer,
{
    let params = body.into_inner();
    trace!("💻️ POST contract draft for booking [{}]", params.booking_id);
    let outcome = api.create_draft(&params.booking_id, DraftMode::Strict).await?;
    Ok(HttpResponse::Created().json(outcome))
}

route!(sign_contract => Post "/contract/sign" impl BookingStore, ContractRenderer);
pub async fn sign_contract<B, R>(
    body: web::Json<SignContractParams>,
    api: web::Data<ContractApi<B, R>>,
) -> Result<HttpResponse, ServerError>
where
    B: BookingStore,
    R: ContractRenderer,
{
    let params = body.into_inner();
    trace!("💻️ POST contract signature for booking [{}]", params.booking_id);
    let outcome = api.sign(&params.booking_id, &params.signer_name).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

route!(contract_status => Get "/contract/{booking_id}" impl BookingStore, ContractRenderer);
pub async fn contract_status<B, R>(
    path: web::Path<String>,
    api: web::Data<ContractApi<B, R>>,
) -> Result<HttpResponse, ServerError>
where
    B: BookingStore,
    R: ContractRenderer,
{
    let id = BookingId(path.into_inner());
    trace!("💻️ GET contract status for booking [{id}]");
    let report = api.status(&id).await?;
    Ok(HttpResponse::Ok().json(report))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(payment_webhook => Post "/payments" impl BookingStore, PaymentProcessor, ContractRenderer);
/// The payment processor's webhook endpoint.
///
/// The signature is verified over the exact raw body before any parsing. A failed verification is final (401,
/// the sender must not retry). Anything that verifies but cannot be applied for a permanent reason (an
/// unrecognised event type, missing metadata) is acknowledged with a 200 so the at-least-once sender stops
/// retrying. Only an unknown booking (404) or a transient backend failure (5xx) is surfaced as an error.
pub async fn payment_webhook<B, P, R>(
    req: HttpRequest,
    body: web::Bytes,
    processor: web::Data<P>,
    api: web::Data<WebhookApi<B, R>>,
) -> Result<HttpResponse, ServerError>
where
    B: BookingStore,
    P: PaymentProcessor,
    R: ContractRenderer,
{
    trace!("🪝️ Received payment webhook request: {}", req.uri());
    let signature = req.headers().get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let event = match processor.verify_webhook(body.as_ref(), signature) {
        Ok(event) => event,
        Err(e @ ProcessorError::Authentication(_)) => {
            warn!("🪝️ Webhook signature verification failed. {e}");
            return Err(e.into());
        },
        Err(e) => {
            // A verified-but-unparseable body will never parse on a retry either. Acknowledge it.
            warn!("🪝️ Could not interpret webhook payload. {e}");
            return Ok(HttpResponse::Ok().json(WebhookAck { received: true }));
        },
    };
    debug!("🪝️ Verified webhook event [{}] of type {}", event.event_id, event.event_type);
    let outcome = api.apply_event(event).await.map_err(|e| {
        warn!("🪝️ Could not apply webhook event. {e}");
        ServerError::from(e)
    })?;
    trace!("🪝️ Webhook outcome: {outcome:?}");
    Ok(HttpResponse::Ok().json(WebhookAck { received: true }))
}
