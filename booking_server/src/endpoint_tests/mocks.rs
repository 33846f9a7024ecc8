use booking_engine::{
    booking_objects::BookingQueryFilter,
    db_types::{Booking, BookingId, NewBooking, PaymentPurpose},
    traits::{
        BookingStore, BookingStoreError, ContractFields, ContractRenderer, CustomerRef, NewPaymentRequest,
        PaymentEvent, PaymentProcessor, PaymentRequest, PaymentRequestDetails, ProcessorError, RendererError,
        TemplateKind, TransitionResult,
    },
};
use mockall::mock;

mock! {
    pub BookingDb {}
    impl BookingStore for BookingDb {
        fn url(&self) -> &str;
        async fn create_booking(&self, booking: NewBooking) -> Result<Booking, BookingStoreError>;
        async fn fetch_booking_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingStoreError>;
        async fn search_bookings(&self, query: BookingQueryFilter) -> Result<Vec<Booking>, BookingStoreError>;
        async fn set_customer_ref(&self, id: &BookingId, customer_ref: &str) -> Result<Booking, BookingStoreError>;
        async fn set_deposit_payment_ref(&self, id: &BookingId, payment_ref: &str) -> Result<Booking, BookingStoreError>;
        async fn set_final_payment_ref(&self, id: &BookingId, payment_ref: &str) -> Result<Booking, BookingStoreError>;
        async fn mark_deposit_paid<'a>(&self, id: &BookingId, receipt_url: Option<&'a str>) -> Result<TransitionResult, BookingStoreError>;
        async fn mark_paid<'a>(&self, id: &BookingId, receipt_url: Option<&'a str>) -> Result<TransitionResult, BookingStoreError>;
        async fn mark_payment_failed(&self, id: &BookingId) -> Result<TransitionResult, BookingStoreError>;
        async fn upsert_receipt(&self, id: &BookingId, purpose: PaymentPurpose, url: &str) -> Result<Booking, BookingStoreError>;
        async fn set_contract_draft(&self, id: &BookingId, draft_url: &str) -> Result<TransitionResult, BookingStoreError>;
        async fn set_contract_signed(&self, id: &BookingId, signed_url: &str, signer_name: &str) -> Result<Booking, BookingStoreError>;
    }
}

mock! {
    pub Processor {}
    impl PaymentProcessor for Processor {
        async fn create_customer(&self, email: &str, name: &str, booking_id: &BookingId) -> Result<CustomerRef, ProcessorError>;
        async fn create_payment_request<'a>(&self, request: NewPaymentRequest<'a>) -> Result<PaymentRequest, ProcessorError>;
        async fn fetch_payment_request(&self, payment_ref: &str) -> Result<PaymentRequestDetails, ProcessorError>;
        fn verify_webhook<'a>(&self, raw_body: &[u8], signature_header: Option<&'a str>) -> Result<PaymentEvent, ProcessorError>;
    }
}

mock! {
    pub Renderer {}
    impl ContractRenderer for Renderer {
        async fn render<'a>(&self, kind: TemplateKind, fields: ContractFields<'a>) -> Result<String, RendererError>;
    }
}
