use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use booking_engine::{traits::ProcessorError, PaymentFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Webhook signature verification failed. {0}")]
    WebhookAuthenticationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with a concurrent update. {0}")]
    Conflict(String),
    #[error("The payment processor could not be reached. {0}")]
    UpstreamError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::WebhookAuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentFlowError> for ServerError {
    fn from(e: PaymentFlowError) -> Self {
        match e {
            PaymentFlowError::ValidationError(_) => Self::InvalidInput(e.to_string()),
            PaymentFlowError::InvalidState(_) => Self::InvalidInput(e.to_string()),
            PaymentFlowError::BookingNotFound(_) => Self::NoRecordFound(e.to_string()),
            PaymentFlowError::ReceiptNotAvailable(_) => Self::NoRecordFound(e.to_string()),
            PaymentFlowError::UpstreamError(_) => Self::UpstreamError(e.to_string()),
            PaymentFlowError::Conflict(_) => Self::Conflict(e.to_string()),
            PaymentFlowError::RendererError(_) => Self::BackendError(e.to_string()),
            PaymentFlowError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<ProcessorError> for ServerError {
    fn from(e: ProcessorError) -> Self {
        match e {
            ProcessorError::Authentication(_) => Self::WebhookAuthenticationError(e.to_string()),
            ProcessorError::Upstream(_) => Self::UpstreamError(e.to_string()),
            ProcessorError::MalformedResponse(_) => Self::UpstreamError(e.to_string()),
        }
    }
}
