use actix_web::{body::BoxBody, http::StatusCode, HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::{constants::MSG_SOMETHING_WENT_WRONG, errors::FieldError};

/// Outcome code carried by every envelope. Serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u16")]
pub enum Status {
    Success,
    NotFound,
    BadRequest,
    Error,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Success => 200,
            Status::NotFound => 404,
            Status::BadRequest => 400,
            Status::Error => 500,
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Status::Success => StatusCode::OK,
            Status::NotFound => StatusCode::NOT_FOUND,
            Status::BadRequest => StatusCode::BAD_REQUEST,
            Status::Error => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Data(T),
    Invalid(Vec<FieldError>),
    Fault(String),
}

/// The `{ message, payload, status }` shape returned by every service call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub payload: Option<Payload<T>>,
    pub status: Status,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, payload: Option<Payload<T>>, status: Status) -> Self {
        Envelope {
            message: message.into(),
            payload,
            status,
        }
    }

    pub fn success(message: impl Into<String>, data: T) -> Self {
        Envelope::new(message, Some(Payload::Data(data)), Status::Success)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Envelope::new(message, None, Status::NotFound)
    }

    pub fn bad_request(errors: Vec<FieldError>) -> Self {
        Envelope::new("Validation Error", Some(Payload::Invalid(errors)), Status::BadRequest)
    }

    /// An operation that completed without effect. Uses the error status but
    /// carries no payload.
    pub fn failed(message: impl Into<String>) -> Self {
        Envelope::new(message, None, Status::Error)
    }

    pub fn fault(detail: impl Into<String>) -> Self {
        Envelope::new(MSG_SOMETHING_WENT_WRONG, Some(Payload::Fault(detail.into())), Status::Error)
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn data(&self) -> Option<&T> {
        match &self.payload {
            Some(Payload::Data(data)) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self.payload {
            Some(Payload::Data(data)) => Some(data),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match &self.payload {
            Some(Payload::Invalid(errors)) => Some(errors),
            _ => None,
        }
    }
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status.http_status()).json(self)
    }
}
