use actix_web::{
    web,
    http::StatusCode,
    ResponseError,
    HttpResponse,
    error::{JsonPayloadError, QueryPayloadError},
};

use crate::{entities::envelope::Envelope, errors::FieldError};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
}

/// Body or query that could not be decoded. Rendered as a validation
/// envelope against the `body` or `query` field.
#[derive(Debug)]
pub struct JsonError {
    field: &'static str,
    message: String,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let body: Envelope<()> =
            Envelope::bad_request(vec![FieldError::new(self.field, self.message.clone())]);
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<JsonPayloadError> for JsonError {
    fn from(err: JsonPayloadError) -> Self {
        let message = match &err {
            JsonPayloadError::Deserialize(e) => format!("Invalid JSON: {}", e),
            _ => format!("JSON payload error: {}", err),
        };
        JsonError { field: "body", message }
    }
}

impl From<QueryPayloadError> for JsonError {
    fn from(err: QueryPayloadError) -> Self {
        JsonError {
            field: "query",
            message: format!("Query string error: {}", err),
        }
    }
}
