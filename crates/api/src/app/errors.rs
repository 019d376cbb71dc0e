use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use fedgate_auth::SessionError;

/// Wire form of a [`SessionError`]: JSON `{title, message, code}` with the
/// HTTP status equal to `code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody(pub SessionError);

impl IntoResponse for ErrorBody {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.0.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}
