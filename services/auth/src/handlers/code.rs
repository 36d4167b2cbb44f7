use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::handlers::caller_origin;
use crate::state::AppState;
use crate::usecase::request_code::{RequestCodeInput, RequestCodeUseCase};

#[derive(Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeResponse {
    pub expires_in_minutes: i64,
    pub cooldown_seconds: i64,
}

pub async fn request_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RequestCodeBody>,
) -> Result<(StatusCode, Json<RequestCodeResponse>), AuthServiceError> {
    let usecase = RequestCodeUseCase {
        otp: state.otp_manager(),
        limiter: state.rate_limiter(),
        email_sender: state.email_sender.clone(),
        max_requests_per_email: state.settings.max_requests_per_email,
        max_requests_per_origin: state.settings.max_requests_per_origin,
        resend_cooldown: state.settings.resend_cooldown,
    };
    let out = usecase
        .execute(RequestCodeInput {
            email: body.email,
            origin: caller_origin(&headers),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RequestCodeResponse {
            expires_in_minutes: out.expires_in_minutes,
            cooldown_seconds: out.cooldown_seconds,
        }),
    ))
}
