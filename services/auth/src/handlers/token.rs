use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::handlers::caller_origin;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::logout::LogoutUseCase;
use crate::usecase::refresh::RefreshSessionUseCase;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairBody {
    pub access_token: String,
    pub refresh_token: String,
}

// ── POST /auth/token ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTokenRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: Uuid,
    pub email: String,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenResponse {
    pub user: UserBody,
    pub tokens: TokenPairBody,
}

pub async fn create_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTokenRequest>,
) -> Result<(StatusCode, Json<CreateTokenResponse>), AuthServiceError> {
    let usecase = LoginUseCase {
        users: state.users.clone(),
        otp: state.otp_manager(),
        refresh_tokens: state.refresh_tokens.clone(),
        limiter: state.rate_limiter(),
        tokens: state.tokens.clone(),
        verify_limit: state.settings.max_verify_attempts,
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            code: body.code,
            origin: caller_origin(&headers),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateTokenResponse {
            user: UserBody {
                id: out.user.id,
                email: out.user.email,
                last_login_at: out.user.last_login_at,
            },
            tokens: TokenPairBody {
                access_token: out.access_token,
                refresh_token: out.refresh_token,
            },
        }),
    ))
}

// ── PATCH /auth/token ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPairBody>, AuthServiceError> {
    let usecase = RefreshSessionUseCase {
        refresh_tokens: state.refresh_tokens.clone(),
        tokens: state.tokens.clone(),
    };
    let out = usecase.execute(&body.refresh_token).await?;
    Ok(Json(TokenPairBody {
        access_token: out.access_token,
        refresh_token: out.refresh_token,
    }))
}

// ── DELETE /auth/token ────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RevokeTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

pub async fn revoke_token(
    State(state): State<AppState>,
    Json(body): Json<RevokeTokenRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = LogoutUseCase {
        refresh_tokens: state.refresh_tokens.clone(),
    };
    usecase.execute(body.refresh_token.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
