use axum::{Json, extract::State};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::token::TokenKind;
use crate::usecase::profile::GetProfileUseCase;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// `GET /auth/profile` — bearer access token required. Refresh tokens are
/// rejected here; only the short-lived, self-verifying credential authorizes
/// requests.
pub async fn get_profile(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<ProfileResponse>, AuthServiceError> {
    let claims = state.tokens.verify(auth.token(), TokenKind::Access)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthServiceError::TokenInvalid)?;

    let usecase = GetProfileUseCase {
        users: state.users.clone(),
    };
    let user = usecase.execute(user_id).await?;
    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    }))
}
