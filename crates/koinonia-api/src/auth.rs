use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use koinonia_types::api::{
    Claims, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse,
};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, convert};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    // Validate input
    if !req.email.contains('@') {
        return Err(ApiError::Validation("Enter a valid email address.".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters.".into(),
        ));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(ApiError::Validation("First and last name are required.".into()));
    }

    // Check if the email is taken
    let db = state.clone();
    let email = req.email.clone();
    if blocking("checking email", move || db.db.get_user_by_email(&email))
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "Error: an account with this email already exists.".into(),
        ));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::store("creating account")(anyhow::anyhow!("hash: {}", e)))?
        .to_string();

    let user_id = Uuid::new_v4();

    let db = state.clone();
    let (uid, email, first, last) = (
        user_id.to_string(),
        req.email.clone(),
        req.first_name.clone(),
        req.last_name.clone(),
    );
    blocking("creating account", move || {
        db.db.create_user(&uid, &email, &password_hash, &first, &last)
    })
    .await?;

    let token = create_token(&state.jwt_secret, user_id, &req.email, &req.first_name, &req.last_name)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let email = req.email.clone();
    let user = blocking("signing in", move || db.db.get_user_by_email(&email))
        .await?
        .ok_or_else(|| ApiError::Auth("Invalid email or password.".into()))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::store("signing in")(anyhow::anyhow!("stored hash: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Auth("Invalid email or password.".into()))?;

    let user_id = convert::parse_id(&user.id, "user");
    let token = create_token(
        &state.jwt_secret,
        user_id,
        &user.email,
        &user.first_name,
        &user.last_name,
    )?;

    Ok(Json(LoginResponse {
        user_id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        token,
    }))
}

/// Session fetch: the profile behind the presented token.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let user = blocking("loading profile", move || db.db.get_user_by_id(&uid))
        .await?
        .ok_or_else(|| ApiError::Auth("Account no longer exists.".into()))?;

    Ok(Json(ProfileResponse {
        user_id: claims.sub,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        avatar_url: user.avatar_url,
    }))
}

fn create_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> ApiResult<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::store("issuing session")(anyhow::anyhow!("jwt encode: {}", e)))
}
