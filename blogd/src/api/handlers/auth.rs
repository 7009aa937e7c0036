use axum::{Json, extract::State};

use crate::{
    AppState,
    api::{
        extract::JsonBody,
        models::{
            auth::{LoginRequest, LoginResponse, RegisterRequest},
            users::UserResponse,
        },
    },
    config::PasswordConfig,
    errors::Error,
};

fn validate_registration(request: &RegisterRequest, rules: &PasswordConfig) -> Result<(), Error> {
    if request.name.trim().is_empty() {
        return Err(Error::bad_request("Name must not be empty"));
    }
    if !request.email.contains('@') {
        return Err(Error::bad_request("Email address is not valid"));
    }

    let length = request.password.chars().count();
    if length < rules.min_length {
        return Err(Error::bad_request(format!(
            "Password must be at least {} characters long",
            rules.min_length
        )));
    }
    if length > rules.max_length {
        return Err(Error::bad_request(format!(
            "Password must be no more than {} characters long",
            rules.max_length
        )));
    }
    Ok(())
}

/// Register a new user account
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, JsonBody(request): JsonBody<RegisterRequest>) -> Result<Json<UserResponse>, Error> {
    validate_registration(&request, &state.config.auth.password)?;

    let user = state.users.register(request.name, request.email, request.password).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Exchange email and password for a session token
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, JsonBody(request): JsonBody<LoginRequest>) -> Result<Json<LoginResponse>, Error> {
    let email = request.email.clone();
    let token = state.users.login(request.email, request.password).await.map_err(|e| match e {
        Error::NotFound { .. } => Error::Unprocessable {
            message: format!("No account registered for {email}"),
        },
        Error::InvalidCredentials => Error::Unprocessable {
            message: Error::InvalidCredentials.user_message(),
        },
        other => other,
    })?;

    Ok(Json(LoginResponse { token }))
}
