// Authentication endpoints
//
// Token persistence is not handled here. The session controller in
// mapper-core owns storage and calls these as plain request/response pairs.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{LoginCredentials, LoginResponse, ProfileUpdate, RegisterData, TokenPair, User};

impl ApiClient {
    /// Exchange credentials for a token pair and user snapshot.
    ///
    /// `POST /auth/login`
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<LoginResponse> {
        debug!(username = %credentials.username, "logging in");
        self.post("auth/login", credentials).await
    }

    /// Create an account. Does not start a session.
    ///
    /// `POST /auth/register`
    pub async fn register(&self, data: &RegisterData) -> ApiResult<User> {
        debug!(username = %data.username, role = %data.role, "registering user");
        self.post("auth/register", data).await
    }

    /// `POST /auth/logout`
    pub async fn logout(&self) -> ApiResult<()> {
        self.post_unit::<()>("auth/logout", None).await
    }

    /// Trade a refresh token for a new token pair.
    ///
    /// `POST /auth/refresh` with `{"refreshToken": "..."}`
    pub async fn refresh(&self, refresh_token: &SecretString) -> ApiResult<TokenPair> {
        self.post(
            "auth/refresh",
            &json!({ "refreshToken": refresh_token.expose_secret() }),
        )
        .await
    }

    /// `GET /auth/me`
    pub async fn current_user(&self) -> ApiResult<User> {
        self.get("auth/me").await
    }

    /// `PUT /auth/profile`
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        self.put("auth/profile", update).await
    }

    /// `POST /auth/change-password`
    pub async fn change_password(
        &self,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> ApiResult<()> {
        self.post_unit(
            "auth/change-password",
            Some(&json!({
                "currentPassword": current_password.expose_secret(),
                "newPassword": new_password.expose_secret(),
            })),
        )
        .await
    }

    /// `POST /auth/forgot-password`
    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        self.post_unit("auth/forgot-password", Some(&json!({ "email": email })))
            .await
    }

    /// `POST /auth/reset-password`
    pub async fn reset_password(&self, token: &str, new_password: &SecretString) -> ApiResult<()> {
        self.post_unit(
            "auth/reset-password",
            Some(&json!({
                "token": token,
                "newPassword": new_password.expose_secret(),
            })),
        )
        .await
    }

    /// `POST /auth/verify-email`
    pub async fn verify_email(&self, token: &str) -> ApiResult<()> {
        self.post_unit("auth/verify-email", Some(&json!({ "token": token })))
            .await
    }
}
