use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::models::{ApiMessage, ResendOtpRequest, SignInRequest, SignUpRequest, VerifyOtpRequest};
use crate::services::ApiClient;
use crate::utils::{RESEND_OTP_PATH, SIGNIN_PATH, SIGNUP_PATH, VERIFY_OTP_PATH};

/// Backend authentication endpoints.
///
/// Credential-bearing calls return the raw body; normalisation into
/// `AuthResponse` happens at the session boundary.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<ApiMessage, ApiError>;
    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Map<String, Value>, ApiError>;
    async fn sign_in(&self, request: &SignInRequest) -> Result<Map<String, Value>, ApiError>;
    async fn resend_otp(&self, request: &ResendOtpRequest) -> Result<ApiMessage, ApiError>;
}

fn into_message(body: Map<String, Value>) -> Result<ApiMessage, ApiError> {
    serde_json::from_value(Value::Object(body)).map_err(|e| ApiError::Parse(e.to_string()))
}

impl AuthApi for ApiClient {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<ApiMessage, ApiError> {
        log::info!("🆔 [AUTH] Signing up {}", crate::models::mask_email(&request.email));
        into_message(self.post_json(SIGNUP_PATH, request).await?)
    }

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Map<String, Value>, ApiError> {
        log::info!("🔑 [AUTH] Verifying OTP for {}", crate::models::mask_email(&request.email));
        self.post_json(VERIFY_OTP_PATH, request).await
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<Map<String, Value>, ApiError> {
        log::info!("🔐 [AUTH] Signing in {}", crate::models::mask_email(&request.email));
        self.post_json(SIGNIN_PATH, request).await
    }

    async fn resend_otp(&self, request: &ResendOtpRequest) -> Result<ApiMessage, ApiError> {
        log::info!("📩 [AUTH] Requesting a new OTP for {}", crate::models::mask_email(&request.email));
        into_message(self.post_json(RESEND_OTP_PATH, request).await?)
    }
}
