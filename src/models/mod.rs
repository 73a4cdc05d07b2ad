pub mod auth;
pub mod otp;
pub mod session;

pub use auth::{
    ApiMessage, AuthResponse, ResendOtpRequest, SignInRequest, SignUpRequest, UserProfile,
    VerifyOtpRequest,
};
pub use otp::{mask_email, OtpCode, OtpEdit};
pub use session::{LogoutReason, Session};
