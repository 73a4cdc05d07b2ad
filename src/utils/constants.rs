/// Persisted session keys. Always written and deleted together.
pub const STORAGE_KEY_TOKEN: &str = "token";
pub const STORAGE_KEY_USER: &str = "user";

/// Interaction events that count as evidence the user is still present.
pub const ACTIVITY_EVENTS: [&str; 6] = [
    "mousedown",
    "mousemove",
    "keypress",
    "scroll",
    "touchstart",
    "click",
];

pub const AUTH_ROUTE: &str = "/auth";
pub const VERIFY_OTP_ROUTE: &str = "/verify-otp";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// DOM event carrying user-facing notifications to the toaster in the view layer.
pub const NOTIFICATION_EVENT: &str = "arribot:notification";
/// DOM event fired after every login and logout.
pub const SESSION_EVENT: &str = "arribot:session";

pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const VERIFY_OTP_PATH: &str = "/api/auth/verify-otp";
pub const SIGNIN_PATH: &str = "/api/auth/signin";
pub const RESEND_OTP_PATH: &str = "/api/auth/resend-otp";

pub const OTP_LENGTH: usize = 4;
