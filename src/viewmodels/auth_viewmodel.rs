// ============================================================================
// AUTH VIEWMODEL - Sign-up, sign-in and OTP verification flows
// ============================================================================
// Validates the form, calls the backend, updates the session store and tells
// the view layer what to show (notifications) and where to go (navigation).
// Every flow also returns its outcome so callers can react themselves.
// ============================================================================

use std::rc::Rc;

use serde_json::{json, Value};

use crate::error::AuthError;
use crate::models::{
    AuthResponse, OtpCode, ResendOtpRequest, SignInRequest, SignUpRequest, UserProfile,
};
use crate::services::{AuthApi, Navigator, Notification, Notifier};
use crate::state::SessionStore;
use crate::utils::{AUTH_ROUTE, DASHBOARD_ROUTE, VERIFY_OTP_ROUTE};

/// Fallback shown when OTP verification fails without a server message.
const OTP_REJECTED_FALLBACK: &str = "Protocol Mismatch";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SignInOutcome {
    Authenticated(UserProfile),
    /// The account exists but its e-mail is not verified yet.
    VerificationRequired { email: String, otp_resent: bool },
    /// The session changed while the request was in flight; nothing was applied.
    Superseded,
}

impl SignInOutcome {
    /// Shape handed back to the view layer.
    pub fn to_json(&self) -> Value {
        match self {
            SignInOutcome::Authenticated(user) => json!({ "status": "authenticated", "user": user }),
            SignInOutcome::VerificationRequired { email, otp_resent } => json!({
                "status": "verification_required",
                "email": email,
                "otpResent": otp_resent,
            }),
            SignInOutcome::Superseded => json!({ "status": "superseded" }),
        }
    }
}

pub struct AuthViewModel<A: AuthApi> {
    api: A,
    store: SessionStore,
    notifier: Rc<dyn Notifier>,
    navigator: Rc<dyn Navigator>,
}

impl<A: AuthApi> AuthViewModel<A> {
    pub fn new(api: A, store: SessionStore, notifier: Rc<dyn Notifier>, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            api,
            store,
            notifier,
            navigator,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Creates the account and moves on to e-mail verification.
    /// Returns the address the OTP was sent to.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<String, AuthError> {
        let result = self.try_sign_up(form).await;
        match &result {
            Ok(_) => {
                self.notifier
                    .notify(Notification::Success("Identity Created. Proceed".to_string()));
                self.navigator.navigate(VERIFY_OTP_ROUTE);
            }
            Err(e) => self.report(e),
        }
        result
    }

    async fn try_sign_up(&self, form: &SignUpForm) -> Result<String, AuthError> {
        if form.email.is_empty() || form.password.is_empty() {
            return Err(AuthError::CredentialsRequired);
        }
        if form.full_name.is_empty() || form.confirm_password.is_empty() {
            return Err(AuthError::IncompleteForm);
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let request = SignUpRequest {
            full_name: form.full_name.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
        };
        let ack = self.api.sign_up(&request).await?;
        log::info!(
            "🆔 [AUTH] Account created: {}",
            ack.message.as_deref().unwrap_or("no message")
        );
        Ok(form.email.clone())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, AuthError> {
        if email.is_empty() || password.is_empty() {
            let err = AuthError::CredentialsRequired;
            self.report(&err);
            return Err(err);
        }

        let generation = self.store.generation();
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let body = match self.api.sign_in(&request).await {
            Ok(body) => body,
            Err(e) if requires_verification(e.server_message()) => {
                return Ok(self.start_verification(email).await);
            }
            Err(e) => {
                let err = AuthError::from(e);
                self.report(&err);
                return Err(err);
            }
        };

        let response = AuthResponse::from_sign_in(&body);
        let user = match &response {
            AuthResponse::Authenticated { user, .. } => user.clone(),
            AuthResponse::Pending => {
                let err = AuthError::MissingToken;
                self.report(&err);
                return Err(err);
            }
        };
        if !self.store.apply_auth_response(generation, response) {
            return Ok(SignInOutcome::Superseded);
        }
        self.notifier.notify(Notification::Success("Access Granted".to_string()));
        self.navigator.navigate(DASHBOARD_ROUTE);
        Ok(SignInOutcome::Authenticated(user))
    }

    /// Unverified account: send a fresh OTP and go to the verification page
    /// whether or not the resend worked, so the user can retry from there.
    async fn start_verification(&self, email: &str) -> SignInOutcome {
        log::warn!("⚠️ [AUTH] Account not verified: {}", crate::models::mask_email(email));
        self.notifier.notify(Notification::Error(
            "Account not verified. Sending OTP...".to_string(),
        ));

        let request = ResendOtpRequest {
            email: email.to_string(),
        };
        let otp_resent = match self.api.resend_otp(&request).await {
            Ok(_) => {
                self.notifier.notify(Notification::Success(
                    "OTP Sent. Please check your email.".to_string(),
                ));
                true
            }
            Err(e) => {
                log::error!("❌ [AUTH] Resend failed: {}", e);
                self.notifier.notify(Notification::Error(
                    "Failed to send OTP. Please try refreshing.".to_string(),
                ));
                false
            }
        };

        self.navigator.navigate(VERIFY_OTP_ROUTE);
        SignInOutcome::VerificationRequired {
            email: email.to_string(),
            otp_resent,
        }
    }

    /// Submits the typed code. The code is cleared when the backend rejects it.
    /// Returns whether a session was established.
    pub async fn verify_otp(&self, email: &str, otp: &mut OtpCode) -> Result<bool, AuthError> {
        if email.is_empty() {
            let err = AuthError::EmailRequired;
            self.report(&err);
            self.navigator.navigate(AUTH_ROUTE);
            return Err(err);
        }
        if !otp.is_complete() {
            let err = AuthError::IncompleteOtp;
            self.report(&err);
            return Err(err);
        }

        match self.store.verify_otp(&self.api, email, &otp.code()).await {
            Ok(verification) => {
                let established = verification.session_established;
                self.notifier
                    .notify(Notification::Success("Verified Successfully".to_string()));
                if established {
                    self.notifier
                        .notify(Notification::Success("Login Successfully".to_string()));
                    self.navigator.navigate(DASHBOARD_ROUTE);
                } else {
                    self.navigator.navigate(AUTH_ROUTE);
                }
                Ok(established)
            }
            Err(e) => {
                let message = e.server_message().unwrap_or(OTP_REJECTED_FALLBACK).to_string();
                self.notifier.notify(Notification::Error(message));
                otp.clear();
                Err(e.into())
            }
        }
    }

    pub async fn resend_otp(&self, email: &str) -> Result<(), AuthError> {
        if email.is_empty() {
            let err = AuthError::EmailRequired;
            self.report(&err);
            return Err(err);
        }

        let request = ResendOtpRequest {
            email: email.to_string(),
        };
        match self.api.resend_otp(&request).await {
            Ok(_) => {
                self.notifier.notify(Notification::Success(
                    "OTP Sent. Please check your email.".to_string(),
                ));
                Ok(())
            }
            Err(e) => {
                let err = AuthError::from(e);
                self.report(&err);
                Err(err)
            }
        }
    }

    pub fn logout(&self) {
        self.store.logout();
        self.navigator.navigate(AUTH_ROUTE);
    }

    fn report(&self, err: &AuthError) {
        log::warn!("🛑 [AUTH] {}", err);
        self.notifier.notify(Notification::Error(err.user_message()));
    }
}

fn requires_verification(server_message: Option<&str>) -> bool {
    server_message.is_some_and(|m| m.to_lowercase().contains("verify"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::ApiMessage;
    use crate::testing::{FakeAuthApi, RecordingNavigator, RecordingNotifier};
    use crate::utils::MemoryStorage;
    use futures::executor::block_on;

    struct Fixture {
        vm: AuthViewModel<FakeAuthApi>,
        notifier: Rc<RecordingNotifier>,
        navigator: Rc<RecordingNavigator>,
    }

    fn fixture() -> Fixture {
        let store = SessionStore::initialize(Rc::new(MemoryStorage::new()));
        let notifier = Rc::new(RecordingNotifier::new());
        let navigator = Rc::new(RecordingNavigator::new());
        let vm = AuthViewModel::new(FakeAuthApi::new(), store, notifier.clone(), navigator.clone());
        Fixture {
            vm,
            notifier,
            navigator,
        }
    }

    fn form() -> SignUpForm {
        SignUpForm {
            full_name: "Ada".to_string(),
            email: "ada@x.io".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
        }
    }

    fn rejected(status: u16, message: &str) -> ApiError {
        ApiError::Http {
            status,
            message: Some(message.to_string()),
        }
    }

    fn complete_code(digits: &str) -> OtpCode {
        let mut otp = OtpCode::new();
        otp.paste(digits);
        otp
    }

    #[test]
    fn sign_up_validates_before_calling_the_backend() {
        let f = fixture();
        let cases = [
            (SignUpForm { email: String::new(), ..form() }, AuthError::CredentialsRequired),
            (SignUpForm { full_name: String::new(), ..form() }, AuthError::IncompleteForm),
            (
                SignUpForm { confirm_password: "other".to_string(), ..form() },
                AuthError::PasswordMismatch,
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(block_on(f.vm.sign_up(&input)), Err(expected));
        }
        assert!(f.vm.api.sign_up_requests().is_empty());
        assert_eq!(
            f.notifier.notifications().last(),
            Some(&Notification::Error("Code Mismatch".to_string()))
        );
    }

    #[test]
    fn sign_up_moves_on_to_verification() {
        let f = fixture();
        assert_eq!(block_on(f.vm.sign_up(&form())), Ok("ada@x.io".to_string()));

        let sent = f.vm.api.sign_up_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].full_name, "Ada");
        assert_eq!(f.navigator.routes(), vec![VERIFY_OTP_ROUTE.to_string()]);
        assert!(!f.vm.store().is_authenticated());
    }

    #[test]
    fn sign_up_rejection_is_reported_and_stays_on_the_form() {
        let f = fixture();
        f.vm.api
            .set_sign_up_response(Err(rejected(409, "Email already registered")));

        let result = block_on(f.vm.sign_up(&form()));

        assert_eq!(result, Err(AuthError::Api(rejected(409, "Email already registered"))));
        assert_eq!(
            f.notifier.notifications(),
            vec![Notification::Error("Email already registered".to_string())]
        );
        assert!(f.navigator.routes().is_empty());
    }

    #[test]
    fn sign_in_logs_in_and_goes_to_the_dashboard() {
        let f = fixture();
        f.vm.api.set_sign_in_response(Ok(json!({
            "success": true,
            "token": "jwt",
            "user": { "id": 7, "fullName": "Ada", "email": "ada@x.io" }
        })));

        let outcome = block_on(f.vm.sign_in("ada@x.io", "secret")).unwrap();

        let SignInOutcome::Authenticated(user) = outcome else {
            panic!("expected an authenticated outcome");
        };
        assert_eq!(user.full_name(), Some("Ada"));
        assert_eq!(f.vm.store().token().as_deref(), Some("jwt"));
        assert_eq!(f.navigator.routes(), vec![DASHBOARD_ROUTE.to_string()]);
    }

    #[test]
    fn sign_in_without_a_credential_is_rejected() {
        let f = fixture();
        f.vm.api.set_sign_in_response(Ok(json!({ "success": true })));

        assert_eq!(block_on(f.vm.sign_in("ada@x.io", "secret")), Err(AuthError::MissingToken));
        assert!(!f.vm.store().is_authenticated());
        assert_eq!(
            f.notifier.notifications(),
            vec![Notification::Error("Security Token Missing".to_string())]
        );
    }

    #[test]
    fn sign_in_requires_both_fields() {
        let f = fixture();
        assert_eq!(block_on(f.vm.sign_in("", "secret")), Err(AuthError::CredentialsRequired));
        assert_eq!(block_on(f.vm.sign_in("ada@x.io", "")), Err(AuthError::CredentialsRequired));
        assert!(f.vm.api.sign_in_requests().is_empty());
    }

    #[test]
    fn unverified_account_gets_a_fresh_otp() {
        let f = fixture();
        f.vm.api
            .set_sign_in_response(Err(rejected(403, "Please verify your email first")));

        let outcome = block_on(f.vm.sign_in("ada@x.io", "secret")).unwrap();

        assert_eq!(
            outcome,
            SignInOutcome::VerificationRequired {
                email: "ada@x.io".to_string(),
                otp_resent: true
            }
        );
        assert_eq!(f.vm.api.resend_requests(), vec!["ada@x.io".to_string()]);
        assert_eq!(f.navigator.routes(), vec![VERIFY_OTP_ROUTE.to_string()]);
    }

    #[test]
    fn failed_resend_still_leads_to_verification() {
        let f = fixture();
        f.vm.api.set_sign_in_response(Err(rejected(403, "VERIFY your account before signing in")));
        f.vm.api.set_resend_response(Err(ApiError::Network("offline".to_string())));

        let outcome = block_on(f.vm.sign_in("ada@x.io", "secret")).unwrap();

        assert_eq!(
            outcome,
            SignInOutcome::VerificationRequired {
                email: "ada@x.io".to_string(),
                otp_resent: false
            }
        );
        assert_eq!(f.navigator.routes(), vec![VERIFY_OTP_ROUTE.to_string()]);
        assert_eq!(
            f.notifier.notifications().last(),
            Some(&Notification::Error("Failed to send OTP. Please try refreshing.".to_string()))
        );
    }

    #[test]
    fn other_rejections_surface_the_server_message() {
        let f = fixture();
        f.vm.api.set_sign_in_response(Err(rejected(401, "Invalid credentials")));

        let result = block_on(f.vm.sign_in("ada@x.io", "wrong"));

        assert_eq!(result, Err(AuthError::Api(rejected(401, "Invalid credentials"))));
        assert_eq!(
            f.notifier.notifications(),
            vec![Notification::Error("Invalid credentials".to_string())]
        );
        assert!(f.vm.api.resend_requests().is_empty());
    }

    #[test]
    fn rate_limit_message_reaches_the_user() {
        let f = fixture();
        f.vm.api.set_sign_in_response(Err(ApiError::RateLimited {
            message: "Too many requests".to_string(),
        }));

        let result = block_on(f.vm.sign_in("ada@x.io", "secret"));
        assert!(matches!(result, Err(AuthError::Api(ref e)) if e.is_rate_limit()));
        assert_eq!(
            f.notifier.notifications(),
            vec![Notification::Error("Too many requests".to_string())]
        );
    }

    #[test]
    fn verify_otp_logs_in_and_goes_to_the_dashboard() {
        let f = fixture();
        f.vm.api
            .set_verify_response(Ok(json!({ "accessToken": "tok2", "fullName": "B" })));
        let mut otp = complete_code("1234");

        assert_eq!(block_on(f.vm.verify_otp("b@x.io", &mut otp)), Ok(true));
        assert!(f.vm.store().is_authenticated());
        assert_eq!(f.navigator.routes(), vec![DASHBOARD_ROUTE.to_string()]);
        assert_eq!(f.vm.api.verify_requests(), vec![("b@x.io".to_string(), "1234".to_string())]);
    }

    #[test]
    fn verification_without_credential_does_not_claim_a_login() {
        let f = fixture();
        f.vm.store().login("old", UserProfile::default());
        f.vm.api.set_verify_response(Ok(json!({
            "success": true,
            "message": "Email verified successfully"
        })));
        let mut otp = complete_code("1234");

        assert_eq!(block_on(f.vm.verify_otp("b@x.io", &mut otp)), Ok(false));
        assert_eq!(f.vm.store().token().as_deref(), Some("old"));
        assert_eq!(
            f.notifier.notifications(),
            vec![Notification::Success("Verified Successfully".to_string())]
        );
        assert_eq!(f.navigator.routes(), vec![AUTH_ROUTE.to_string()]);
    }

    #[test]
    fn verify_otp_checks_email_and_code_first() {
        let f = fixture();

        let mut otp = complete_code("1234");
        assert_eq!(block_on(f.vm.verify_otp("", &mut otp)), Err(AuthError::EmailRequired));
        assert_eq!(f.navigator.routes(), vec![AUTH_ROUTE.to_string()]);

        let mut partial = complete_code("12");
        assert_eq!(block_on(f.vm.verify_otp("b@x.io", &mut partial)), Err(AuthError::IncompleteOtp));
        assert_eq!(
            f.notifier.notifications().last(),
            Some(&Notification::Error("Incomplete Sequence".to_string()))
        );
        assert!(f.vm.api.verify_requests().is_empty());
    }

    #[test]
    fn rejected_code_is_cleared() {
        let f = fixture();
        f.vm.api.set_verify_response(Err(ApiError::Http {
            status: 400,
            message: None,
        }));
        let mut otp = complete_code("9999");

        let result = block_on(f.vm.verify_otp("b@x.io", &mut otp));

        assert!(matches!(result, Err(AuthError::Api(_))));
        assert_eq!(otp, OtpCode::new());
        assert_eq!(
            f.notifier.notifications(),
            vec![Notification::Error("Protocol Mismatch".to_string())]
        );
        assert!(!f.vm.store().is_authenticated());
    }

    #[test]
    fn resend_otp_reports_success() {
        let f = fixture();
        f.vm.api.set_resend_response(Ok(ApiMessage {
            success: Some(true),
            message: Some("OTP resent successfully".to_string()),
            email: None,
        }));

        assert_eq!(block_on(f.vm.resend_otp("b@x.io")), Ok(()));
        assert_eq!(block_on(f.vm.resend_otp("")), Err(AuthError::EmailRequired));
        assert_eq!(f.vm.api.resend_requests(), vec!["b@x.io".to_string()]);
    }

    #[test]
    fn outcomes_serialize_for_the_view_layer() {
        let pending = SignInOutcome::VerificationRequired {
            email: "ada@x.io".to_string(),
            otp_resent: false,
        };
        assert_eq!(
            pending.to_json(),
            json!({ "status": "verification_required", "email": "ada@x.io", "otpResent": false })
        );

        let user: UserProfile = serde_json::from_value(json!({ "fullName": "Ada" })).unwrap();
        assert_eq!(
            SignInOutcome::Authenticated(user).to_json(),
            json!({ "status": "authenticated", "user": { "fullName": "Ada" } })
        );
    }

    #[test]
    fn logout_ends_the_session_and_returns_to_auth() {
        let f = fixture();
        f.vm.store().login("tok", UserProfile::default());

        f.vm.logout();

        assert!(!f.vm.store().is_authenticated());
        assert_eq!(f.navigator.routes(), vec![AUTH_ROUTE.to_string()]);
    }
}
