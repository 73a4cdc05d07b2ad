// ============================================================================
// ARRIBOT WEB - Session core of the front end (Rust + WASM)
// ============================================================================
// Layers:
// - Models: data shared with the backend and the view layer
// - Services: HTTP, timers, window listeners, notifications (no state)
// - State: session store and inactivity guard (Rc<RefCell> + subscribers)
// - ViewModels: sign-up / sign-in / OTP flows
// The pages themselves live in the JS view layer and call the exports below.
// ============================================================================

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;

#[cfg(test)]
pub(crate) mod testing;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app::App;
use crate::config::CONFIG;
use crate::models::{OtpCode, UserProfile};
use crate::services::api_client::{failure_text, parse_request_body};
use crate::viewmodels::SignUpForm;

// Single App instance for the lifetime of the page
thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let level = if CONFIG.is_logging_enabled() {
        log::Level::Info
    } else {
        log::Level::Warn
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    log::info!("🚀 Arribot session core ({})", CONFIG.environment);

    let app = App::new();
    APP.with(|cell| {
        *cell.borrow_mut() = Some(app);
    });
    Ok(())
}

fn with_app<R>(f: impl FnOnce(&App) -> R) -> Result<R, JsValue> {
    APP.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(f)
            .ok_or_else(|| JsValue::from_str("app is not initialised"))
    })
}

#[wasm_bindgen]
pub fn is_authenticated() -> bool {
    with_app(|app| app.store().is_authenticated()).unwrap_or(false)
}

/// Profile of the logged-in user as a JSON string.
#[wasm_bindgen]
pub fn current_user() -> Option<String> {
    let user = with_app(|app| app.store().user()).ok().flatten()?;
    serde_json::to_string(&user).ok()
}

#[wasm_bindgen]
pub fn current_token() -> Option<String> {
    with_app(|app| app.store().token()).ok().flatten()
}

#[wasm_bindgen]
pub fn login(token: String, user_json: &str) -> Result<(), JsValue> {
    let user: UserProfile = serde_json::from_str(user_json)
        .map_err(|e| JsValue::from_str(&format!("invalid user profile: {}", e)))?;
    with_app(|app| app.store().login(token, user))
}

#[wasm_bindgen]
pub fn logout() -> Result<(), JsValue> {
    let auth = with_app(|app| app.auth())?;
    auth.logout();
    Ok(())
}

/// Resolves to `{ status, ... }` (see `SignInOutcome::to_json`).
#[wasm_bindgen]
pub fn sign_in(email: String, password: String) -> js_sys::Promise {
    let auth = with_app(|app| app.auth());
    future_to_promise(async move {
        let auth = auth?;
        let outcome = auth
            .sign_in(&email, &password)
            .await
            .map_err(|e| JsValue::from_str(&e.user_message()))?;
        Ok(JsValue::from_str(&outcome.to_json().to_string()))
    })
}

/// Resolves to the address the verification code was sent to.
#[wasm_bindgen]
pub fn sign_up(full_name: String, email: String, password: String, confirm_password: String) -> js_sys::Promise {
    let auth = with_app(|app| app.auth());
    let form = SignUpForm {
        full_name,
        email,
        password,
        confirm_password,
    };
    future_to_promise(async move {
        let auth = auth?;
        let email = auth
            .sign_up(&form)
            .await
            .map_err(|e| JsValue::from_str(&e.user_message()))?;
        Ok(JsValue::from_str(&email))
    })
}

/// Resolves to whether a session was established.
#[wasm_bindgen]
pub fn verify_otp(email: String, code: String) -> js_sys::Promise {
    let auth = with_app(|app| app.auth());
    future_to_promise(async move {
        let auth = auth?;
        // A code of the wrong length reaches the flow as an incomplete one
        let mut otp = OtpCode::from_code(&code).unwrap_or_default();
        let authenticated = auth
            .verify_otp(&email, &mut otp)
            .await
            .map_err(|e| JsValue::from_str(&e.user_message()))?;
        Ok(JsValue::from_bool(authenticated))
    })
}

#[wasm_bindgen]
pub fn resend_otp(email: String) -> js_sys::Promise {
    let auth = with_app(|app| app.auth());
    future_to_promise(async move {
        let auth = auth?;
        auth.resend_otp(&email)
            .await
            .map_err(|e| JsValue::from_str(&e.user_message()))?;
        Ok(JsValue::UNDEFINED)
    })
}

/// GET against the backend with the current session's bearer token.
/// Resolves to the response body as a JSON string.
#[wasm_bindgen]
pub fn api_get(path: String) -> js_sys::Promise {
    let api = with_app(|app| app.api());
    future_to_promise(async move {
        let body = api?
            .get_json(&path)
            .await
            .map_err(|e| JsValue::from_str(&failure_text(&e)))?;
        Ok(JsValue::from_str(&serde_json::Value::Object(body).to_string()))
    })
}

/// POST `body_json` with the current session's bearer token.
/// Resolves to the response body as a JSON string.
#[wasm_bindgen]
pub fn api_post(path: String, body_json: String) -> js_sys::Promise {
    let api = with_app(|app| app.api());
    future_to_promise(async move {
        let api = api?;
        let payload = parse_request_body(&body_json).map_err(|e| JsValue::from_str(&failure_text(&e)))?;
        let body = api
            .post_json(&path, &payload)
            .await
            .map_err(|e| JsValue::from_str(&failure_text(&e)))?;
        Ok(JsValue::from_str(&serde_json::Value::Object(body).to_string()))
    })
}

#[wasm_bindgen]
pub fn mask_email(email: &str) -> String {
    models::mask_email(email)
}
