// ============================================================================
// APP - Wires the session core to the browser
// ============================================================================
// One instance per page: session store on localStorage, inactivity guard on
// setTimeout + window listeners, auth flows on the backend API.
// ============================================================================

use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::{CustomEvent, CustomEventInit};

use crate::config::CONFIG;
use crate::models::{Session, UserProfile};
use crate::services::{
    ApiClient, BrowserNavigator, BrowserNotifier, BrowserScheduler, Navigator, Notifier,
    WindowActivitySource,
};
use crate::state::{SessionGuard, SessionStore};
use crate::utils::{LocalStorage, SESSION_EVENT};
use crate::viewmodels::AuthViewModel;

pub struct App {
    store: SessionStore,
    auth: Rc<AuthViewModel<ApiClient>>,
    api: ApiClient,
    // Monitors the session for as long as the page lives
    _guard: SessionGuard<BrowserScheduler, WindowActivitySource>,
}

impl App {
    pub fn new() -> Self {
        let store = SessionStore::initialize(Rc::new(LocalStorage));
        store.subscribe(announce_session);

        let notifier: Rc<dyn Notifier> = Rc::new(BrowserNotifier);
        let navigator: Rc<dyn Navigator> = Rc::new(BrowserNavigator);

        let guard = SessionGuard::new(
            &store,
            Rc::new(BrowserScheduler),
            WindowActivitySource,
            CONFIG.inactivity(),
            notifier.clone(),
            navigator.clone(),
        );

        let api = ApiClient::from_config();
        let auth = Rc::new(AuthViewModel::new(api.clone(), store.clone(), notifier, navigator));

        log::info!(
            "✅ [APP] Session core ready (api {}, authenticated: {})",
            api.base_url(),
            store.is_authenticated()
        );

        Self {
            store,
            auth,
            api,
            _guard: guard,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Shared handle for async flows that outlive a borrow of the app.
    pub fn auth(&self) -> Rc<AuthViewModel<ApiClient>> {
        self.auth.clone()
    }

    /// Client for authenticated calls made by other parts of the front end.
    pub fn api(&self) -> ApiClient {
        self.store.authorized_client(&self.api)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct SessionDetail<'a> {
    authenticated: bool,
    user: Option<&'a UserProfile>,
}

fn session_detail_json(session: &Session) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SessionDetail {
        authenticated: session.is_authenticated(),
        user: session.user.as_ref(),
    })
}

fn announce_session(session: &Session) {
    if let Err(e) = dispatch_session_event(session) {
        log::error!("❌ [APP] Could not announce session change: {:?}", e);
    }
}

fn dispatch_session_event(session: &Session) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let json = session_detail_json(session).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(&json));
    let event = CustomEvent::new_with_event_init_dict(SESSION_EVENT, &init)?;
    window.dispatch_event(&event)?;
    Ok(())
}
