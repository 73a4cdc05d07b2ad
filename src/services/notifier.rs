use std::time::Duration;

use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::{CustomEvent, CustomEventInit, Event};

use crate::utils::NOTIFICATION_EVENT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    InactivityWarning { remaining: Duration },
    SessionExpired,
    Success(String),
    Info(String),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Payload handed to the toaster in the view layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDetail {
    pub level: NotificationLevel,
    pub message: String,
    pub icon: Option<&'static str>,
    pub duration_ms: u32,
}

impl Notification {
    pub fn level(&self) -> NotificationLevel {
        match self {
            Notification::InactivityWarning { .. } => NotificationLevel::Warning,
            Notification::SessionExpired | Notification::Error(_) => NotificationLevel::Error,
            Notification::Success(_) => NotificationLevel::Success,
            Notification::Info(_) => NotificationLevel::Info,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notification::InactivityWarning { remaining } => {
                let minutes = remaining.as_secs() / 60;
                if minutes == 1 {
                    "Session expiring in 1 minute due to inactivity".to_string()
                } else if minutes > 1 {
                    format!("Session expiring in {} minutes due to inactivity", minutes)
                } else {
                    format!("Session expiring in {} seconds due to inactivity", remaining.as_secs())
                }
            }
            Notification::SessionExpired => "Session expired due to inactivity".to_string(),
            Notification::Success(text) | Notification::Info(text) | Notification::Error(text) => text.clone(),
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            Notification::InactivityWarning { .. } => Some("⚠️"),
            Notification::SessionExpired => Some("⏱️"),
            _ => None,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        match self {
            Notification::InactivityWarning { .. } => 5000,
            Notification::SessionExpired => 4000,
            _ => 3000,
        }
    }

    pub fn detail(&self) -> NotificationDetail {
        NotificationDetail {
            level: self.level(),
            message: self.message(),
            icon: self.icon(),
            duration_ms: self.duration_ms(),
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

pub trait Navigator {
    fn navigate(&self, route: &str);
}

/// Dispatches `arribot:notification` on `window` with the JSON detail.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNotifier;

impl Notifier for BrowserNotifier {
    fn notify(&self, notification: Notification) {
        let detail = notification.detail();
        log::info!("🔔 [NOTIFY] {:?}: {}", detail.level, detail.message);

        if let Err(e) = dispatch_notification(&detail) {
            log::error!("❌ [NOTIFY] Could not dispatch notification: {:?}", e);
        }
    }
}

fn dispatch_notification(detail: &NotificationDetail) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let json = serde_json::to_string(detail).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(&json));
    let event = CustomEvent::new_with_event_init_dict(NOTIFICATION_EVENT, &init)?;
    window.dispatch_event(&event)?;
    Ok(())
}

/// Pushes a history entry and emits `popstate` so the router picks it up.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, route: &str) {
        log::info!("🧭 [NAV] Navigating to {}", route);
        if let Err(e) = push_route(route) {
            log::error!("❌ [NAV] Navigation to {} failed: {:?}", route, e);
        }
    }
}

fn push_route(route: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    window
        .history()?
        .push_state_with_url(&JsValue::NULL, "", Some(route))?;
    window.dispatch_event(&Event::new("popstate")?)?;
    Ok(())
}
