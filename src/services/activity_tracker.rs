// ============================================================================
// ACTIVITY TRACKER - Passive window listeners for user interaction
// ============================================================================
// Unlike the app-lifetime listeners registered once at startup, these come and
// go with every session, so the closures are kept and removed on Drop instead
// of being forgotten.
// ============================================================================

use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

use crate::utils::ACTIVITY_EVENTS;

/// Source of "the user is still here" signals.
pub trait ActivitySource {
    /// Live while held; dropping it stops delivery to `on_activity`.
    type Subscription;

    fn subscribe(&self, on_activity: Rc<dyn Fn()>) -> Result<Self::Subscription, String>;
}

/// Interaction events on `window`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowActivitySource;

impl ActivitySource for WindowActivitySource {
    type Subscription = ActivityListeners;

    fn subscribe(&self, on_activity: Rc<dyn Fn()>) -> Result<ActivityListeners, String> {
        let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
        ActivityListeners::attach(window.into(), on_activity)
    }
}

/// Registered listeners; removed from the target when dropped.
pub struct ActivityListeners {
    target: EventTarget,
    closures: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl ActivityListeners {
    pub fn attach(target: EventTarget, on_activity: Rc<dyn Fn()>) -> Result<Self, String> {
        // Passive: never delays the browser's default handling of the event
        let options = AddEventListenerOptions::new();
        options.set_passive(true);

        let mut listeners = Self {
            target,
            closures: Vec::with_capacity(ACTIVITY_EVENTS.len()),
        };

        for event_name in ACTIVITY_EVENTS {
            let on_activity = on_activity.clone();
            let closure = Closure::wrap(Box::new(move |_event: Event| {
                on_activity();
            }) as Box<dyn FnMut(Event)>);

            // Already-registered listeners are removed by Drop on early return
            listeners
                .target
                .add_event_listener_with_callback_and_add_event_listener_options(
                    event_name,
                    closure.as_ref().unchecked_ref(),
                    &options,
                )
                .map_err(|e| format!("failed to listen for `{}`: {:?}", event_name, e))?;
            listeners.closures.push((event_name, closure));
        }

        log::info!("👂 [ACTIVITY] Listening for {} interaction events", listeners.closures.len());
        Ok(listeners)
    }
}

impl Drop for ActivityListeners {
    fn drop(&mut self) {
        for (event_name, closure) in &self.closures {
            let _ = self
                .target
                .remove_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
        }
        log::info!("🔌 [ACTIVITY] Interaction listeners removed");
    }
}
