// ============================================================================
// SESSION GUARD - Inactivity monitoring bound to the session lifetime
// ============================================================================
// Authenticated  -> activity listeners attached, monitor running
// Logged out     -> listeners removed, monitor idle
//
// Follows the store through its subscription, so a logout of any cause
// (manual, inactivity, another flow) tears monitoring down.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::InactivityConfig;
use crate::models::LogoutReason;
use crate::services::{
    ActivitySource, InactivityHandler, InactivityMonitor, Navigator, Notification, Notifier,
    TimerScheduler,
};
use crate::state::session_store::SessionStore;
use crate::utils::AUTH_ROUTE;

/// Warns the user, then ends the session and sends them to the auth page.
pub struct SessionExpiryHandler {
    store: SessionStore,
    notifier: Rc<dyn Notifier>,
    navigator: Rc<dyn Navigator>,
}

impl SessionExpiryHandler {
    pub fn new(store: SessionStore, notifier: Rc<dyn Notifier>, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            store,
            notifier,
            navigator,
        }
    }
}

impl InactivityHandler for SessionExpiryHandler {
    fn on_warning(&self, remaining: Duration) {
        if self.store.is_authenticated() {
            self.notifier.notify(Notification::InactivityWarning { remaining });
        }
    }

    fn on_expired(&self) {
        if !self.store.is_authenticated() {
            return;
        }
        self.store.logout_with_reason(LogoutReason::Inactivity);
        self.notifier.notify(Notification::SessionExpired);
        self.navigator.navigate(AUTH_ROUTE);
    }
}

struct GuardInner<S: TimerScheduler, A: ActivitySource> {
    monitor: InactivityMonitor<S>,
    source: A,
    subscription: RefCell<Option<A::Subscription>>,
}

impl<S, A> GuardInner<S, A>
where
    S: TimerScheduler + 'static,
    S::Handle: 'static,
    A: ActivitySource,
{
    fn sync(&self, authenticated: bool) {
        if authenticated {
            self.activate();
        } else {
            self.deactivate();
        }
    }

    fn activate(&self) {
        if self.subscription.borrow().is_none() {
            let monitor = self.monitor.clone();
            let on_activity: Rc<dyn Fn()> = Rc::new(move || monitor.record_activity());
            match self.source.subscribe(on_activity) {
                Ok(subscription) => *self.subscription.borrow_mut() = Some(subscription),
                Err(e) => log::error!("❌ [GUARD] Could not track user activity: {}", e),
            }
        }
        // A fresh login always opens a new window
        self.monitor.start();
    }

    fn deactivate(&self) {
        self.monitor.stop();
        let subscription = self.subscription.borrow_mut().take();
        drop(subscription);
    }
}

/// Keeps an inactivity monitor running exactly while the store is authenticated.
pub struct SessionGuard<S: TimerScheduler, A: ActivitySource> {
    inner: Rc<GuardInner<S, A>>,
}

impl<S, A> SessionGuard<S, A>
where
    S: TimerScheduler + 'static,
    S::Handle: 'static,
    A: ActivitySource + 'static,
    A::Subscription: 'static,
{
    pub fn new(
        store: &SessionStore,
        scheduler: Rc<S>,
        source: A,
        config: InactivityConfig,
        notifier: Rc<dyn Notifier>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let handler = Rc::new(SessionExpiryHandler::new(store.clone(), notifier, navigator));
        let inner = Rc::new(GuardInner {
            monitor: InactivityMonitor::new(scheduler, config, handler),
            source,
            subscription: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        store.subscribe(move |session| {
            if let Some(inner) = weak.upgrade() {
                inner.sync(session.is_authenticated());
            }
        });

        // Session restored from storage
        inner.sync(store.is_authenticated());
        Self { inner }
    }

    pub fn monitor(&self) -> &InactivityMonitor<S> {
        &self.inner.monitor
    }

    /// Whether activity listeners are currently attached.
    pub fn is_tracking_activity(&self) -> bool {
        self.inner.subscription.borrow().is_some()
    }
}
