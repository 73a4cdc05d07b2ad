// ============================================================================
// TEST DOUBLES - In-memory stand-ins for the browser and the backend
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::models::{ApiMessage, ResendOtpRequest, SignInRequest, SignUpRequest, VerifyOtpRequest};
use crate::services::{ActivitySource, AuthApi, Navigator, Notification, Notifier, TimerScheduler};

struct ScheduledTimer {
    id: u64,
    due: Duration,
    callback: Box<dyn FnOnce()>,
    cancelled: Rc<Cell<bool>>,
}

/// Virtual clock. Timers only fire from `advance`, in due order.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    queue: RefCell<Vec<ScheduledTimer>>,
}

pub struct ManualHandle {
    cancelled: Rc<Cell<bool>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Moves the clock forward, running every live timer due on the way.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                queue.retain(|timer| !timer.cancelled.get());
                let earliest = queue
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(index, _)| index);
                earliest.map(|index| queue.remove(index))
            };
            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            (timer.callback)();
        }
        self.now.set(target);
    }

    /// Timers scheduled and neither fired nor cancelled.
    pub fn pending(&self) -> usize {
        self.queue
            .borrow()
            .iter()
            .filter(|timer| !timer.cancelled.get())
            .count()
    }
}

impl TimerScheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> ManualHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let cancelled = Rc::new(Cell::new(false));
        self.queue.borrow_mut().push(ScheduledTimer {
            id,
            due: self.now.get() + delay,
            callback,
            cancelled: cancelled.clone(),
        });
        ManualHandle { cancelled }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.borrow_mut().push(route.to_string());
    }
}

type Listeners = Rc<RefCell<Vec<(u64, Rc<dyn Fn()>)>>>;

/// Activity fired by hand with `emit`.
#[derive(Clone, Default)]
pub struct ManualActivitySource {
    listeners: Listeners,
    next_id: Rc<Cell<u64>>,
}

pub struct ManualSubscription {
    id: u64,
    listeners: Listeners,
}

impl Drop for ManualSubscription {
    fn drop(&mut self) {
        self.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
    }
}

impl ManualActivitySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl ActivitySource for ManualActivitySource {
    type Subscription = ManualSubscription;

    fn subscribe(&self, on_activity: Rc<dyn Fn()>) -> Result<ManualSubscription, String> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, on_activity));
        Ok(ManualSubscription {
            id,
            listeners: self.listeners.clone(),
        })
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Scripted backend. Every call is recorded; responses default to success.
#[derive(Default)]
pub struct FakeAuthApi {
    sign_up_response: RefCell<Option<Result<ApiMessage, ApiError>>>,
    verify_response: RefCell<Option<Result<Map<String, Value>, ApiError>>>,
    sign_in_response: RefCell<Option<Result<Map<String, Value>, ApiError>>>,
    resend_response: RefCell<Option<Result<ApiMessage, ApiError>>>,
    during_verify: RefCell<Option<Box<dyn Fn()>>>,
    sign_up_requests: RefCell<Vec<SignUpRequest>>,
    verify_requests: RefCell<Vec<(String, String)>>,
    sign_in_requests: RefCell<Vec<String>>,
    resend_requests: RefCell<Vec<String>>,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sign_up_response(&self, response: Result<ApiMessage, ApiError>) {
        *self.sign_up_response.borrow_mut() = Some(response);
    }

    pub fn set_verify_response(&self, response: Result<Value, ApiError>) {
        *self.verify_response.borrow_mut() = Some(response.map(object));
    }

    pub fn set_sign_in_response(&self, response: Result<Value, ApiError>) {
        *self.sign_in_response.borrow_mut() = Some(response.map(object));
    }

    pub fn set_resend_response(&self, response: Result<ApiMessage, ApiError>) {
        *self.resend_response.borrow_mut() = Some(response);
    }

    /// Runs while the verification request is "in flight".
    pub fn during_verify(&self, action: impl Fn() + 'static) {
        *self.during_verify.borrow_mut() = Some(Box::new(action));
    }

    pub fn sign_up_requests(&self) -> Vec<SignUpRequest> {
        self.sign_up_requests.borrow().clone()
    }

    pub fn verify_requests(&self) -> Vec<(String, String)> {
        self.verify_requests.borrow().clone()
    }

    pub fn sign_in_requests(&self) -> Vec<String> {
        self.sign_in_requests.borrow().clone()
    }

    pub fn resend_requests(&self) -> Vec<String> {
        self.resend_requests.borrow().clone()
    }
}

impl AuthApi for FakeAuthApi {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<ApiMessage, ApiError> {
        self.sign_up_requests.borrow_mut().push(request.clone());
        self.sign_up_response.borrow().clone().unwrap_or_else(|| Ok(ApiMessage::default()))
    }

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Map<String, Value>, ApiError> {
        self.verify_requests
            .borrow_mut()
            .push((request.email.clone(), request.otp.clone()));
        if let Some(action) = self.during_verify.borrow().as_ref() {
            action();
        }
        self.verify_response.borrow().clone().unwrap_or_else(|| Ok(Map::new()))
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<Map<String, Value>, ApiError> {
        self.sign_in_requests.borrow_mut().push(request.email.clone());
        self.sign_in_response.borrow().clone().unwrap_or_else(|| Ok(Map::new()))
    }

    async fn resend_otp(&self, request: &ResendOtpRequest) -> Result<ApiMessage, ApiError> {
        self.resend_requests.borrow_mut().push(request.email.clone());
        self.resend_response.borrow().clone().unwrap_or_else(|| Ok(ApiMessage::default()))
    }
}
