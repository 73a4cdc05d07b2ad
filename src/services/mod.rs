pub mod activity_tracker;
pub mod api_client;
pub mod auth_service;
pub mod inactivity_monitor;
pub mod notifier;
pub mod timer;

pub use activity_tracker::{ActivityListeners, ActivitySource, WindowActivitySource};
pub use api_client::ApiClient;
pub use auth_service::AuthApi;
pub use inactivity_monitor::{InactivityHandler, InactivityMonitor, InactivityPhase};
pub use notifier::{BrowserNavigator, BrowserNotifier, Navigator, Notification, NotificationLevel, Notifier};
pub use timer::{BrowserScheduler, TimerScheduler};
