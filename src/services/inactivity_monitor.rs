// ============================================================================
// INACTIVITY MONITOR - Ends the session after a period without interaction
// ============================================================================
// Idle -> Running      start()
// Running -> Warned    warning timer elapsed (timeout - lead), once per window
// Running|Warned -> Expired   expiry timer elapsed
// Running|Warned -> Running   record_activity(): both timers replaced
// any -> Idle          stop() / last handle dropped
//
// Timers are owned as handles in the monitor core. Replacing or dropping a
// handle cancels its timer, so a countdown from an older window never fires.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::InactivityConfig;
use crate::services::timer::TimerScheduler;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InactivityPhase {
    Idle,
    Running,
    Warned,
    Expired,
}

/// Reactions to the two countdowns.
pub trait InactivityHandler {
    /// The session will expire in `remaining` unless the user interacts.
    fn on_warning(&self, remaining: Duration);
    /// The full timeout elapsed without interaction.
    fn on_expired(&self);
}

struct MonitorCore<H> {
    phase: InactivityPhase,
    warning_issued: bool,
    last_activity_at: Option<DateTime<Utc>>,
    warning_timer: Option<H>,
    expiry_timer: Option<H>,
}

impl<H> MonitorCore<H> {
    fn cancel_timers(&mut self) {
        self.warning_timer = None;
        self.expiry_timer = None;
    }
}

pub struct InactivityMonitor<S: TimerScheduler> {
    core: Rc<RefCell<MonitorCore<S::Handle>>>,
    scheduler: Rc<S>,
    config: InactivityConfig,
    handler: Rc<dyn InactivityHandler>,
}

impl<S: TimerScheduler> Clone for InactivityMonitor<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            scheduler: self.scheduler.clone(),
            config: self.config,
            handler: self.handler.clone(),
        }
    }
}

impl<S> InactivityMonitor<S>
where
    S: TimerScheduler + 'static,
    S::Handle: 'static,
{
    pub fn new(scheduler: Rc<S>, config: InactivityConfig, handler: Rc<dyn InactivityHandler>) -> Self {
        Self {
            core: Rc::new(RefCell::new(MonitorCore {
                phase: InactivityPhase::Idle,
                warning_issued: false,
                last_activity_at: None,
                warning_timer: None,
                expiry_timer: None,
            })),
            scheduler,
            config,
            handler,
        }
    }

    /// Begins a countdown window. Restarts the window if one is already running.
    pub fn start(&self) {
        log::info!(
            "⏱️ [INACTIVITY] Monitoring started (timeout {}s, warning {}s before)",
            self.config.timeout.as_secs(),
            self.config.warning_lead.as_secs()
        );
        self.arm();
    }

    /// Qualifying interaction: replaces both countdowns with fresh ones.
    pub fn record_activity(&self) {
        let phase = self.core.borrow().phase;
        match phase {
            InactivityPhase::Running | InactivityPhase::Warned => self.arm(),
            InactivityPhase::Idle | InactivityPhase::Expired => {}
        }
    }

    /// Cancels both countdowns and returns to Idle.
    pub fn stop(&self) {
        let mut core = self.core.borrow_mut();
        if core.phase != InactivityPhase::Idle {
            log::info!("⏹️ [INACTIVITY] Monitoring stopped");
        }
        core.cancel_timers();
        core.phase = InactivityPhase::Idle;
        core.warning_issued = false;
    }

    pub fn phase(&self) -> InactivityPhase {
        self.core.borrow().phase
    }

    pub fn warning_issued(&self) -> bool {
        self.core.borrow().warning_issued
    }

    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.core.borrow().last_activity_at
    }

    fn arm(&self) {
        {
            let mut core = self.core.borrow_mut();
            core.cancel_timers();
            core.phase = InactivityPhase::Running;
            core.warning_issued = false;
            core.last_activity_at = Some(Utc::now());
        }

        let warning_timer = self.config.warning_delay().map(|delay| {
            let core = Rc::downgrade(&self.core);
            let handler = self.handler.clone();
            let lead = self.config.warning_lead;
            self.scheduler
                .schedule(delay, Box::new(move || warning_elapsed(&core, &*handler, lead)))
        });

        let expiry_timer = {
            let core = Rc::downgrade(&self.core);
            let handler = self.handler.clone();
            self.scheduler
                .schedule(self.config.timeout, Box::new(move || expiry_elapsed(&core, &*handler)))
        };

        let mut core = self.core.borrow_mut();
        core.warning_timer = warning_timer;
        core.expiry_timer = Some(expiry_timer);
    }
}

fn warning_elapsed<H>(core: &Weak<RefCell<MonitorCore<H>>>, handler: &dyn InactivityHandler, lead: Duration) {
    let Some(core) = core.upgrade() else {
        return;
    };
    let issue = {
        let mut core = core.borrow_mut();
        if core.phase == InactivityPhase::Running && !core.warning_issued {
            core.warning_issued = true;
            core.phase = InactivityPhase::Warned;
            true
        } else {
            false
        }
    };
    if issue {
        log::warn!("⚠️ [INACTIVITY] Session expires in {}s", lead.as_secs());
        handler.on_warning(lead);
    }
}

fn expiry_elapsed<H>(core: &Weak<RefCell<MonitorCore<H>>>, handler: &dyn InactivityHandler) {
    let Some(core) = core.upgrade() else {
        return;
    };
    let expire = {
        let mut core = core.borrow_mut();
        match core.phase {
            InactivityPhase::Running | InactivityPhase::Warned => {
                core.phase = InactivityPhase::Expired;
                core.warning_timer = None;
                true
            }
            InactivityPhase::Idle | InactivityPhase::Expired => false,
        }
    };
    if expire {
        log::warn!("⏱️ [INACTIVITY] Inactivity timeout reached");
        handler.on_expired();
    }
}
