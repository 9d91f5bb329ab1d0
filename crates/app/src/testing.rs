//! In-memory port implementations for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use tokio::sync::Semaphore;

use loopctl_domain::command::CommandOutcome;
use loopctl_domain::constraint::ConstraintResult;
use loopctl_domain::error::LoopError;
use loopctl_domain::event::LoopEvent;
use loopctl_domain::notice::UserNotice;
use loopctl_domain::offline::OfflineEvent;
use loopctl_domain::profile::Profile;
use loopctl_domain::time::Timestamp;

use crate::ports::{
    Clock, ConstraintEvaluator, EventPublisher, OfflineEventStore, ProfileProvider,
    PumpCapabilityProvider, PumpCommandQueue, SettingWrite, SettingsStore, UserNotifier,
};

fn injected(what: &str) -> LoopError {
    LoopError::Storage(format!("injected {what} failure").into())
}

#[derive(Debug, Clone, PartialEq)]
enum Stored {
    String(String),
    Bool(bool),
}

#[derive(Default)]
pub struct InMemorySettings {
    values: Mutex<HashMap<String, Stored>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemorySettings {
    pub fn seed_string(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), Stored::String(value.to_string()));
    }

    pub fn seed_bool(&self, key: &str, value: bool) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), Stored::Bool(value));
    }

    pub fn get_string_now(&self, key: &str) -> Option<String> {
        match self.values.lock().unwrap().get(key) {
            Some(Stored::String(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn get_bool_now(&self, key: &str) -> Option<bool> {
        match self.values.lock().unwrap().get(key) {
            Some(Stored::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

impl SettingsStore for InMemorySettings {
    async fn get_string(&self, key: &str, default: &str) -> Result<String, LoopError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        Ok(self.get_string_now(key).unwrap_or_else(|| default.to_string()))
    }

    async fn get_bool(&self, key: &str, default: bool) -> Result<bool, LoopError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        Ok(self.get_bool_now(key).unwrap_or(default))
    }

    async fn write(&self, batch: Vec<SettingWrite>) -> Result<(), LoopError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("write"));
        }
        let mut values = self.values.lock().unwrap();
        for write in batch {
            match write {
                SettingWrite::String { key, value } => {
                    values.insert(key, Stored::String(value));
                }
                SettingWrite::Bool { key, value } => {
                    values.insert(key, Stored::Bool(value));
                }
                SettingWrite::Remove { key } => {
                    values.remove(&key);
                }
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct StaticConstraints {
    closed_loop: Mutex<ConstraintResult>,
    low_glucose_suspend: Mutex<ConstraintResult>,
}

impl Default for StaticConstraints {
    fn default() -> Self {
        Self {
            closed_loop: Mutex::new(ConstraintResult::Allowed),
            low_glucose_suspend: Mutex::new(ConstraintResult::Allowed),
        }
    }
}

impl StaticConstraints {
    pub fn set_closed_loop(&self, result: ConstraintResult) {
        *self.closed_loop.lock().unwrap() = result;
    }

    pub fn set_low_glucose_suspend(&self, result: ConstraintResult) {
        *self.low_glucose_suspend.lock().unwrap() = result;
    }
}

impl ConstraintEvaluator for StaticConstraints {
    async fn is_closed_loop_allowed(&self) -> ConstraintResult {
        *self.closed_loop.lock().unwrap()
    }

    async fn is_low_glucose_suspend_allowed(&self) -> ConstraintResult {
        *self.low_glucose_suspend.lock().unwrap()
    }
}

pub struct FakeProfiles {
    profile: Mutex<Option<Profile>>,
}

impl Default for FakeProfiles {
    fn default() -> Self {
        Self {
            profile: Mutex::new(Some(Profile::new("Default"))),
        }
    }
}

impl FakeProfiles {
    pub fn clear(&self) {
        *self.profile.lock().unwrap() = None;
    }
}

impl ProfileProvider for FakeProfiles {
    async fn get_profile(&self) -> Option<Profile> {
        self.profile.lock().unwrap().clone()
    }

    async fn is_profile_valid(&self, _context: &str) -> bool {
        self.profile.lock().unwrap().is_some()
    }
}

/// Pump fake. A holding pump answers only once [`release`](Self::release)d.
pub struct FakePump {
    disconnect_15m: bool,
    disconnect_30m: bool,
    outcome: Mutex<CommandOutcome>,
    calls: AtomicUsize,
    last_enforce_new: Mutex<Option<bool>>,
    gate: Option<Semaphore>,
    panic_next: AtomicBool,
}

impl Default for FakePump {
    fn default() -> Self {
        Self {
            disconnect_15m: true,
            disconnect_30m: true,
            outcome: Mutex::new(CommandOutcome::Success),
            calls: AtomicUsize::new(0),
            last_enforce_new: Mutex::new(None),
            gate: None,
            panic_next: AtomicBool::new(false),
        }
    }
}

impl FakePump {
    pub fn holding() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// The first cancellation panics inside the driver; later ones succeed.
    pub fn panicking_once() -> Self {
        Self {
            panic_next: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn without_short_disconnects() -> Self {
        Self {
            disconnect_15m: false,
            disconnect_30m: false,
            ..Self::default()
        }
    }

    pub fn set_outcome(&self, outcome: CommandOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn cancel_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_enforce_new(&self) -> Option<bool> {
        *self.last_enforce_new.lock().unwrap()
    }
}

impl PumpCapabilityProvider for FakePump {
    fn supports_disconnect_duration(&self, minutes: u32) -> bool {
        match minutes {
            15 => self.disconnect_15m,
            30 => self.disconnect_30m,
            _ => true,
        }
    }
}

impl PumpCommandQueue for FakePump {
    async fn cancel_temp_basal(&self, enforce_new: bool) -> CommandOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("pump driver crashed");
        }
        *self.last_enforce_new.lock().unwrap() = Some(enforce_new);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.outcome.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct RecordingOfflineStore {
    records: Mutex<Vec<OfflineEvent>>,
    fail: AtomicBool,
}

impl RecordingOfflineStore {
    pub fn records(&self) -> Vec<OfflineEvent> {
        self.records.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl OfflineEventStore for RecordingOfflineStore {
    async fn record(&self, event: OfflineEvent) -> Result<OfflineEvent, LoopError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected("offline record"));
        }
        self.records.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<OfflineEvent>, LoopError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingBus {
    events: Mutex<Vec<LoopEvent>>,
}

impl RecordingBus {
    pub fn events(&self) -> Vec<LoopEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingBus {
    async fn publish(&self, event: LoopEvent) -> Result<(), LoopError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<UserNotice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<UserNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl UserNotifier for RecordingNotifier {
    async fn notify(&self, notice: UserNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(loopctl_domain::time::now())),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}
