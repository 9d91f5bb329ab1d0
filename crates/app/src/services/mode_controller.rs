//! Mode controller: applies user loop actions.
//!
//! A transition runs entirely inside one [`StateTransaction`], so
//! transitions are serialised and each sees the effects of the previous
//! one. Within a transition the order is fixed: preconditions, persistence,
//! then pump command dispatch, audit record and events.

use std::sync::Arc;

use tokio::sync::broadcast;

use loopctl_domain::action::{DisconnectDuration, LoopAction, SuspendDuration};
use loopctl_domain::command::{CancelOrigin, CommandOutcome};
use loopctl_domain::constraint::ConstraintResult;
use loopctl_domain::display::{DisplayState, LoopSnapshot, derive_display_state};
use loopctl_domain::error::{LoopError, PreconditionError};
use loopctl_domain::event::{LoopEvent, SUSPEND_MENU};
use loopctl_domain::loop_state::{LoopState, LoopStatus};
use loopctl_domain::mode::AutomationMode;
use loopctl_domain::notice::{AlertSound, NO_PROFILE, TEMP_BASAL_DELIVERY_ERROR, UserNotice};
use loopctl_domain::offline::{OfflineEvent, OfflineReason, UNKNOWN_OFFLINE_MINUTES};
use loopctl_domain::time::Timestamp;

use crate::ports::control::{CommandReport, Transition};
use crate::ports::{
    Clock, ConstraintEvaluator, EventPublisher, LoopControl, OfflineEventStore, ProfileProvider,
    PumpCapabilityProvider, PumpCommandQueue, SettingWrite, SettingsStore, UserNotifier,
};
use crate::services::command_executor::{CommandExecutor, Dispatch};
use crate::services::loop_state_store::{LoopStateStore, StateTransaction, keys};

const PROFILE_CONTEXT: &str = "LoopControl";
const OPEN_LOOP_NOTIFICATION: &str = "open loop notification";
const OFFLINE_RECORD_FAILED: &str = "Failed to record loop offline period";

/// Tunables for the controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    /// Duration recorded when the loop is disabled, since the real one is
    /// not known yet.
    pub unknown_offline_minutes: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            unknown_offline_minutes: UNKNOWN_OFFLINE_MINUTES,
        }
    }
}

/// How a failed temp basal cancellation is surfaced.
#[derive(Debug, Clone, Copy)]
enum FailureSurface {
    Toast,
    Alert,
}

impl FailureSurface {
    fn notice(self, detail: String, at: Timestamp) -> UserNotice {
        match self {
            Self::Toast => UserNotice::toast(TEMP_BASAL_DELIVERY_ERROR, at),
            Self::Alert => {
                UserNotice::alert(TEMP_BASAL_DELIVERY_ERROR, detail, AlertSound::BolusError, at)
            }
        }
    }
}

pub struct ModeController<S, K, C, D, P, A, B, N> {
    state: LoopStateStore<S, K>,
    constraints: C,
    profiles: D,
    pump: Arc<P>,
    executor: CommandExecutor<P>,
    offline: A,
    bus: B,
    notifier: Arc<N>,
    settings: ControllerSettings,
}

impl<S, K, C, D, P, A, B, N> ModeController<S, K, C, D, P, A, B, N>
where
    S: SettingsStore + Send + Sync,
    K: Clock + Clone + Send + Sync + 'static,
    C: ConstraintEvaluator + Send + Sync,
    D: ProfileProvider + Send + Sync,
    P: PumpCapabilityProvider + PumpCommandQueue + Send + Sync + 'static,
    A: OfflineEventStore + Send + Sync,
    B: EventPublisher + Send + Sync,
    N: UserNotifier + Send + Sync + 'static,
{
    pub fn new(
        state: LoopStateStore<S, K>,
        constraints: C,
        profiles: D,
        pump: Arc<P>,
        offline: A,
        bus: B,
        notifier: Arc<N>,
    ) -> Self {
        let executor = CommandExecutor::new(Arc::clone(&pump));
        Self {
            state,
            constraints,
            profiles,
            pump,
            executor,
            offline,
            bus,
            notifier,
            settings: ControllerSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> &LoopStateStore<S, K> {
        &self.state
    }

    async fn has_valid_profile(&self) -> bool {
        self.profiles.get_profile().await.is_some()
            && self.profiles.is_profile_valid(PROFILE_CONTEXT).await
    }

    async fn require_profile(&self) -> Result<(), LoopError> {
        if self.has_valid_profile().await {
            return Ok(());
        }
        tracing::warn!("no valid profile, rejecting loop action");
        self.notifier
            .notify(UserNotice::toast(NO_PROFILE, self.state.now()))
            .await;
        Err(LoopError::NoProfile)
    }

    async fn publish(&self, event: LoopEvent) {
        if let Err(err) = self.bus.publish(event).await {
            tracing::warn!(error = %err, "failed to publish loop event");
        }
    }

    async fn refresh_overview(&self) {
        self.publish(LoopEvent::refresh_overview(SUSPEND_MENU)).await;
    }

    async fn record_offline(&self, reason: OfflineReason, minutes: u32) {
        let event = OfflineEvent::new(reason, minutes, self.state.now());
        if let Err(err) = self.offline.record(event).await {
            tracing::error!(?reason, error = %err, "failed to record offline event");
            self.notifier
                .notify(UserNotice::toast(OFFLINE_RECORD_FAILED, self.state.now()))
                .await;
        }
    }

    /// Issue a temp basal cancellation and report its failure, if any,
    /// through `surface` once the pump answers.
    fn dispatch_cancel(&self, origin: CancelOrigin, surface: FailureSurface) -> CommandReport {
        let pending = match self.executor.cancel_temp_basal(true, origin) {
            Dispatch::Issued(pending) => pending,
            Dispatch::AlreadyInFlight => return CommandReport::AlreadyInFlight { origin },
        };

        let id = pending.id();
        let notifier = Arc::clone(&self.notifier);
        let clock = self.state.clock().clone();
        let completion = tokio::spawn(async move {
            let outcome = pending.outcome().await;
            if let CommandOutcome::Failure { detail } = &outcome {
                tracing::warn!(%id, %origin, detail = %detail, "temp basal cancellation failed");
                notifier
                    .notify(surface.notice(detail.clone(), clock.now()))
                    .await;
            }
            outcome
        });

        CommandReport::Dispatched {
            id,
            origin,
            completion,
        }
    }

    async fn select_mode(
        &self,
        tx: &mut StateTransaction<'_, S>,
        action: LoopAction,
        mode: AutomationMode,
    ) -> Result<Transition, LoopError> {
        if !tx.current().is_enabled() {
            return Err(PreconditionError::LoopDisabled.into());
        }
        if tx.current().mode == mode {
            tracing::debug!(%mode, "mode already active");
            return Ok(Transition::unchanged(action));
        }

        let allowed = match mode {
            AutomationMode::Closed => self.constraints.is_closed_loop_allowed().await,
            AutomationMode::LowGlucoseSuspend => {
                self.constraints.is_low_glucose_suspend_allowed().await
            }
            AutomationMode::Open => ConstraintResult::Allowed,
        };
        if let Err(denied) = allowed.require(mode) {
            tracing::warn!(%denied, "mode selection ignored");
            return Err(denied.into());
        }

        tx.draft_mut().set_mode(mode);
        tx.commit().await?;
        tracing::info!("USER ENTRY: {}", mode.description().to_uppercase());

        self.publish(LoopEvent::preference_changed(mode.description()))
            .await;
        Ok(Transition::applied(action))
    }

    async fn disable(
        &self,
        tx: &mut StateTransaction<'_, S>,
        action: LoopAction,
    ) -> Result<Transition, LoopError> {
        if !tx.current().is_enabled() {
            return Err(PreconditionError::AlreadyDisabled.into());
        }
        tx.draft_mut().set_enabled(false);
        tx.commit().await?;
        tracing::info!("USER ENTRY: LOOP DISABLED");

        let report = self.dispatch_cancel(CancelOrigin::DisableLoop, FailureSurface::Toast);
        self.record_offline(
            OfflineReason::LoopDisabled,
            self.settings.unknown_offline_minutes,
        )
        .await;
        self.refresh_overview().await;
        Ok(Transition::applied(action).with_command(report))
    }

    async fn enable(
        &self,
        tx: &mut StateTransaction<'_, S>,
        action: LoopAction,
    ) -> Result<Transition, LoopError> {
        if tx.current().is_enabled() {
            return Err(PreconditionError::AlreadyEnabled.into());
        }
        tx.draft_mut().set_enabled(true);
        tx.commit().await?;
        tracing::info!("USER ENTRY: LOOP ENABLED");

        self.record_offline(OfflineReason::LoopEnabled, 0).await;
        self.refresh_overview().await;
        Ok(Transition::applied(action))
    }

    async fn resume(
        &self,
        tx: &mut StateTransaction<'_, S>,
        action: LoopAction,
    ) -> Result<Transition, LoopError> {
        resumable(action, tx.current(), self.state.now())?;

        tx.draft_mut().clear_suspend();
        tx.draft_mut().clear_disconnect();
        tx.commit_with(vec![SettingWrite::bool(keys::USED_RECONNECT, true)])
            .await?;
        tracing::info!("USER ENTRY: {}", action.description().to_uppercase());

        let report = self.dispatch_cancel(CancelOrigin::Resume, FailureSurface::Alert);
        self.record_offline(OfflineReason::Resumed, 0).await;
        self.refresh_overview().await;
        Ok(Transition::applied(action).with_command(report))
    }

    async fn suspend(
        &self,
        tx: &mut StateTransaction<'_, S>,
        action: LoopAction,
        duration: SuspendDuration,
    ) -> Result<Transition, LoopError> {
        let now = self.state.now();
        if !tx.current().is_enabled() {
            return Err(PreconditionError::LoopDisabled.into());
        }
        match tx.current().status(now) {
            LoopStatus::Active => {}
            LoopStatus::Suspended => return Err(PreconditionError::AlreadySuspended.into()),
            LoopStatus::Disconnected => return Err(PreconditionError::PumpDisconnected.into()),
        }

        tx.draft_mut().suspend_for(duration.minutes(), now)?;
        tx.commit().await?;
        tracing::info!("USER ENTRY: SUSPEND {}", duration.minutes());

        self.refresh_overview().await;
        Ok(Transition::applied(action))
    }

    async fn disconnect(
        &self,
        tx: &mut StateTransaction<'_, S>,
        action: LoopAction,
        duration: DisconnectDuration,
    ) -> Result<Transition, LoopError> {
        let now = self.state.now();
        if tx.current().is_disconnected(now) {
            return Err(PreconditionError::AlreadyDisconnected.into());
        }
        let minutes = duration.minutes();
        if duration.needs_pump_step_support() && !self.pump.supports_disconnect_duration(minutes) {
            return Err(PreconditionError::DisconnectStepUnsupported { minutes }.into());
        }

        tx.draft_mut().disconnect_for(minutes, now)?;
        let milestone = if duration == DisconnectDuration::OneHour {
            vec![SettingWrite::bool(keys::USED_DISCONNECT, true)]
        } else {
            Vec::new()
        };
        tx.commit_with(milestone).await?;
        tracing::info!("USER ENTRY: DISCONNECT {minutes}");

        self.refresh_overview().await;
        Ok(Transition::applied(action))
    }
}

/// Reconnect ends a disconnection; Resume ends a suspension of an enabled
/// loop and cannot bypass a disconnection.
fn resumable(
    action: LoopAction,
    state: &LoopState,
    now: Timestamp,
) -> Result<(), PreconditionError> {
    let status = state.status(now);
    if action == LoopAction::Reconnect {
        return if status == LoopStatus::Disconnected {
            Ok(())
        } else {
            Err(PreconditionError::NotDisconnected)
        };
    }
    if !state.is_enabled() {
        return Err(PreconditionError::LoopDisabled);
    }
    match status {
        LoopStatus::Suspended => Ok(()),
        LoopStatus::Disconnected => Err(PreconditionError::PumpDisconnected),
        LoopStatus::Active => Err(PreconditionError::NotSuspended),
    }
}

impl<S, K, C, D, P, A, B, N> LoopControl for ModeController<S, K, C, D, P, A, B, N>
where
    S: SettingsStore + Send + Sync,
    K: Clock + Clone + Send + Sync + 'static,
    C: ConstraintEvaluator + Send + Sync,
    D: ProfileProvider + Send + Sync,
    P: PumpCapabilityProvider + PumpCommandQueue + Send + Sync + 'static,
    A: OfflineEventStore + Send + Sync,
    B: EventPublisher + Send + Sync,
    N: UserNotifier + Send + Sync + 'static,
{
    async fn snapshot(&self) -> Result<LoopSnapshot, LoopError> {
        let state = self.state.snapshot().await;
        let closed_loop = self.constraints.is_closed_loop_allowed().await;
        let low_glucose_suspend = self.constraints.is_low_glucose_suspend_allowed().await;
        Ok(LoopSnapshot::new(
            &state,
            closed_loop,
            low_glucose_suspend,
            self.state.now(),
        ))
    }

    async fn display_state(&self) -> Result<DisplayState, LoopError> {
        if !self.has_valid_profile().await {
            return Err(LoopError::NoProfile);
        }
        let state = self.state.snapshot().await;
        let closed_loop = self.constraints.is_closed_loop_allowed().await;
        let low_glucose_suspend = self.constraints.is_low_glucose_suspend_allowed().await;
        Ok(derive_display_state(
            &state,
            closed_loop,
            low_glucose_suspend,
            self.pump.capabilities(),
            self.state.now(),
        ))
    }

    #[tracing::instrument(skip(self, action), fields(action = %action))]
    async fn apply(&self, action: LoopAction) -> Result<Transition, LoopError> {
        let mut tx = self.state.begin().await;
        self.require_profile().await?;

        match action {
            LoopAction::SelectMode { mode } => self.select_mode(&mut tx, action, mode).await,
            LoopAction::Disable => self.disable(&mut tx, action).await,
            LoopAction::Enable => self.enable(&mut tx, action).await,
            LoopAction::Resume | LoopAction::Reconnect => self.resume(&mut tx, action).await,
            LoopAction::Suspend { duration } => self.suspend(&mut tx, action, duration).await,
            LoopAction::Disconnect { duration } => {
                self.disconnect(&mut tx, action, duration).await
            }
        }
    }

    async fn handle_event(&self, event: &LoopEvent) -> Result<(), LoopError> {
        if *event != LoopEvent::NewOpenLoopNotification {
            return Ok(());
        }
        let state = self.state.reload().await?;
        tracing::debug!(?state, "reloaded loop state after open loop notification");
        self.publish(LoopEvent::refresh_overview(OPEN_LOOP_NOTIFICATION))
            .await;
        Ok(())
    }
}

/// Feed bus events to `control` until the bus closes.
pub async fn forward_events<L: LoopControl + Sync>(
    control: &L,
    mut events: broadcast::Receiver<LoopEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Err(err) = control.handle_event(&event).await {
                    tracing::error!(error = %err, ?event, "failed to handle loop event");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "loop event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
