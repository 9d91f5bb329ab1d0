//! Pump ports: capability queries and the command queue.

use std::future::Future;

use loopctl_domain::action::DisconnectDuration;
use loopctl_domain::command::CommandOutcome;
use loopctl_domain::display::PumpCapabilities;

/// Static description of what the active pump driver supports.
pub trait PumpCapabilityProvider {
    /// Whether the pump supports a temp-basal step of exactly `minutes`.
    fn supports_disconnect_duration(&self, minutes: u32) -> bool;

    /// Snapshot of the capabilities the loop menu cares about.
    fn capabilities(&self) -> PumpCapabilities {
        PumpCapabilities {
            disconnect_15m: self
                .supports_disconnect_duration(DisconnectDuration::FifteenMinutes.minutes()),
            disconnect_30m: self
                .supports_disconnect_duration(DisconnectDuration::ThirtyMinutes.minutes()),
        }
    }
}

/// Queue of commands sent to the physical pump.
///
/// Each call resolves exactly once, with the pump's verdict. Callers never
/// await these futures on the transition path; see
/// [`CommandExecutor`](crate::services::command_executor::CommandExecutor).
pub trait PumpCommandQueue {
    /// Cancel any running temporary basal. With `enforce_new`, the
    /// cancellation is sent even if the driver believes none is running.
    fn cancel_temp_basal(&self, enforce_new: bool) -> impl Future<Output = CommandOutcome> + Send;
}
