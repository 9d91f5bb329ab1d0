use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use loopctl_app::ports::{PumpCapabilityProvider, PumpCommandQueue};
use loopctl_domain::command::CommandOutcome;

const REJECTED: &str = "virtual pump rejected the command";

/// How the simulated pump behaves.
#[derive(Debug, Clone, Copy)]
pub struct VirtualPumpConfig {
    pub disconnect_15m: bool,
    pub disconnect_30m: bool,
    /// Delay before every command is answered.
    pub command_latency: Duration,
    pub fail_commands: bool,
}

impl Default for VirtualPumpConfig {
    fn default() -> Self {
        Self {
            disconnect_15m: true,
            disconnect_30m: true,
            command_latency: Duration::from_millis(200),
            fail_commands: false,
        }
    }
}

/// Simulated insulin pump.
pub struct VirtualPump {
    config: VirtualPumpConfig,
    failing: AtomicBool,
    commands: AtomicUsize,
}

impl VirtualPump {
    #[must_use]
    pub fn new(config: VirtualPumpConfig) -> Self {
        Self {
            failing: AtomicBool::new(config.fail_commands),
            config,
            commands: AtomicUsize::new(0),
        }
    }

    /// Make subsequent commands fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of commands received so far.
    #[must_use]
    pub fn commands_received(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }
}

impl Default for VirtualPump {
    fn default() -> Self {
        Self::new(VirtualPumpConfig::default())
    }
}

impl PumpCapabilityProvider for VirtualPump {
    fn supports_disconnect_duration(&self, minutes: u32) -> bool {
        match minutes {
            15 => self.config.disconnect_15m,
            30 => self.config.disconnect_30m,
            _ => true,
        }
    }
}

impl PumpCommandQueue for VirtualPump {
    async fn cancel_temp_basal(&self, enforce_new: bool) -> CommandOutcome {
        self.commands.fetch_add(1, Ordering::SeqCst);
        if !self.config.command_latency.is_zero() {
            tokio::time::sleep(self.config.command_latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            tracing::warn!(enforce_new, "virtual pump failing temp basal cancellation");
            CommandOutcome::failure(REJECTED)
        } else {
            tracing::info!(enforce_new, "virtual pump cancelled temp basal");
            CommandOutcome::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use loopctl_domain::action::DisconnectDuration;

    use super::*;

    fn instant(config: VirtualPumpConfig) -> VirtualPump {
        VirtualPump::new(VirtualPumpConfig {
            command_latency: Duration::ZERO,
            ..config
        })
    }

    #[tokio::test]
    async fn should_cancel_temp_basal_successfully() {
        let pump = instant(VirtualPumpConfig::default());

        let outcome = pump.cancel_temp_basal(true).await;

        assert!(outcome.is_success());
        assert_eq!(pump.commands_received(), 1);
    }

    #[tokio::test]
    async fn should_fail_when_configured_to_fail() {
        let pump = instant(VirtualPumpConfig {
            fail_commands: true,
            ..VirtualPumpConfig::default()
        });

        let outcome = pump.cancel_temp_basal(true).await;

        assert_eq!(outcome, CommandOutcome::failure(REJECTED));
    }

    #[tokio::test]
    async fn should_recover_after_failing_is_cleared() {
        let pump = instant(VirtualPumpConfig::default());
        pump.set_failing(true);
        assert!(!pump.cancel_temp_basal(false).await.is_success());

        pump.set_failing(false);
        assert!(pump.cancel_temp_basal(false).await.is_success());
    }

    #[test]
    fn should_report_configured_disconnect_capabilities() {
        let pump = VirtualPump::new(VirtualPumpConfig {
            disconnect_15m: false,
            ..VirtualPumpConfig::default()
        });

        let capabilities = pump.capabilities();

        assert!(!capabilities.supports(DisconnectDuration::FifteenMinutes));
        assert!(capabilities.supports(DisconnectDuration::ThirtyMinutes));
        assert!(pump.supports_disconnect_duration(60));
    }
}
