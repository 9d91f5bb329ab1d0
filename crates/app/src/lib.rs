//! # loopctl-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SettingsStore`: typed, atomically-batched preference storage
//!   - `OfflineEventStore`: audit records of loop downtime
//!   - `PumpCommandQueue` / `PumpCapabilityProvider`: the pump driver
//!   - `ProfileProvider`: whether a dosing profile is set
//!   - `EventPublisher` / `UserNotifier`: loop events and user notices
//! - Define the **driving/inbound port** `LoopControl`, implemented by
//!   `ModeController`, plus the `ConfirmationGateway` presentation layers
//!   put in front of it
//! - Provide **in-process infrastructure** (event bus, notice board) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `loopctl-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod notice_board;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
