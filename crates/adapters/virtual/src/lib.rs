//! # loopctl-adapter-virtual
//!
//! Virtual/demo collaborators that stand in for real hardware and for the
//! dosing algorithm.
//!
//! ## Provided adapters
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualPump`] | `PumpCommandQueue`, `PumpCapabilityProvider` | Answers temp basal cancellations after a configurable latency; can be told to fail |
//! | [`StaticProfileProvider`] | `ProfileProvider` | Reports a fixed profile, or none |
//!
//! ## Dependency rule
//!
//! Depends on `loopctl-app` (port traits) and `loopctl-domain` only.

mod profile;
mod pump;

pub use profile::StaticProfileProvider;
pub use pump::{VirtualPump, VirtualPumpConfig};
