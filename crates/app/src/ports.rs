//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod confirm;
pub mod constraints;
pub mod control;
pub mod event_bus;
pub mod notifier;
pub mod offline_store;
pub mod profile;
pub mod pump;
pub mod settings;

pub use clock::{Clock, SystemClock};
pub use confirm::Confirmer;
pub use constraints::ConstraintEvaluator;
pub use control::LoopControl;
pub use event_bus::EventPublisher;
pub use notifier::UserNotifier;
pub use offline_store::OfflineEventStore;
pub use profile::ProfileProvider;
pub use pump::{PumpCapabilityProvider, PumpCommandQueue};
pub use settings::{SettingWrite, SettingsStore};
