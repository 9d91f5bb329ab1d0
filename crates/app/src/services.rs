//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_executor;
pub mod confirmation;
pub mod constraint_evaluator;
pub mod loop_state_store;
pub mod mode_controller;
