//! # loopctl-domain
//!
//! Pure domain model for the loopctl closed-loop control core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **automation mode** (open, low-glucose-suspend, closed)
//! - Define the **loop state** (enabled flag, mode, suspension and
//!   pump-disconnection windows) and its derived status
//! - Define the **user actions** that request a transition, with their
//!   confirmation texts
//! - Define **constraint results**, **command outcomes**, **offline records**,
//!   **events** and **user notices** exchanged with collaborators
//! - Derive the **display state** a presentation layer renders
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod command;
pub mod constraint;
pub mod display;
pub mod event;
pub mod loop_state;
pub mod mode;
pub mod notice;
pub mod offline;
pub mod profile;
