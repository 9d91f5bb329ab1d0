//! # loopctl-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for reading loop state and requesting transitions
//!   (`/api/loop`, `/api/loop/display`, `/api/loop/actions`, …)
//! - Put the confirmation gateway in front of every transition: a request
//!   that was not confirmed is answered with `428` and the text to confirm
//! - Stream loop events and user notices as Server-Sent Events
//! - Map application results into HTTP responses
//!
//! ## Dependency rule
//! Depends on `loopctl-app` (for port traits and services) and `loopctl-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
