//! Dosing profile: the minimal view the loop core needs.

use serde::{Deserialize, Serialize};

/// The active dosing profile. Its contents belong to the dosing algorithm;
/// the loop core only needs to know that one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
}

impl Profile {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
