//! Customer profile models

use serde::{Deserialize, Serialize};

/// Customer profile as returned by the profile service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfileEntity {
    /// Profile ID
    pub customer_profile_id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Whether onboarding has completed
    pub onboarded: bool,
}
