use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Appointment durations the panel offers, in minutes.
pub const DURATION_OPTIONS_MIN: [u16; 7] = [15, 20, 30, 45, 60, 75, 90];

/// A service offered by the shop (cut, beard trim, combo, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// One of [`DURATION_OPTIONS_MIN`].
    pub duration_min: u16,
    /// Price in minor currency units.
    pub price_cents: i64,
}
