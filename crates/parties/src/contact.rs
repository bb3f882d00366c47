use serde::{Deserialize, Serialize};

use cargodesk_core::Locale;

/// Where and how a party can be reached.
///
/// This is the view of a client or customer that the notification flows use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub locale: Option<Locale>,
}

impl ContactPoint {
    /// Whether at least one channel is available.
    pub fn is_reachable(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}
