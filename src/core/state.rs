use serde::{Deserialize, Serialize};

use crate::core::availability::Availability;

/// Last known delivery verdict for a URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    /// Nothing observed yet in this process.
    #[default]
    Unknown,
    Unavailable,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    DeliveryUnavailable,
    DeliveryRestored,
    InStock,
}

/// Per-URL memory used to alert only on transitions. Lives as long as the
/// process; a restart forgets everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRuntimeState {
    /// An "in stock" alert went out for the current in-stock run.
    pub notified: bool,
    pub delivery: DeliveryState,
}

impl ItemRuntimeState {
    /// Applies one observation and returns the alerts it triggers, in sending order.
    pub fn observe(&mut self, availability: &Availability) -> Vec<AlertKind> {
        let mut alerts = Vec::new();

        if !availability.delivery_available() {
            if self.delivery != DeliveryState::Unavailable {
                alerts.push(AlertKind::DeliveryUnavailable);
            }
            self.delivery = DeliveryState::Unavailable;
            return alerts;
        }

        if self.delivery == DeliveryState::Unavailable {
            alerts.push(AlertKind::DeliveryRestored);
        }
        self.delivery = DeliveryState::Available;

        match availability {
            Availability::Available(_) if !self.notified => {
                alerts.push(AlertKind::InStock);
                self.notified = true;
            }
            Availability::Unavailable(_) => self.notified = false,
            // Already alerted, or nothing conclusive on the page
            _ => {}
        }

        alerts
    }
}
