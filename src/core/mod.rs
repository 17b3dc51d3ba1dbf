pub mod availability;
pub mod state;

pub use availability::{Availability, classify};
pub use state::{AlertKind, DeliveryState, ItemRuntimeState};
