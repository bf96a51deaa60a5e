//! Alert composition and presentation.

pub mod center;
pub mod compose;
pub mod model;

pub use center::AlertCenter;
pub use model::{ALERT_GROUP, AlertAction, AlertEvent, AlertId, AlertPayload};
