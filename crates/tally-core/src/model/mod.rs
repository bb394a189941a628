//! Domain values shared by the store, the projection and the CLI.

pub mod amount;
pub mod booking;
pub mod date;
pub mod flow;

pub use amount::Amount;
pub use booking::{Booking, Category, JoinedBooking, NewBooking};
pub use date::EffectiveDate;
pub use flow::FlowDirection;
