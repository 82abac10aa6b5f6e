//! Request dispatch: address resolution plus the two dispatch entry points.

pub mod direct;
pub mod legacy;
pub mod resolver;

pub use direct::{handle_direct, BatchQuery, ResponseEnvelope};
pub use legacy::handle_dispatch;
pub use resolver::{resolve, Resolution};
