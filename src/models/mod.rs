pub mod chart;
pub mod stock;
pub mod response;

pub use chart::*;
pub use stock::*;
pub use response::*;
