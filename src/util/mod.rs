pub mod clock;
pub mod duration;
pub mod join;
pub mod telemetry;

pub use clock::*;
pub use duration::*;
pub use telemetry::*;
