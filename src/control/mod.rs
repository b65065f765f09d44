pub mod averager;
pub mod pid;
pub mod quadrature;
pub mod yaw;

pub use averager::{Altimeter, SampleAverager, SharedAverager};
pub use pid::PidController;
pub use quadrature::{Phases, YawDecoder};
pub use yaw::shortest_yaw_error;
