pub mod control;
pub mod encoder;
pub mod pacer;
pub mod sampling;
pub mod telemetry;
