pub mod rotors;
pub mod sensors;

pub use rotors::PwmRotors;
pub use sensors::{AltitudeSensor, PanelPins, ReferencePin};
