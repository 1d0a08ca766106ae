mod calibration;
mod constants;
mod controller;
mod driver;
mod transport;
mod types;

pub use calibration::{ActuationMapper, Calibration};
pub use controller::{Controller, ControllerConfig};
pub use driver::{ActuatorDriver, LevelProbe, SimServo};
pub use transport::{decode_datagram, CommandReceiver, ParsePolicy, ReceiverConfig, ReceiverError, ReceiverStats};
pub use types::{Channel, MotorCommand};

// Re-export commonly used items
pub use constants::{CENTER_LEVEL, COMMAND_PORT, LEVEL_PER_DEGREE, MAX_ANGLE, MIN_ANGLE, NUM_CHANNELS};
