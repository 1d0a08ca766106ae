// Network
pub const COMMAND_PORT: u16 = 5005;
pub const RECV_BUFFER_LEN: usize = 128; // payloads observed up to 127 bytes
pub const FIELD_DELIMITER: char = ',';
pub const PARSE_FALLBACK: f32 = 0.0;

// Servo channels
pub const NUM_CHANNELS: usize = 4;

// Safe angle range in degrees
pub const MIN_ANGLE: f32 = -50.0;
pub const MAX_ANGLE: f32 = 50.0;

// Driver level mapping: ±90 degrees -> ±1.0, so the safe range spans ±0.556
pub const CENTER_LEVEL: f32 = 0.0;
pub const LEVEL_PER_DEGREE: f32 = 1.0 / 90.0;
