use crate::constants::NUM_CHANNELS;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

#[derive(Debug, EnumIter, Display, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Channel {
    M1 = 1, // head
    M2 = 2, // head
    M3 = 3, // head
    M4 = 4, // ear
}

impl Channel {
    /// Position of this channel's field in a command, 0-based.
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn from_index(index: usize) -> Option<Channel> {
        Channel::iter().nth(index)
    }
}

/// One decoded command: an angle in degrees per channel, in channel order.
///
/// Values are kept exactly as received; the mapper clamps them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    pub angles: [f32; NUM_CHANNELS],
}

impl MotorCommand {
    pub fn new(m1: f32, m2: f32, m3: f32, m4: f32) -> Self {
        MotorCommand {
            angles: [m1, m2, m3, m4],
        }
    }

    pub fn angle(&self, channel: Channel) -> f32 {
        self.angles[channel.index()]
    }

    /// Channels paired with their angles, M1 first.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f32)> + '_ {
        Channel::iter().zip(self.angles.iter().copied())
    }
}

pub(crate) fn clamp_angle(angle: f32) -> f32 {
    use crate::constants::{MAX_ANGLE, MIN_ANGLE};
    angle.max(MIN_ANGLE).min(MAX_ANGLE)
}
