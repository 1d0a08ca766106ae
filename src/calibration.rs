use crate::constants::{CENTER_LEVEL, LEVEL_PER_DEGREE, NUM_CHANNELS};
use crate::types::{clamp_angle, MotorCommand};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Linear angle-to-level calibration shared by all four servos.
///
/// `center` is the driver level for 0 degrees and `slope` the level change
/// per degree. Tune both against the driver's accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub center: f32,
    pub slope: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            center: CENTER_LEVEL,
            slope: LEVEL_PER_DEGREE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActuationMapper {
    calibration: Calibration,
}

impl ActuationMapper {
    pub fn new(calibration: Calibration) -> Self {
        ActuationMapper { calibration }
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn center_level(&self) -> f32 {
        self.calibration.center
    }

    /// Maps an angle in degrees to a driver level. Out-of-range angles are
    /// saturated to the safe range first; NaN is treated as 0 degrees.
    pub fn apply(&self, angle: f32) -> f32 {
        let angle = if angle.is_nan() { 0.0 } else { clamp_angle(angle) };
        let level = self.calibration.center + angle * self.calibration.slope;
        debug!("Angle: {:.1} -> Level: {:.3}", angle, level);
        level
    }

    pub fn apply_all(&self, command: &MotorCommand) -> [f32; NUM_CHANNELS] {
        command.angles.map(|angle| self.apply(angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f32; 11] = [
        -1000.0, -90.0, -50.0, -49.9, -12.5, 0.0, 0.1, 25.0, 50.0, 50.1, 1000.0,
    ];

    #[test]
    fn zero_maps_to_center() {
        let mapper = ActuationMapper::default();
        assert_eq!(mapper.apply(0.0), mapper.center_level());

        let offset = ActuationMapper::new(Calibration { center: 0.075, slope: 0.0005 });
        assert_eq!(offset.apply(0.0), 0.075);
    }

    #[test]
    fn clamping_is_idempotent() {
        let mapper = ActuationMapper::default();
        for a in SAMPLES {
            assert_eq!(mapper.apply(a), mapper.apply(a.clamp(-50.0, 50.0)), "angle {a}");
        }
    }

    #[test]
    fn endpoints_are_symmetric_around_center() {
        let mapper = ActuationMapper::new(Calibration { center: 0.25, slope: 0.01 });
        let center = mapper.center_level();
        let up = mapper.apply(50.0) - center;
        let down = center - mapper.apply(-50.0);
        assert!((up - down).abs() < 1e-6);
    }

    #[test]
    fn default_range_stays_within_safety_margin() {
        let mapper = ActuationMapper::default();
        let top = mapper.apply(50.0);
        assert!((top - 50.0 / 90.0).abs() < 1e-6);
        assert!(top < 0.56);
        assert_eq!(mapper.apply(1e9), top);
        assert_eq!(mapper.apply(f32::NEG_INFINITY), -top);
    }

    #[test]
    fn nan_maps_to_center() {
        let mapper = ActuationMapper::default();
        assert_eq!(mapper.apply(f32::NAN), mapper.center_level());
    }

    #[test]
    fn apply_all_clamps_each_field() {
        let mapper = ActuationMapper::default();
        let levels = mapper.apply_all(&MotorCommand::new(100.0, -100.0, 25.0, -25.0));
        let expected = [50.0f32, -50.0, 25.0, -25.0].map(|a| a / 90.0);
        for (level, want) in levels.iter().zip(expected) {
            assert!((level - want).abs() < 1e-6);
        }
    }
}
