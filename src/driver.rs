use parking_lot::Mutex;
use std::sync::Arc;

/// A servo output accepting a normalized level, where 0.0 is idle/center and
/// ±1.0 the driver's extreme positions.
pub trait ActuatorDriver {
    fn write(&mut self, level: f32);
}

impl<D: ActuatorDriver + ?Sized> ActuatorDriver for Box<D> {
    fn write(&mut self, level: f32) {
        (**self).write(level)
    }
}

/// Read side of a [`SimServo`]: the last level written and a write count.
#[derive(Debug, Clone, Default)]
pub struct LevelProbe {
    inner: Arc<Mutex<ProbeState>>,
}

#[derive(Debug, Default)]
struct ProbeState {
    level: Option<f32>,
    writes: u64,
}

impl LevelProbe {
    pub fn level(&self) -> Option<f32> {
        self.inner.lock().level
    }

    pub fn writes(&self) -> u64 {
        self.inner.lock().writes
    }
}

/// In-process servo that records what it is told instead of driving PWM.
#[derive(Debug, Default)]
pub struct SimServo {
    probe: LevelProbe,
}

impl SimServo {
    pub fn new() -> Self {
        SimServo::default()
    }

    pub fn probe(&self) -> LevelProbe {
        self.probe.clone()
    }
}

impl ActuatorDriver for SimServo {
    fn write(&mut self, level: f32) {
        let mut state = self.probe.inner.lock();
        state.level = Some(level);
        state.writes += 1;
    }
}
