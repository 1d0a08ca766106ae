use crate::{
    calibration::{ActuationMapper, Calibration},
    constants::NUM_CHANNELS,
    driver::ActuatorDriver,
    transport::{CommandReceiver, ReceiverConfig, ReceiverStats},
    types::{Channel, MotorCommand},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub receiver: ReceiverConfig,
    pub calibration: Calibration,
}

/// Ties the command receiver to the four servo channels.
///
/// The host calls [`Controller::setup`] once and [`Controller::update`] on
/// every pass of its loop. Nothing here blocks.
pub struct Controller {
    config: ControllerConfig,
    receiver: Option<CommandReceiver>,
    mapper: ActuationMapper,
    drivers: HashMap<Channel, Box<dyn ActuatorDriver>>,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Controller {
            mapper: ActuationMapper::new(config.calibration),
            config,
            receiver: None,
            drivers: HashMap::with_capacity(NUM_CHANNELS),
        }
    }

    /// Attaches a driver to a channel, replacing any previous one.
    pub fn bind_channel(&mut self, channel: Channel, driver: impl ActuatorDriver + 'static) {
        self.drivers.insert(channel, Box::new(driver));
    }

    /// Opens the command socket. Calling it again is a no-op, including after
    /// a failed bind.
    pub fn setup(&mut self) {
        if self.receiver.is_none() {
            self.receiver = Some(CommandReceiver::open(&self.config.receiver));
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(receiver) = self.receiver.as_mut() {
            receiver.close();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.receiver.as_ref().is_some_and(CommandReceiver::is_active)
    }

    pub fn receiver(&self) -> Option<&CommandReceiver> {
        self.receiver.as_ref()
    }

    pub fn stats(&self) -> ReceiverStats {
        self.receiver.as_ref().map(CommandReceiver::stats).unwrap_or_default()
    }

    pub fn mapper(&self) -> &ActuationMapper {
        &self.mapper
    }

    /// One pass of the host loop: applies the pending command, if any, and
    /// returns the levels it produced.
    pub fn update(&mut self) -> Option<[f32; NUM_CHANNELS]> {
        let command = self.receiver.as_mut()?.poll()?;
        Some(self.apply(&command))
    }

    pub fn set_motors(&mut self, m1: f32, m2: f32, m3: f32, m4: f32) -> [f32; NUM_CHANNELS] {
        self.apply(&MotorCommand::new(m1, m2, m3, m4))
    }

    pub fn apply(&mut self, command: &MotorCommand) -> [f32; NUM_CHANNELS] {
        let levels = self.mapper.apply_all(command);
        for (channel, _) in command.iter() {
            match self.drivers.get_mut(&channel) {
                Some(driver) => driver.write(levels[channel.index()]),
                None => debug!("No servo bound to {}, skipping", channel),
            }
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{LevelProbe, SimServo};
    use strum::IntoEnumIterator;

    fn controller_with_servos() -> (Controller, Vec<LevelProbe>) {
        let mut controller = Controller::new(ControllerConfig::default());
        let mut probes = Vec::new();
        for channel in Channel::iter() {
            let servo = SimServo::new();
            probes.push(servo.probe());
            controller.bind_channel(channel, servo);
        }
        (controller, probes)
    }

    #[test]
    fn zero_command_centers_every_servo() {
        let (mut controller, probes) = controller_with_servos();
        let center = controller.mapper().center_level();
        controller.set_motors(0.0, 0.0, 0.0, 0.0);
        for probe in &probes {
            assert_eq!(probe.level(), Some(center));
        }
    }

    #[test]
    fn fields_drive_channels_in_order() {
        let (mut controller, probes) = controller_with_servos();
        let levels = controller.set_motors(100.0, -100.0, 25.0, -25.0);
        let mapper = ActuationMapper::default();
        let expected = [50.0, -50.0, 25.0, -25.0].map(|a| mapper.apply(a));
        assert_eq!(levels, expected);
        for (probe, want) in probes.iter().zip(expected) {
            assert_eq!(probe.level(), Some(want));
        }
    }

    #[test]
    fn unbound_channel_is_skipped() {
        let mut controller = Controller::new(ControllerConfig::default());
        let servo = SimServo::new();
        let probe = servo.probe();
        controller.bind_channel(Channel::M4, servo);

        controller.set_motors(10.0, 20.0, 30.0, 45.0);
        assert_eq!(probe.writes(), 1);
        assert_eq!(probe.level(), Some(controller.mapper().apply(45.0)));
    }

    #[test]
    fn update_before_setup_does_nothing() {
        let (mut controller, probes) = controller_with_servos();
        assert!(!controller.is_listening());
        assert_eq!(controller.update(), None);
        assert_eq!(controller.stats(), ReceiverStats::default());
        assert!(probes.iter().all(|p| p.writes() == 0));
    }

    #[test]
    fn custom_calibration_is_used() {
        let mut controller = Controller::new(ControllerConfig {
            calibration: Calibration { center: 0.5, slope: 1.0 / 256.0 },
            ..ControllerConfig::default()
        });
        assert_eq!(controller.set_motors(0.0, 50.0, -50.0, 0.0), [0.5, 0.6953125, 0.3046875, 0.5]);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ControllerConfig = serde_json::from_str(
            r#"{ "receiver": { "bind_addr": "127.0.0.1:6000", "parse_policy": "Strict" } }"#,
        )
        .unwrap();
        assert_eq!(config.receiver.bind_addr, "127.0.0.1:6000".parse::<std::net::SocketAddr>().unwrap());
        assert_eq!(config.receiver.buffer_len, crate::constants::RECV_BUFFER_LEN);
        assert_eq!(config.receiver.parse_policy, crate::transport::ParsePolicy::Strict);
        assert_eq!(config.calibration, Calibration::default());
    }
}
