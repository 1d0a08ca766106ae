use servo_link::{Channel, Controller, ControllerConfig, LevelProbe, SimServo};
use std::error::Error;
use strum::IntoEnumIterator;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::EnvFilter;

const UPDATE_PERIOD: Duration = Duration::from_millis(10);
const REPORT_PERIOD: Duration = Duration::from_secs(10);

fn report(controller: &Controller, probes: &[(Channel, LevelProbe)]) {
    let stats = controller.stats();
    info!(
        "datagrams={} commands={} malformed={} truncated={}",
        stats.datagrams, stats.commands, stats.malformed, stats.truncated
    );
    for (channel, probe) in probes {
        if let Some(level) = probe.level() {
            info!("{} level: {:.3}", channel, level);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut controller = Controller::new(ControllerConfig::default());
    let mut probes = Vec::new();
    for channel in Channel::iter() {
        let servo = SimServo::new();
        probes.push((channel, servo.probe()));
        controller.bind_channel(channel, servo);
    }

    controller.setup();
    if !controller.is_listening() {
        info!("Running without a command socket");
    }

    let mut ticker = interval(UPDATE_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut reporter = interval(REPORT_PERIOD);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                controller.update();
            }
            _ = reporter.tick() => report(&controller, &probes),
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("Shutting down");
                break;
            }
        }
    }

    controller.shutdown();
    report(&controller, &probes);
    Ok(())
}
