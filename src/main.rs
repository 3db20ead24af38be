use anyhow::Result;
use smart_home_simulator::{config, runtime, simulation, telemetry, transport};
use config::Config;
use runtime::{Intervals, Simulator, SimulatorRuntime};
use simulation::SimulationEngine;
use telemetry::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    if cfg.simulation.clamp_command_overrides {
        info!("command overrides are clamped into sensor bounds");
    }

    // Invalid transport settings abort startup.
    let publisher = transport::connect(&cfg.transport)?;

    let now = runtime::local_clock()();
    let engine = SimulationEngine::new(cfg.simulation.engine_config(), now);
    let simulator = Simulator::new(engine, publisher, Intervals::from(&cfg.simulation));

    let mut runner = SimulatorRuntime::new(simulator);
    let commands = transport::spawn_stdin_commands(runner.command_sender(), runner.cancellation_token());

    info!(
        endpoint = %cfg.transport.endpoint(),
        command_topic = %cfg.transport.command_topic,
        "starting smart home simulator"
    );
    runner.start();

    let reason = telemetry::shutdown_signal().await;
    runner.stop().await;
    // A pending blocking stdin read cannot be cancelled; exit may wait for one more line.
    commands.abort();

    info!(%reason, "shutdown complete");
    Ok(())
}
