//! # Simulator Runtime
//!
//! Drives a [`SimulationEngine`] from independent tokio tasks: the sensor tick, the
//! slower location tick, the periodic status report and the command consumer.
//! Engine state sits behind a single mutex held only for the synchronous model step;
//! publishing happens after the lock is released.

pub mod status;

use chrono::{DateTime, FixedOffset, Local};
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::simulation::{Command, CommandEffect, SimulationEngine};
use crate::transport::{publish_record, Transport};

pub use status::{TaskKind, TaskStatus, TaskStatuses};

const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Wall-clock source for ticks
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().fixed_offset())
}

/// Task periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub sensors: Duration,
    pub location: Duration,
    pub status: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            sensors: Duration::from_secs(10),
            location: Duration::from_secs(45),
            status: Duration::from_secs(300),
        }
    }
}

impl From<&SimulationConfig> for Intervals {
    fn from(cfg: &SimulationConfig) -> Self {
        Self {
            sensors: Duration::from_secs(cfg.tick_seconds.max(1)),
            location: Duration::from_secs(cfg.location_tick_seconds.max(1)),
            status: Duration::from_secs(cfg.status_seconds.max(1)),
        }
    }
}

/// State shared by every task
pub struct Simulator {
    engine: Mutex<SimulationEngine>,
    transport: Arc<dyn Transport>,
    clock: Clock,
    intervals: Intervals,
    statuses: TaskStatuses,
}

impl Simulator {
    pub fn new(engine: SimulationEngine, transport: Arc<dyn Transport>, intervals: Intervals) -> Self {
        Self::with_clock(engine, transport, intervals, local_clock())
    }

    pub fn with_clock(
        engine: SimulationEngine,
        transport: Arc<dyn Transport>,
        intervals: Intervals,
        clock: Clock,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            transport,
            clock,
            intervals,
            statuses: TaskStatuses::default(),
        }
    }

    /// Run `f` with exclusive access to the engine
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut SimulationEngine) -> T) -> T {
        f(&mut self.engine.lock())
    }

    pub fn task_status(&self, kind: TaskKind) -> TaskStatus {
        self.statuses.get(kind)
    }

    /// One sensor tick: step the engine, then publish every reading
    pub async fn run_sensor_tick(&self) {
        self.statuses.record_run(TaskKind::Sensors);
        let now = (self.clock)();
        let readings = self.engine.lock().tick_sensors(now);

        for reading in &readings {
            debug!(
                sensor = %reading.sensor_id,
                value = %reading.value,
                unit = %reading.unit,
                comfort = %reading.comfort(),
                "reading"
            );
            let topic = reading.topic();
            if let Err(e) = publish_record(self.transport.as_ref(), &topic, reading).await {
                warn!(error = %e, %topic, "publish failed");
                self.statuses.record_error(TaskKind::Sensors, e);
            }
        }
    }

    /// One location tick; publishes only when the occupant moved
    pub async fn run_location_tick(&self) {
        self.statuses.record_run(TaskKind::Location);
        let now = (self.clock)();
        let (event, topic) = {
            let mut engine = self.engine.lock();
            (engine.tick_location(now), engine.location_topic())
        };

        let Some(event) = event else { return };
        info!(
            from = %event.previous_location,
            to = %event.location,
            method = %event.detection_method,
            confidence = event.confidence,
            "location change"
        );
        if let Err(e) = publish_record(self.transport.as_ref(), &topic, &event).await {
            warn!(error = %e, %topic, "publish failed");
            self.statuses.record_error(TaskKind::Location, e);
        }
    }

    /// Decode and apply one raw command payload. Malformed commands are reported and dropped.
    pub fn apply_command(&self, payload: &[u8]) {
        self.statuses.record_run(TaskKind::Commands);
        let result = Command::from_slice(payload).and_then(|command| {
            info!(
                device = %command.device,
                action = %command.action,
                parameters = %serde_json::Value::Object(command.parameters.clone()),
                "command received"
            );
            self.engine.lock().handle_command(&command)
        });

        match result {
            Ok(CommandEffect::Ignored) => debug!("command had no effect"),
            Ok(effect) => info!(?effect, "command applied"),
            Err(e) => {
                warn!(error = %e, "rejected command");
                self.statuses.record_error(TaskKind::Commands, e);
            }
        }
    }

    pub fn report_status(&self) {
        self.statuses.record_run(TaskKind::Status);
        let report = self.engine.lock().status();
        info!(
            location = %report.location,
            activity = %report.activity,
            time_of_day = %report.time_of_day,
            user_present = report.user_present,
            sensors = report.sensor_count,
            interval_s = self.intervals.sensors.as_secs(),
            command_topic = %self.transport.command_topic(),
            "simulator status"
        );
        for kind in TaskKind::iter() {
            let task = self.statuses.get(kind);
            debug!(
                task = %kind,
                runs = task.run_count,
                errors = task.error_count,
                last_error = task.last_error.as_deref().unwrap_or(""),
                "task status"
            );
        }
    }
}

/// Owns the task handles; [`stop`](SimulatorRuntime::stop) lets in-flight steps finish
pub struct SimulatorRuntime {
    simulator: Arc<Simulator>,
    cancel: CancellationToken,
    command_tx: mpsc::Sender<Vec<u8>>,
    command_rx: Option<mpsc::Receiver<Vec<u8>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl SimulatorRuntime {
    pub fn new(simulator: Simulator) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        Self {
            simulator: Arc::new(simulator),
            cancel: CancellationToken::new(),
            command_tx,
            command_rx: Some(command_rx),
            tasks: Vec::new(),
        }
    }

    pub fn simulator(&self) -> Arc<Simulator> {
        self.simulator.clone()
    }

    /// Inbound command queue; payloads are applied in arrival order
    pub fn command_sender(&self) -> mpsc::Sender<Vec<u8>> {
        self.command_tx.clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawn all periodic tasks and the command consumer. Calling twice is a no-op.
    pub fn start(&mut self) {
        let Some(mut command_rx) = self.command_rx.take() else {
            warn!("simulator already started");
            return;
        };
        let intervals = self.simulator.intervals;
        self.simulator.report_status();

        let sim = self.simulator.clone();
        self.tasks.push(spawn_periodic(intervals.sensors, self.cancel.clone(), move || {
            let sim = sim.clone();
            async move { sim.run_sensor_tick().await }
        }));

        let sim = self.simulator.clone();
        self.tasks.push(spawn_periodic(intervals.location, self.cancel.clone(), move || {
            let sim = sim.clone();
            async move { sim.run_location_tick().await }
        }));

        let sim = self.simulator.clone();
        self.tasks.push(spawn_periodic(intervals.status, self.cancel.clone(), move || {
            let sim = sim.clone();
            async move { sim.report_status() }
        }));

        let sim = self.simulator.clone();
        let cancel = self.cancel.clone();
        self.tasks.push(tokio::spawn(async move {
            loop {
                let payload = tokio::select! {
                    _ = cancel.cancelled() => break,
                    payload = command_rx.recv() => payload,
                };
                match payload {
                    Some(payload) => sim.apply_command(&payload),
                    None => break,
                }
            }
            debug!("command consumer stopped");
        }));

        info!(
            sensors_s = intervals.sensors.as_secs(),
            location_s = intervals.location.as_secs(),
            status_s = intervals.status.as_secs(),
            "simulation started"
        );
    }

    /// Stop scheduling new steps and wait for in-flight ones to complete
    pub async fn stop(self) {
        self.cancel.cancel();
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                warn!(error = %e, "simulation task ended abnormally");
            }
        }
        info!("simulation stopped");
    }
}

fn spawn_periodic<F, Fut>(period: Duration, cancel: CancellationToken, mut step: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            step().await;
        }
    })
}
