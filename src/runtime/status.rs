use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use strum::{Display, EnumIter};

/// Periodic tasks run by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    Sensors,
    Location,
    Commands,
    Status,
}

/// Task status tracking
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskStatus {
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub run_count: u64,
    pub error_count: u64,
}

/// Counters for every task, shared between the task loops and the status report
#[derive(Debug, Default)]
pub struct TaskStatuses {
    sensors: RwLock<TaskStatus>,
    location: RwLock<TaskStatus>,
    commands: RwLock<TaskStatus>,
    status: RwLock<TaskStatus>,
}

impl TaskStatuses {
    fn slot(&self, kind: TaskKind) -> &RwLock<TaskStatus> {
        match kind {
            TaskKind::Sensors => &self.sensors,
            TaskKind::Location => &self.location,
            TaskKind::Commands => &self.commands,
            TaskKind::Status => &self.status,
        }
    }

    pub fn record_run(&self, kind: TaskKind) {
        let mut status = self.slot(kind).write();
        status.last_run = Some(Utc::now());
        status.run_count += 1;
    }

    pub fn record_error(&self, kind: TaskKind, error: impl ToString) {
        let mut status = self.slot(kind).write();
        status.last_error = Some(error.to_string());
        status.error_count += 1;
    }

    pub fn get(&self, kind: TaskKind) -> TaskStatus {
        self.slot(kind).read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_per_task() {
        let statuses = TaskStatuses::default();
        statuses.record_run(TaskKind::Sensors);
        statuses.record_run(TaskKind::Sensors);
        statuses.record_error(TaskKind::Commands, "bad payload");

        let sensors = statuses.get(TaskKind::Sensors);
        assert_eq!(sensors.run_count, 2);
        assert!(sensors.last_run.is_some());
        assert_eq!(sensors.error_count, 0);

        let commands = statuses.get(TaskKind::Commands);
        assert_eq!(commands.error_count, 1);
        assert_eq!(commands.last_error.as_deref(), Some("bad payload"));
        assert_eq!(statuses.get(TaskKind::Location), TaskStatus::default());
    }
}
