//! Simulated workload, the task type the service ships with.
//!
//! Every task sleeps for a delay picked once when the factory is built, then
//! fails with a fixed probability.

use super::registry::{ExecutableTask, TaskFactory};
use super::types::{Task, TaskId};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Type name the simulator is registered under.
pub const DEFAULT_TASK_TYPE: &str = "default";

/// Default chance (percent) that a simulated task fails.
pub const DEFAULT_FAILURE_PERCENT: u32 = 40;

const MIN_DELAY_MINUTES: u64 = 3;
const MAX_DELAY_MINUTES: u64 = 5;

pub struct SimulatedWorkloadFactory {
    rng: Arc<Mutex<StdRng>>,
    delay: Duration,
    failure_percent: u32,
}

impl SimulatedWorkloadFactory {
    /// Seeds from OS entropy and picks a delay of 3 to 5 whole minutes.
    pub fn from_entropy(failure_percent: u32) -> Self {
        let mut rng = StdRng::from_entropy();
        let delay = Duration::from_secs(60 * rng.gen_range(MIN_DELAY_MINUTES..=MAX_DELAY_MINUTES));

        Self::new(rng, delay, failure_percent)
    }

    pub fn new(rng: StdRng, delay: Duration, failure_percent: u32) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
            delay,
            failure_percent: failure_percent.min(100),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl TaskFactory for SimulatedWorkloadFactory {
    fn create(&self, task: &Task) -> Box<dyn ExecutableTask> {
        Box::new(SimulatedWorkload {
            task_id: task.id.clone(),
            rng: self.rng.clone(),
            delay: self.delay,
            failure_percent: self.failure_percent,
        })
    }
}

pub struct SimulatedWorkload {
    task_id: TaskId,
    rng: Arc<Mutex<StdRng>>,
    delay: Duration,
    failure_percent: u32,
}

#[async_trait]
impl ExecutableTask for SimulatedWorkload {
    async fn run(&mut self) -> Result<()> {
        tracing::debug!("Simulating {:?} of work for task {}", self.delay, self.task_id);
        tokio::time::sleep(self.delay).await;

        let roll: u32 = self.rng.lock().gen_range(0..100);
        if roll >= 100 - self.failure_percent {
            anyhow::bail!("simulated task failure");
        }

        Ok(())
    }
}
