use std::sync::Arc;

use crate::configuration::{Iterations, LoadDescription};
use crate::error::{Error, EXIT_OK};
use crate::generator::PointFactory;
use crate::submitter::{HttpTransport, Submitter, Transport};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriverState {
    Running { completed: usize },
    Stopped(i32),
}

/// Runs generate/submit cycles one after another until the configured
/// number of iterations is done or a cycle fails.
pub struct Driver<T> {
    config: Arc<LoadDescription>,
    factory: PointFactory,
    submitter: Submitter<T>,
    state: DriverState,
    cycles: usize,
}

impl<T: Transport> Driver<T> {
    pub fn new(config: Arc<LoadDescription>, factory: PointFactory, transport: T) -> Self {
        let submitter = Submitter::new(transport, &config.endpoint, config.timeout, config.debug);
        Self {
            config,
            factory,
            submitter,
            state: DriverState::Running { completed: 0 },
            cycles: 0,
        }
    }

    /// Number of generate/submit cycles attempted so far.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Performs a single cycle, unless the driver already stopped.
    pub async fn tick(&mut self) -> DriverState {
        let completed = match self.state {
            DriverState::Running { completed } => completed,
            stopped @ DriverState::Stopped(_) => return stopped,
        };

        self.cycles += 1;
        self.state = match self.cycle().await {
            Err(err) => DriverState::Stopped(err.exit_code()),
            Ok(()) => {
                let completed = completed + 1;
                match self.config.iterations {
                    Iterations::Bounded(n) if completed >= n.get() => DriverState::Stopped(EXIT_OK),
                    _ => DriverState::Running { completed },
                }
            }
        };
        self.state
    }

    /// Ticks until the driver stops and returns the exit code it stopped with.
    pub async fn run(&mut self) -> i32 {
        loop {
            if let DriverState::Stopped(code) = self.tick().await {
                return code;
            }
        }
    }

    async fn cycle(&mut self) -> Result<(), Error> {
        let batch = self.factory.generate(
            self.config.batch_size,
            &self.config.keyspaces,
            self.config.host_bound,
        );
        let submission = self.submitter.submit(&batch).await?;
        tracing::debug!(
            cycle = self.cycles,
            status = submission.status,
            success = submission.is_success(),
            elapsed = ?submission.elapsed,
            "cycle done"
        );
        Ok(())
    }
}

pub async fn run(config: Arc<LoadDescription>) -> i32 {
    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(err) => {
            tracing::error!(error = %err, "failed to set up the http client");
            return err.exit_code();
        }
    };

    tracing::info!(
        endpoint = %config.endpoint,
        batch_size = config.batch_size,
        keyspaces = config.keyspaces.len(),
        iterations = ?config.iterations,
        "starting to send points"
    );

    let mut driver = Driver::new(config, PointFactory::new(), transport);
    let code = driver.run().await;

    tracing::info!(cycles = driver.cycles(), code, "stopped");
    code
}
