use eyre::Result;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{Actor, WorkerResult};

/// Owns the join handles of every started actor worker.
#[derive(Default)]
pub struct ActorsManager {
    tasks: Vec<JoinHandle<WorkerResult>>,
}

impl ActorsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, actor: impl Actor) -> Result<()> {
        match actor.start() {
            Ok(workers) => {
                info!(actor = actor.name(), workers = workers.len(), "actor started");
                self.tasks.extend(workers);
                Ok(())
            }
            Err(e) => {
                error!("Error starting {} : {}", actor.name(), e);
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits until every worker has finished, logging each outcome.
    pub async fn wait(self) {
        let mut remaining = self.tasks;

        while !remaining.is_empty() {
            let (result, index, rest) = futures::future::select_all(remaining).await;
            match result {
                Ok(Ok(msg)) => info!("ActorWorker {index} finished : {msg}"),
                Ok(Err(e)) => error!("ActorWorker {index} finished with error : {e}"),
                Err(e) => error!("ActorWorker join error {index} : {e}"),
            }
            remaining = rest;
        }
    }
}
