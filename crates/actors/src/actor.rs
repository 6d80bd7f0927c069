use eyre::{eyre, Result};
use tokio::task::JoinHandle;
use tracing::info;

use crate::channels::Broadcaster;
use crate::shared_state::SharedState;

pub type WorkerResult = Result<String>;

pub type ActorResult = Result<Vec<JoinHandle<WorkerResult>>>;

/// A unit of work that spawns one or more tokio workers.
pub trait Actor {
    fn start(&self) -> ActorResult;

    fn name(&self) -> &'static str;

    /// Starts the actor and awaits all of its workers. Meant for one-shot actors.
    fn start_and_wait(&self) -> impl std::future::Future<Output = Result<()>> + Send
    where
        Self: Sync,
    {
        async move {
            let handles = self.start()?;
            let actor_name = self.name();
            for handle in handles {
                match handle.await {
                    Ok(Ok(msg)) => info!("One-shot actor '{}' completed with message: {}", actor_name, msg),
                    Ok(Err(e)) => return Err(eyre!("Actor '{}' failed with error: {}", actor_name, e)),
                    Err(e) => return Err(eyre!("Actor task execution failed for '{}' with error: {}", actor_name, e)),
                }
            }
            Ok(())
        }
    }
}

pub trait Producer<T>
where
    T: Sync + Send + Clone,
{
    fn produce(&mut self, broadcaster: Broadcaster<T>) -> &mut Self;
}

pub trait Consumer<T>
where
    T: Sync + Send + Clone,
{
    fn consume(&mut self, receiver: Broadcaster<T>) -> &mut Self;
}

pub trait Accessor<T> {
    fn access(&mut self, data: SharedState<T>) -> &mut Self;
}
