extern crate self as otc_actors;

pub use actor::{Accessor, Actor, ActorResult, Consumer, Producer, WorkerResult};
pub use actor_manager::ActorsManager;
pub use channels::Broadcaster;
pub use shared_state::SharedState;

mod actor;
mod actor_manager;
mod channels;
mod shared_state;

#[inline]
pub fn subscribe_helper<A: Clone + Send + Sync>(broadcaster: &Broadcaster<A>) -> tokio::sync::broadcast::Receiver<A> {
    broadcaster.subscribe()
}

/// Shadows a `Broadcaster` binding with a fresh receiver of the same name.
#[macro_export]
macro_rules! subscribe {
    ($name:ident) => {
        let mut $name = $crate::subscribe_helper(&$name);
    };
}
