pub use broadcaster::Broadcaster;

mod broadcaster;
