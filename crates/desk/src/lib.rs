pub use desk::OtcDesk;

mod desk;
