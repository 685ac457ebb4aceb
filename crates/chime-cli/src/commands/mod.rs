pub mod describe;
pub mod next;
pub mod watch;
