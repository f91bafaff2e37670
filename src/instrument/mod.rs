//! Counter and timer instrumentation over a [`Storage`](crate::metrics::Storage).
//!
//! Each façade handle represents one logical observation and writes to the
//! store at most once, no matter how many threads invoke it.

pub mod counter;
pub mod recorder;
pub mod state;
pub mod timer;

pub use counter::Counter;
pub use recorder::Recorder;
pub use state::{ObservationGuard, ObservationState};
pub use timer::Timer;
