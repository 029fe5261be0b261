// Library surface for the binary and for integration tests.
// The engine (variation, normalize, matcher, mode, session, stats) does no
// I/O; the remaining modules belong to the terminal host.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod matcher;
pub mod mode;
pub mod normalize;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod time_series;
pub mod timer;
pub mod trace_init;
pub mod variation;
pub mod word;

pub use matcher::Outcome;
pub use mode::Mode;
pub use session::{Session, SessionState};
pub use stats::Summary;
pub use word::WordRecord;
