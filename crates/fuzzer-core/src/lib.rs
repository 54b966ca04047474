//! Test data model, client runner, and scheduler/executor (spec §3,
//! §4.D, §4.F, §4.G): the part of the differential fuzzer that actually
//! drives tests through dispatch, completion, comparison, and
//! archive/discard.

mod error;
mod executor;
mod launcher;
mod model;
mod stats;

pub use error::{Error, TestError, TestErrorKind};
pub use executor::{ExitReason, Executor, MAX_PARALLEL};
pub use launcher::{sh_wrap, ClientLauncher, CppLauncher, GethLauncher, HeraLauncher, ParityLauncher};
pub use model::{RunningTest, TestCase, TestId, TestState};
pub use stats::ExecutorStats;
