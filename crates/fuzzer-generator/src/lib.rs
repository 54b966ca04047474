//! Test Generator Pipeline (spec §4.E): a bounded producer that fetches
//! from an opaque `TestFactory`, re-keys the payload, assigns the next
//! test id, writes the file, and hands the case to the scheduler.

mod factory;
mod producer;
mod rekey;

pub use factory::{SyntheticTestFactory, TestFactory};
pub use producer::run_producer;
pub use rekey::rekey_payload;
