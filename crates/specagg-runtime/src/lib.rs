pub mod error;
pub mod orchestrator;
pub mod output;

pub use error::{RuntimeError, RuntimeResult};
pub use orchestrator::{Aggregator, RunReport, ServiceReport};
pub use output::{output_path, write_spec, SpecSummary};
