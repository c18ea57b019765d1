pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::client::{ClientError, RunOutcome, run, run_with_config};
pub use frameworks::config::ClientConfig;
