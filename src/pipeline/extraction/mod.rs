pub mod types;
pub mod sanitize;
pub mod segment;
pub mod classify;
pub mod builder;
pub mod medical_correction;
pub mod confidence;
pub mod resolve;
pub mod orchestrator;

pub use types::*;
pub use segment::segment;
pub use classify::{classify, parse_schedule};
pub use builder::build;
pub use confidence::*;
pub use resolve::resolve;
pub use orchestrator::*;
