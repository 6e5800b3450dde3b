// Parser module: turns upstream response bodies into typed inputs for the normalizer.

pub mod envelope;
pub mod payload;

pub use envelope::{parse_archive, parse_newsletter, unwrap_trpc};
pub use payload::{NestedPayload, RawAnalysisPayload};
