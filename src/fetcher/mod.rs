// Fetcher module: upstream HTTP sources behind async traits.

pub mod api_client;
pub mod traits;

pub use api_client::ApiClient;
pub use traits::{AnalysisSource, PulseSource};
