pub mod building;
pub mod candidates;
pub mod claims;
pub mod factcheck;
pub mod fetch;
pub mod mock;
pub mod osm;
pub mod queries;
pub mod summary;
pub mod traits;
pub mod wiki;

pub use building::BuildingResolver;
pub use claims::{extract_claims, ClaimExtractor};
pub use factcheck::FactCheckPipeline;
pub use queries::build_queries;
pub use traits::*;

use crate::error::{ProviderError, ProviderResult};
use std::future::Future;
use std::time::Duration;

/// Runs one provider call under `limit`. Elapsing drops the call and reports
/// [`ProviderError::Timeout`].
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(ProviderError::Timeout(Some(limit))))
}
