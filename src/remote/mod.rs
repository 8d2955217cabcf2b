//! Remote partial-sum evaluation
//!
//! The compute service is opaque: it takes a term range and answers with the
//! sum of those terms as a decimal string. [`RemoteSumClient`] is the seam the
//! aggregator depends on; [`HttpSumClient`] talks to the real service and
//! [`LocalSeriesClient`] evaluates the same contract in-process.

pub mod http;
pub mod local;

pub use http::HttpSumClient;
pub use local::LocalSeriesClient;

use crate::errors::Result;
use crate::partition::SeriesRange;
use async_trait::async_trait;
use bigdecimal::BigDecimal;

/// Evaluates the sum of series terms over one range
#[async_trait]
pub trait RemoteSumClient: Send + Sync {
    /// Sum of the terms with indices in `range`
    async fn partial_sum(&self, range: SeriesRange) -> Result<BigDecimal>;

    /// Short label for logs
    fn describe(&self) -> String;
}
