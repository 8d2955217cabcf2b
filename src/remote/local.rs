//! In-process partial-sum evaluator
//!
//! Answers the same contract as the remote service by summing the series
//! directly on tokio's blocking pool.

use crate::arithmetic::WorkingPrecision;
use crate::errors::{PiError, Result};
use crate::partition::SeriesRange;
use crate::remote::RemoteSumClient;
use crate::series;
use async_trait::async_trait;
use bigdecimal::BigDecimal;

#[derive(Debug, Clone, Copy)]
pub struct LocalSeriesClient {
    ctx: WorkingPrecision,
}

impl LocalSeriesClient {
    pub fn new(ctx: WorkingPrecision) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RemoteSumClient for LocalSeriesClient {
    async fn partial_sum(&self, range: SeriesRange) -> Result<BigDecimal> {
        let ctx = self.ctx;
        tokio::task::spawn_blocking(move || series::partial_sum(range.start(), range.end(), &ctx))
            .await
            .map_err(|e| PiError::WorkerFailed(format!("local evaluation of {}: {}", range, e)))?
    }

    fn describe(&self) -> String {
        format!("local ({} digits)", self.ctx.significant_digits())
    }
}
