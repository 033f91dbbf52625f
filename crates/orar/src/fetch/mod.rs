/// Document fetching, single and batched
mod batch;
mod client;

pub use batch::{run_in_batches, BatchOptions, BatchReport};
pub use client::{DocumentFetcher, FetchConfig};

use crate::config::OrarConfig;

impl From<&OrarConfig> for BatchOptions {
    fn from(config: &OrarConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            delay: config.batch_delay(),
        }
    }
}
