pub mod aggregator;
pub mod etl;
pub mod exporter;
pub mod extractor;
pub mod normalizer;
pub mod pipeline;
pub mod rate_limit;

pub use crate::domain::model::{MedicineRecord, TransformResult};
pub use crate::domain::ports::{EntrySource, Pipeline, RateLimiter, Storage};
pub use crate::utils::error::Result;
