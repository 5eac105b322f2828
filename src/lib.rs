pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{http::HttpEntrySource, storage::LocalStorage};
pub use crate::config::TomlConfig;
pub use crate::core::{
    etl::EtlEngine,
    exporter::{parse_artifact, Exporter},
    extractor::extract_dosage,
    normalizer::normalize,
    pipeline::{DosagePipeline, PipelineSettings},
    rate_limit::{pacing, FixedInterval, Unthrottled},
};
pub use crate::domain::model::{DosageRange, MedicineRecord, OutputMapping};
pub use crate::domain::ports::RateLimiter;
pub use crate::utils::error::{EtlError, FetchFailure, Result};
