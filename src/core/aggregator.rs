use crate::domain::model::MedicineRecord;
use crate::domain::ports::{EntrySource, RateLimiter};
use crate::utils::error::{FetchFailure, Result};
use crate::utils::validation::validate_id_range;

#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// 依條目編號遞增排列
    pub records: Vec<MedicineRecord>,
    pub failures: Vec<(u64, FetchFailure)>,
}

impl CrawlReport {
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn with_dosage(&self) -> usize {
        self.records.iter().filter(|r| r.has_dosage()).count()
    }
}

/// 逐一抓取 `[start, end]` 範圍內的條目，失敗的條目記錄後略過，不重試
pub struct Aggregator<'a, F: EntrySource + ?Sized, L: RateLimiter + ?Sized> {
    source: &'a F,
    limiter: &'a L,
}

impl<'a, F: EntrySource + ?Sized, L: RateLimiter + ?Sized> Aggregator<'a, F, L> {
    pub fn new(source: &'a F, limiter: &'a L) -> Self {
        Self { source, limiter }
    }

    pub async fn crawl_range(&self, start_id: u64, end_id: u64) -> Result<CrawlReport> {
        validate_id_range("crawl", start_id, end_id)?;

        let mut report = CrawlReport::default();
        tracing::info!("🚀 Crawling entries {}..={}", start_id, end_id);

        for entry_id in start_id..=end_id {
            self.limiter.acquire().await;
            tracing::debug!("Fetching entry {}", entry_id);

            match self.source.fetch(entry_id).await {
                Ok(record) => {
                    tracing::info!(
                        "  ✓ [{}] {} - dosage: {}",
                        entry_id,
                        record.title,
                        record.dosage.as_deref().unwrap_or("-")
                    );
                    report.records.push(record);
                }
                Err(failure) => {
                    tracing::warn!("  ✗ [{}] skipped: {}", entry_id, failure);
                    report.failures.push((entry_id, failure));
                }
            }
        }

        tracing::info!(
            "📊 Crawled {} entries: {} fetched, {} with dosage, {} skipped",
            report.attempted(),
            report.records.len(),
            report.with_dosage(),
            report.failures.len()
        );

        Ok(report)
    }
}
