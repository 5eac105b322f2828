use crate::config::toml_config::TomlConfig;
use crate::core::aggregator::{Aggregator, CrawlReport};
use crate::core::exporter::Exporter;
use crate::domain::model::{MedicineRecord, TransformResult};
use crate::domain::ports::{EntrySource, Pipeline, RateLimiter, Storage};
use crate::utils::error::{EtlError, FetchFailure, Result};

/// 管道需要的範圍與輸出設定
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub start_id: u64,
    pub end_id: u64,
    pub intermediate_file: String,
    pub artifact_file: String,
    pub exporter: Exporter,
}

impl PipelineSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            start_id: config.crawl.start_id,
            end_id: config.crawl.end_id,
            intermediate_file: config.load.intermediate_file.clone(),
            artifact_file: config.load.artifact_file.clone(),
            exporter: Exporter::new(config.load.const_name.clone(), config.load.duplicate_policy),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub artifact_path: String,
    pub records: usize,
    pub medicines: usize,
}

/// 抓取 -> 中繼 JSON -> 用量對照表
pub struct DosagePipeline<S: Storage, F: EntrySource, L: RateLimiter> {
    storage: S,
    source: F,
    limiter: L,
    settings: PipelineSettings,
}

impl<S: Storage, F: EntrySource, L: RateLimiter> DosagePipeline<S, F, L> {
    pub fn new(storage: S, source: F, limiter: L, settings: PipelineSettings) -> Self {
        Self {
            storage,
            source,
            limiter,
            settings,
        }
    }

    /// 單筆查詢，不經過節流
    pub async fn fetch_one(&self, entry_id: u64) -> std::result::Result<MedicineRecord, FetchFailure> {
        self.source.fetch(entry_id).await
    }

    pub async fn crawl_report(&self) -> Result<CrawlReport> {
        Aggregator::new(&self.source, &self.limiter)
            .crawl_range(self.settings.start_id, self.settings.end_id)
            .await
    }

    /// 抓取並寫出中繼檔，對應拆開執行的第一階段
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let report = self.crawl_report().await?;
        self.save_records(&report.records).await?;
        Ok(report)
    }

    /// 讀取中繼檔並輸出對照表，對應拆開執行的第二階段
    pub async fn convert(&self) -> Result<ConvertSummary> {
        let records = self.load_records().await?;
        let record_count = records.len();
        let result = self.transform(records).await?;
        let medicines = result.mapping.len();
        let artifact_path = self.write_artifact(&result).await?;

        Ok(ConvertSummary {
            artifact_path,
            records: record_count,
            medicines,
        })
    }

    pub async fn save_records(&self, records: &[MedicineRecord]) -> Result<String> {
        let json = serde_json::to_string_pretty(records)?;
        self.storage
            .write_file(&self.settings.intermediate_file, json.as_bytes())
            .await?;

        let path = self.storage.describe(&self.settings.intermediate_file);
        tracing::info!("💾 Saved {} records to {}", records.len(), path);
        Ok(path)
    }

    pub async fn load_records(&self) -> Result<Vec<MedicineRecord>> {
        let file = &self.settings.intermediate_file;
        let data = self.storage.read_file(file).await.map_err(|e| match e {
            EtlError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                EtlError::MissingInput {
                    path: self.storage.describe(file),
                }
            }
            other => other,
        })?;

        let records: Vec<MedicineRecord> = serde_json::from_slice(&data)?;
        tracing::info!(
            "📂 Loaded {} records from {}",
            records.len(),
            self.storage.describe(file)
        );
        Ok(records)
    }

    async fn write_artifact(&self, result: &TransformResult) -> Result<String> {
        let rendered = self.settings.exporter.render(&result.mapping)?;
        self.storage
            .write_file(&self.settings.artifact_file, rendered.as_bytes())
            .await?;

        let path = self.storage.describe(&self.settings.artifact_file);
        tracing::info!(
            "📝 Wrote {} with {} medicines",
            path,
            result.mapping.len()
        );
        Ok(path)
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: EntrySource, L: RateLimiter> Pipeline for DosagePipeline<S, F, L> {
    async fn extract(&self) -> Result<Vec<MedicineRecord>> {
        Ok(self.crawl_report().await?.records)
    }

    async fn transform(&self, data: Vec<MedicineRecord>) -> Result<TransformResult> {
        let mapping = self.settings.exporter.build_mapping(&data);
        tracing::debug!(
            "{} of {} records normalized into the dosage table",
            mapping.len(),
            data.len()
        );

        Ok(TransformResult {
            records: data,
            mapping,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        self.save_records(&result.records).await?;
        self.write_artifact(&result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exporter::parse_artifact;
    use crate::core::rate_limit::Unthrottled;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn describe(&self, path: &str) -> String {
            format!("mock://{}", path)
        }
    }

    struct FixtureSource {
        entries: HashMap<u64, MedicineRecord>,
    }

    impl FixtureSource {
        fn new() -> Self {
            let entries = [
                (2, "人参", Some("3～9g"), Some("3～9g，另煎兑服。")),
                (3, "冰片", None, Some("外用适量。")),
                (5, "甘草", Some("2～10g"), Some("2～10g。")),
            ]
            .into_iter()
            .map(|(id, title, dosage, text)| {
                (
                    id,
                    MedicineRecord {
                        entry_id: id,
                        title: title.to_string(),
                        pinyin: None,
                        dosage: dosage.map(str::to_string),
                        dosage_text: text.map(str::to_string),
                    },
                )
            })
            .collect();
            Self { entries }
        }
    }

    #[async_trait]
    impl EntrySource for FixtureSource {
        async fn fetch(&self, entry_id: u64) -> std::result::Result<MedicineRecord, FetchFailure> {
            self.entries
                .get(&entry_id)
                .cloned()
                .ok_or(FetchFailure::EmptyData)
        }
    }

    fn settings(start_id: u64, end_id: u64) -> PipelineSettings {
        PipelineSettings {
            start_id,
            end_id,
            intermediate_file: "medicines.json".to_string(),
            artifact_file: "medicine_data.js".to_string(),
            exporter: Exporter::default(),
        }
    }

    #[tokio::test]
    async fn test_extract_transform_load() {
        let storage = MockStorage::new();
        let pipeline =
            DosagePipeline::new(storage.clone(), FixtureSource::new(), Unthrottled, settings(1, 6));

        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 3);

        let result = pipeline.transform(records).await.unwrap();
        assert_eq!(result.mapping.len(), 2);

        let path = pipeline.load(result).await.unwrap();
        assert_eq!(path, "mock://medicine_data.js");

        let intermediate = storage.get_file("medicines.json").await.unwrap();
        let saved: Vec<MedicineRecord> = serde_json::from_slice(&intermediate).unwrap();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[1].title, "冰片");
        assert!(saved[1].dosage.is_none());

        let artifact = storage.get_file("medicine_data.js").await.unwrap();
        let mapping = parse_artifact(&String::from_utf8(artifact).unwrap()).unwrap();
        assert_eq!(mapping["甘草"].max, 10.0);
    }

    #[tokio::test]
    async fn test_crawl_then_convert() {
        let storage = MockStorage::new();
        let pipeline =
            DosagePipeline::new(storage.clone(), FixtureSource::new(), Unthrottled, settings(2, 5));

        let report = pipeline.crawl().await.unwrap();
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert!(storage.get_file("medicine_data.js").await.is_none());

        let summary = pipeline.convert().await.unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.medicines, 2);
        assert!(storage.get_file("medicine_data.js").await.is_some());
    }

    #[tokio::test]
    async fn test_convert_without_intermediate_file() {
        let pipeline = DosagePipeline::new(
            MockStorage::new(),
            FixtureSource::new(),
            Unthrottled,
            settings(2, 5),
        );

        match pipeline.convert().await {
            Err(EtlError::MissingInput { path }) => assert_eq!(path, "mock://medicines.json"),
            other => panic!("expected MissingInput, got {:?}", other.map(|s| s.medicines)),
        }
    }

    #[tokio::test]
    async fn test_convert_rejects_corrupted_intermediate_file() {
        let storage = MockStorage::new();
        storage
            .write_file("medicines.json", b"{not json")
            .await
            .unwrap();
        let pipeline =
            DosagePipeline::new(storage, FixtureSource::new(), Unthrottled, settings(2, 5));

        assert!(matches!(
            pipeline.convert().await,
            Err(EtlError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_one_bypasses_range() {
        let pipeline = DosagePipeline::new(
            MockStorage::new(),
            FixtureSource::new(),
            Unthrottled,
            settings(100, 200),
        );

        let record = pipeline.fetch_one(2).await.unwrap();
        assert_eq!(record.title, "人参");
        assert_eq!(pipeline.fetch_one(4).await, Err(FetchFailure::EmptyData));
    }
}
