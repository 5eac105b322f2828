//! 把藥品清單轉成「藥名 -> 用量範圍」對照表，並輸出成可直接引入的 JavaScript 檔
//!
//! 輸出格式：
//!
//! ```text
//! // 共 N 种药物的用量数据
//! const medicineDosageData = { ... };
//!
//! // 统计：共 N 种药物有用量数据
//! ```

use crate::core::normalizer::normalize;
use crate::domain::model::{DosageRange, DuplicatePolicy, MedicineRecord, OutputMapping};
use crate::utils::error::{EtlError, Result};

pub const DEFAULT_CONST_NAME: &str = "medicineDosageData";

#[derive(Debug, Clone)]
pub struct Exporter {
    const_name: String,
    duplicate_policy: DuplicatePolicy,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_CONST_NAME, DuplicatePolicy::default())
    }
}

impl Exporter {
    pub fn new(const_name: impl Into<String>, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            const_name: const_name.into(),
            duplicate_policy,
        }
    }

    /// 無用量或無法解析的記錄不會出現在對照表中
    pub fn build_mapping(&self, records: &[MedicineRecord]) -> OutputMapping {
        let mut mapping = OutputMapping::new();

        for record in records {
            let Some(expression) = record.dosage.as_deref() else {
                continue;
            };
            let Some(bounds) = normalize(expression) else {
                tracing::debug!(
                    "Entry {} ({}) has unparseable dosage '{}'",
                    record.entry_id,
                    record.title,
                    expression
                );
                continue;
            };

            let range = DosageRange::new(bounds, record.dosage_text.clone().unwrap_or_default());

            if mapping.contains_key(&record.title) {
                match self.duplicate_policy {
                    DuplicatePolicy::LastWins => {
                        tracing::warn!(
                            "⚠️ Duplicate title '{}' (entry {}) overwrites earlier entry",
                            record.title,
                            record.entry_id
                        );
                    }
                    DuplicatePolicy::KeepFirst => {
                        tracing::warn!(
                            "⚠️ Duplicate title '{}' (entry {}) ignored, keeping first",
                            record.title,
                            record.entry_id
                        );
                        continue;
                    }
                }
            }

            // IndexMap::insert 覆寫時保留原位置
            mapping.insert(record.title.clone(), range);
        }

        mapping
    }

    pub fn render(&self, mapping: &OutputMapping) -> Result<String> {
        let literal = serde_json::to_string_pretty(mapping)?;
        let count = mapping.len();

        Ok(format!(
            "// 共 {count} 种药物的用量数据\nconst {name} = {literal};\n\n// 统计：共 {count} 种药物有用量数据\n",
            name = self.const_name,
        ))
    }
}

/// 讀回 [`Exporter::render`] 產生的檔案
pub fn parse_artifact(content: &str) -> Result<OutputMapping> {
    let code = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");

    let declaration = code
        .trim()
        .strip_prefix("const ")
        .ok_or_else(|| artifact_error("missing const declaration"))?;
    let (_, literal) = declaration
        .split_once('=')
        .ok_or_else(|| artifact_error("missing '=' in declaration"))?;
    let literal = literal
        .trim()
        .strip_suffix(';')
        .ok_or_else(|| artifact_error("declaration is not terminated by ';'"))?;

    serde_json::from_str(literal).map_err(|e| artifact_error(&e.to_string()))
}

fn artifact_error(message: &str) -> EtlError {
    EtlError::ArtifactFormatError {
        message: message.to_string(),
    }
}
