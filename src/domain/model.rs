use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 目錄 API 的回應外殼 `{code, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub data: Option<EntryPayload>,
}

/// `data` 欄位中我們關心的部分，其餘欄位忽略
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    #[serde(default)]
    pub entry_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pinyin_title: Option<String>,
    #[serde(default)]
    pub html_content: Option<String>,
}

/// 單筆藥品資料，也是中繼 JSON 檔的元素格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineRecord {
    pub entry_id: u64,
    pub title: String,
    pub pinyin: Option<String>,
    /// 原始用量字串，例如 `3～6g`
    pub dosage: Option<String>,
    /// 包含用量的完整說明文字
    pub dosage_text: Option<String>,
}

impl MedicineRecord {
    pub fn has_dosage(&self) -> bool {
        self.dosage.is_some()
    }
}

/// 以克為單位的數值範圍
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GramBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageRange {
    pub min: f64,
    pub max: f64,
    /// 原始說明文字
    pub text: String,
}

impl DosageRange {
    pub fn new(bounds: GramBounds, text: impl Into<String>) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
            text: text.into(),
        }
    }
}

/// 藥名 -> 用量範圍，保留插入順序
pub type OutputMapping = IndexMap<String, DosageRange>;

/// 同名藥品的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    LastWins,
    KeepFirst,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "last-wins" => Ok(DuplicatePolicy::LastWins),
            "keep-first" => Ok(DuplicatePolicy::KeepFirst),
            other => Err(format!(
                "unknown duplicate policy '{}', expected last-wins or keep-first",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<MedicineRecord>,
    pub mapping: OutputMapping,
}
