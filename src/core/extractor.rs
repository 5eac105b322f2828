//! 從藥典條目的 HTML 中找出【用法与用量】段落與其中的克數
//!
//! 規則：
//! - 依文件順序掃描 `<p>` 與 `<b>`，第一個含有標記文字的元素即為標籤，不再往後找
//! - 標籤之後（文件順序）的第一個 `<p>` 是說明段落
//! - 在段落文字中搜尋第一個克數運算式，範圍寫法優先

use crate::core::normalizer::number_pattern;
use crate::domain::model::{EntryPayload, MedicineRecord};
use crate::utils::error::FetchFailure;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub const DOSAGE_MARKER: &str = "【用法与用量】";

static DOSAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let number = number_pattern();
    Regex::new(&format!(r"{n}[～~\-]{n}g|{n}g", n = number)).expect("dosage pattern must compile")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DosageExtract {
    pub dosage: Option<String>,
    pub text: Option<String>,
}

pub fn extract_dosage(html: &str) -> DosageExtract {
    let Some(text) = dosage_paragraph(html) else {
        return DosageExtract::default();
    };

    DosageExtract {
        dosage: find_dosage_expression(&text).map(str::to_string),
        text: Some(text),
    }
}

/// 第一個克數運算式，例如 `每日3～6g` 中的 `3～6g`
pub fn find_dosage_expression(text: &str) -> Option<&str> {
    DOSAGE_PATTERN.find(text).map(|m| m.as_str())
}

fn dosage_paragraph(html: &str) -> Option<String> {
    let document = Html::parse_fragment(html);
    let labels = Selector::parse("p, b").ok()?;

    let label = document
        .root_element()
        .select(&labels)
        .find(|el| el.text().collect::<String>().contains(DOSAGE_MARKER))?;

    // 標籤自身的子孫也算在「之後」
    let paragraph = document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != label.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "p")?;

    Some(paragraph.text().collect::<String>().trim().to_string())
}

/// 把 API 回傳的條目轉成 [`MedicineRecord`]
pub fn parse_entry(
    requested_id: u64,
    payload: EntryPayload,
) -> std::result::Result<MedicineRecord, FetchFailure> {
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(FetchFailure::MissingTitle)?;

    let extract = payload
        .html_content
        .as_deref()
        .filter(|html| !html.is_empty())
        .map(extract_dosage)
        .unwrap_or_default();

    Ok(MedicineRecord {
        entry_id: payload.entry_id.unwrap_or(requested_id),
        title,
        pinyin: payload.pinyin_title,
        dosage: extract.dosage,
        dosage_text: extract.text,
    })
}
