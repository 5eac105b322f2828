use crate::domain::model::GramBounds;
use regex::Regex;
use std::sync::LazyLock;

/// 半形與全形數字，藥典內文兩種都會出現
const DIGIT: &str = "[0-9０-９]";

/// 數值寫法：整數或小數
pub(crate) fn number_pattern() -> String {
    format!(r"{d}+(?:\.{d}+)?", d = DIGIT)
}

static RANGE_FORM: LazyLock<Regex> = LazyLock::new(|| {
    let number = number_pattern();
    Regex::new(&format!(r"({n})[～~\-]({n})g", n = number)).expect("range pattern must compile")
});

static SINGLE_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({})g", number_pattern())).expect("single pattern must compile")
});

/// 解析克數運算式。先找範圍寫法，找不到才找單一數值；兩者皆無回傳 `None`。
///
/// 搜尋不需錨定字首，`每日3～6g，分两次服用` 也能取得 3 與 6。
/// min 大於 max 的來源資料原樣保留。超出 `f64` 範圍的數值視為無法解析。
pub fn normalize(expression: &str) -> Option<GramBounds> {
    if let Some(caps) = RANGE_FORM.captures(expression) {
        return Some(GramBounds {
            min: parse_grams(&caps[1])?,
            max: parse_grams(&caps[2])?,
        });
    }

    let caps = SINGLE_FORM.captures(expression)?;
    let value = parse_grams(&caps[1])?;
    Some(GramBounds {
        min: value,
        max: value,
    })
}

fn parse_grams(number: &str) -> Option<f64> {
    let ascii: String = number.chars().map(fold_digit).collect();
    ascii.parse::<f64>().ok().filter(|value| value.is_finite())
}

// U+FF10..U+FF19 -> '0'..'9'
fn fold_digit(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        _ => c,
    }
}
