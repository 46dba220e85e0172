use label_scan_common::{Occurrence, SubstanceMatcher};
use serde::{Deserialize, Serialize};

/// 画像1枚分の検査結果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub file_name: String,

    #[serde(default)]
    pub file_path: String,

    #[serde(default)]
    pub extracted_text: String,   // OCRテキスト

    #[serde(default)]
    pub matches: Vec<String>,     // 検出成分（成分リスト順）

    #[serde(default)]
    pub occurrences: Vec<Occurrence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,    // OCR失敗時のみ
}

impl ScanReport {
    pub fn from_text(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        text: String,
        matcher: &SubstanceMatcher,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            matches: matcher.find(&text),
            occurrences: matcher.find_occurrences(&text),
            extracted_text: text,
            error: None,
        }
    }

    /// OCR失敗時は空テキストとして照合し、エラーを添える
    pub fn failed(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        error: String,
        matcher: &SubstanceMatcher,
    ) -> Self {
        Self {
            error: Some(error),
            ..Self::from_text(file_name, file_path, String::new(), matcher)
        }
    }

    pub fn is_flagged(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
