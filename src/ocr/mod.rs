//! テキスト抽出モジュール
//!
//! 画像からテキストを取り出す外部エンジンの抽象化。
//! エンジンの誤読・改行・余分な空白はそのまま返し、補正は照合側で吸収する。

mod tesseract;

pub use tesseract::TesseractCli;

use crate::error::{LabelScanError, Result};
use std::future::Future;
use std::path::Path;

/// 画像 → テキスト
pub trait TextSource: Sync {
    /// ログ表示用の名前
    fn name(&self) -> &str;

    fn extract_text(&self, image: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// 抽出済みテキストファイルを読むだけのテキストソース
///
/// 画像と同じ場所にある `<stem>.txt` を読む。OCRを通さずに照合したい場合やテスト用。
#[derive(Debug, Clone, Default)]
pub struct PlainText;

impl PlainText {
    pub fn text_path(image: &Path) -> std::path::PathBuf {
        image.with_extension("txt")
    }
}

impl TextSource for PlainText {
    fn name(&self) -> &str {
        "plain-text"
    }

    async fn extract_text(&self, image: &Path) -> Result<String> {
        let path = Self::text_path(image);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LabelScanError::OcrFailed(format!("{}: {}", path.display(), e)))
    }
}
