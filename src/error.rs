use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("パスが見つかりません: {0}")]
    PathNotFound(String),

    #[error("画像を読み取れません: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("OCRエンジンを起動できません: {0}")]
    OcrUnavailable(String),

    #[error("OCR実行エラー: {0}")]
    OcrFailed(String),

    #[error("OCRがタイムアウトしました（{0}秒）")]
    OcrTimeout(u64),

    #[error("成分リストの読み込みに失敗: {0}")]
    SubstanceList(#[from] label_scan_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelScanError {
    /// OCR段階（画像読み取り・エンジン）の失敗か
    pub fn is_ocr_failure(&self) -> bool {
        matches!(
            self,
            LabelScanError::ImageLoad(_)
                | LabelScanError::OcrUnavailable(_)
                | LabelScanError::OcrFailed(_)
                | LabelScanError::OcrTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LabelScanError>;
