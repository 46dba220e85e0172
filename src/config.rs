use crate::error::{LabelScanError, Result};
use label_scan_common::SubstanceList;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const TESSERACT_ENV: &str = "LABEL_SCAN_TESSERACT";
const SUBSTANCES_ENV: &str = "LABEL_SCAN_SUBSTANCES";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// tesseract実行ファイル
    pub tesseract_path: String,
    /// OCR言語（tesseractの `-l`）
    pub language: String,
    /// ページ分割モード（`--psm`）
    pub page_seg_mode: u8,
    /// エンジンモード（`--oem`）
    pub engine_mode: u8,
    pub timeout_seconds: u64,
    /// 成分リストファイル（未設定なら組み込みリスト）
    pub substances_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".into(),
            language: "eng".into(),
            page_seg_mode: 11, // 疎なテキスト（ラベル向け）
            engine_mode: 3,
            timeout_seconds: 60,
            substances_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LabelScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("label-scan").join("config.json"))
    }

    /// tesseract実行ファイル（環境変数を優先）
    pub fn tesseract_command(&self) -> String {
        std::env::var(TESSERACT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.tesseract_path.clone())
    }

    /// 成分リストファイル（環境変数を優先）
    pub fn substances_path(&self) -> Option<PathBuf> {
        std::env::var_os(SUBSTANCES_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.substances_file.clone())
    }

    /// 成分リストを読み込む
    ///
    /// 優先順位: 引数 > 環境変数 > 設定ファイル > 組み込みリスト
    pub fn load_substances(&self, override_path: Option<&Path>) -> Result<SubstanceList> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(|| self.substances_path());

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(LabelScanError::FileNotFound(path.display().to_string()));
                }
                tracing::debug!(path = %path.display(), "成分リストを読み込み");
                Ok(SubstanceList::from_file(&path)?)
            }
            None => Ok(SubstanceList::default_list()),
        }
    }

    pub fn set_tesseract_path(&mut self, path: String) {
        self.tesseract_path = path;
    }

    pub fn set_language(&mut self, language: String) {
        self.language = language;
    }

    pub fn set_substances_file(&mut self, path: PathBuf) -> Result<()> {
        if !path.exists() {
            return Err(LabelScanError::FileNotFound(path.display().to_string()));
        }
        // 保存前に読み込めることを確認
        SubstanceList::from_file(&path)?;
        self.substances_file = Some(path);
        Ok(())
    }
}
