//! tesseract CLI連携

use super::TextSource;
use crate::config::Config;
use crate::error::{LabelScanError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// `tesseract` 実行ファイルを子プロセスとして呼び出すOCRエンジン
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
    language: String,
    page_seg_mode: u8,
    engine_mode: u8,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(program: impl Into<String>) -> Self {
        let defaults = Config::default();
        Self {
            program: program.into(),
            language: defaults.language,
            page_seg_mode: defaults.page_seg_mode,
            engine_mode: defaults.engine_mode,
            timeout: Duration::from_secs(defaults.timeout_seconds),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tesseract_command())
            .with_language(&config.language)
            .with_page_seg_mode(config.page_seg_mode)
            .with_engine_mode(config.engine_mode)
            .with_timeout(Duration::from_secs(config.timeout_seconds))
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_page_seg_mode(mut self, psm: u8) -> Self {
        self.page_seg_mode = psm;
        self
    }

    pub fn with_engine_mode(mut self, oem: u8) -> Self {
        self.engine_mode = oem;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `tesseract <image> stdout -l <lang> --psm <psm> --oem <oem>`
    pub fn command_args(&self, image: &Path) -> Vec<OsString> {
        vec![
            image.as_os_str().to_os_string(),
            "stdout".into(),
            "-l".into(),
            self.language.clone().into(),
            "--psm".into(),
            self.page_seg_mode.to_string().into(),
            "--oem".into(),
            self.engine_mode.to_string().into(),
        ]
    }
}

impl TextSource for TesseractCli {
    fn name(&self) -> &str {
        &self.program
    }

    async fn extract_text(&self, image: &Path) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .args(self.command_args(image))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(program = %self.program, image = %image.display(), "tesseract起動");

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => return Err(LabelScanError::OcrTimeout(self.timeout.as_secs())),
            Ok(Err(e)) => {
                return Err(LabelScanError::OcrUnavailable(format!("{}: {}", self.program, e)))
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LabelScanError::OcrFailed(format!(
                "tesseract failed (code {:?}): {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(chars = text.chars().count(), "OCR完了");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_defaults() {
        let engine = TesseractCli::new("tesseract");
        let args = engine.command_args(Path::new("label.png"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(
            args,
            vec!["label.png", "stdout", "-l", "eng", "--psm", "11", "--oem", "3"]
        );
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            language: "eng+fra".into(),
            page_seg_mode: 6,
            ..Default::default()
        };
        let engine = TesseractCli::from_config(&config);
        let args: Vec<String> = engine
            .command_args(Path::new("a.jpg"))
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert!(args.contains(&"eng+fra".to_string()));
        assert!(args.contains(&"6".to_string()));
    }

    #[tokio::test]
    async fn test_missing_engine_is_unavailable() {
        let engine = TesseractCli::new("label-scan-no-such-ocr-engine");
        let result = engine.extract_text(Path::new("label.png")).await;
        assert!(matches!(result, Err(LabelScanError::OcrUnavailable(_))));
    }
}
