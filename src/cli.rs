use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "label-scan")]
#[command(about = "食品ラベル画像のOCR解析・有害成分チェックツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ラベル画像（またはフォルダ）をOCRして有害成分を検出
    Scan {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 出力形式 (text/lines/json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 成分リストファイル（JSON配列または1行1成分のテキスト）
        #[arg(short, long)]
        substances: Option<PathBuf>,

        /// 抽出テキストも表示
        #[arg(long)]
        show_text: bool,

        /// 抽出テキスト中の検出箇所を強調（--show-text を含む）
        #[arg(long)]
        highlight: bool,

        /// キャッシュを使用（再OCRをスキップ）
        #[arg(long)]
        use_cache: bool,

        /// OCR言語（例: eng, eng+fra）
        #[arg(long)]
        lang: Option<String>,

        /// tesseractのページ分割モード
        #[arg(long)]
        psm: Option<u8>,

        /// 画像1枚あたりのOCRタイムアウト（秒）
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// 抽出済みテキストから有害成分を検出（OCRなし）
    Check {
        /// テキストファイル（省略または "-" で標準入力）
        input: Option<PathBuf>,

        /// 出力形式 (text/lines/json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// 成分リストファイル
        #[arg(short, long)]
        substances: Option<PathBuf>,

        /// 入力テキストを検出箇所を強調して表示
        #[arg(long)]
        highlight: bool,
    },

    /// 使用中の成分リストを表示
    List {
        /// 成分リストファイル
        #[arg(short, long)]
        substances: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// tesseract実行ファイルを設定
        #[arg(long)]
        set_tesseract: Option<String>,

        /// OCR言語を設定
        #[arg(long)]
        set_lang: Option<String>,

        /// 既定の成分リストファイルを設定
        #[arg(long)]
        set_substances: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Lines,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "lines" | "list" => Ok(OutputFormat::Lines),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text, lines, or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Lines => write!(f, "lines"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
