use clap::Parser;
use label_scan::{analyzer, cli, config, error, export, ocr, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use export::RenderOptions;
use label_scan_common::SubstanceMatcher;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("✖ {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "label_scan=debug" } else { "label_scan=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Scan {
            path,
            recursive,
            format,
            output,
            substances,
            show_text,
            highlight,
            use_cache,
            lang,
            psm,
            timeout,
        } => {
            let list = config.load_substances(substances.as_deref())?;
            let matcher = SubstanceMatcher::from_list(&list);

            let mut engine = ocr::TesseractCli::from_config(&config);
            if let Some(lang) = lang.as_deref() {
                engine = engine.with_language(lang);
            }
            if let Some(psm) = psm {
                engine = engine.with_page_seg_mode(psm);
            }
            if let Some(secs) = timeout {
                engine = engine.with_timeout(Duration::from_secs(secs));
            }

            // 1. 画像スキャン
            eprintln!("[1/2] 画像をスキャン中...");
            let images = scanner::scan_path(&path, recursive)?;
            if images.is_empty() {
                return Err(error::LabelScanError::NoImagesFound(path.display().to_string()));
            }
            eprintln!("✔ {}枚の画像を検出\n", images.len());

            // 2. OCR + 成分照合
            eprintln!(
                "[2/2] OCR・成分照合中... ({}成分){}",
                list.len(),
                if use_cache { " (キャッシュ有効)" } else { "" }
            );
            let reports = if use_cache {
                let cache_dir = cache_folder(&path);
                analyzer::scan_images_with_cache(&images, &cache_dir, &engine, &matcher, true).await?
            } else {
                analyzer::scan_images(&images, &engine, &matcher, true).await
            };

            let failed = reports.iter().filter(|r| r.is_failed()).count();
            if failed > 0 {
                eprintln!("⚠ {}枚の画像を読み取れませんでした", failed);
            }
            eprintln!("✔ 検査完了\n");

            let options = RenderOptions {
                show_text: show_text || highlight,
                highlight,
            };
            let content = export::render(&reports, format, list.len(), options)?;
            export::write_output(&content, output.as_deref())?;

            if let Some(output) = output {
                eprintln!("✔ 結果を保存: {}", output.display());
            }
        }

        Commands::Check {
            input,
            format,
            substances,
            highlight,
        } => {
            let list = config.load_substances(substances.as_deref())?;
            let matcher = SubstanceMatcher::from_list(&list);

            let (name, text) = read_input(input)?;
            let report = analyzer::check_text(&name, text, &matcher);

            let options = RenderOptions {
                show_text: highlight,
                highlight,
            };
            let content = export::render(std::slice::from_ref(&report), format, list.len(), options)?;
            export::write_output(&content, None)?;
        }

        Commands::List { substances } => {
            let list = config.load_substances(substances.as_deref())?;
            for name in &list {
                println!("{}", name);
            }
        }

        Commands::Config {
            set_tesseract,
            set_lang,
            set_substances,
            show,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(path) = set_tesseract {
                config.set_tesseract_path(path);
                changed = true;
            }
            if let Some(lang) = set_lang {
                config.set_language(lang);
                changed = true;
            }
            if let Some(path) = set_substances {
                config.set_substances_file(path)?;
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  tesseract: {}", config.tesseract_command());
                println!("  言語: {}", config.language);
                println!("  ページ分割モード: {}", config.page_seg_mode);
                println!("  エンジンモード: {}", config.engine_mode);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                match config.substances_path() {
                    Some(path) => println!("  成分リスト: {}", path.display()),
                    None => println!("  成分リスト: 組み込み"),
                }
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = analyzer::CacheFile::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = analyzer::CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                if analyzer::CacheFile::clear(&target)? {
                    println!("✔ キャッシュを削除しました: {}", cache_path.display());
                } else {
                    println!("キャッシュファイルが存在しません");
                }
            }
        }
    }

    Ok(())
}

/// キャッシュの保存先（ファイル指定時はその親フォルダ）
fn cache_folder(path: &std::path::Path) -> PathBuf {
    if path.is_file() {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        path.to_path_buf()
    }
}

/// ファイルまたは標準入力からテキストを読む
fn read_input(input: Option<PathBuf>) -> Result<(String, String)> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                return Err(error::LabelScanError::FileNotFound(path.display().to_string()));
            }
            let bytes = std::fs::read(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Ok((name, String::from_utf8_lossy(&bytes).into_owned()))
        }
        _ => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            Ok((String::new(), String::from_utf8_lossy(&bytes).into_owned()))
        }
    }
}
