use clap::Parser;
use predict_sheet::{cli, config, error, export, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::io::Read;
use std::path::Path;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "predict_sheet=debug" } else { "predict_sheet=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else if input.is_file() {
        Ok(std::fs::read_to_string(input)?)
    } else {
        Err(error::SheetError::FileNotFound(input.display().to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Export { input, many_sheets, output, thumbnail_width, overflow, on_thumbnail_error } => {
            println!("📄 predict-sheet - エクスポート\n");

            let json = read_input(&input)?;

            let mut ctx = export::ExportContext::from_config(&config);
            if let Some(dir) = output {
                ctx = ctx.with_output_dir(dir);
            }
            if let Some(width) = thumbnail_width {
                ctx.thumbnail_width = width;
            }
            if let Some(policy) = overflow {
                ctx.overflow = policy;
            }
            if let Some(policy) = on_thumbnail_error {
                ctx.thumbnail_errors = policy;
            }

            println!("- Excelを生成中...{}", if many_sheets { " (カテゴリ別シート)" } else { "" });
            let report = export::export_json(&json, many_sheets, &ctx).await?;

            for sheet in &report.sheets {
                println!("  {}: {}行 / {}画像", sheet.name, sheet.data_rows, sheet.blocks.len());
            }
            for skipped in &report.skipped {
                println!("  ⚠ サムネイルなし: {} ({})", skipped.image_name, skipped.reason);
            }
            println!("✔ Excel出力: {}", report.path.display());

            println!("\n✅ エクスポート完了");
        }

        Commands::Scan { paths, output, check } => {
            let mut files = scanner::collect_sources(&paths)?;
            if check {
                files = scanner::check_sources(files)?;
            }
            let json = serde_json::to_string_pretty(&files)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("✔ {}件を保存: {}", files.len(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Config { set_output_dir, show } => {
            let mut config = config;

            if let Some(dir) = set_output_dir {
                config.set_output_dir(dir)?;
                println!("✔ 出力先を設定しました");
            }

            if show {
                println!("設定:");
                println!("  出力先: {}", config.resolve_output_dir().display());
                println!("  サムネイル幅: {}px", config.thumbnail_width);
                println!("  ブロック超過: {}", config.overflow);
                println!("  サムネイル読み込み失敗: {}", config.thumbnail_errors);
            }
        }
    }

    Ok(())
}
