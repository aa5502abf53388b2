use clap::Parser;
use payload_validator::{failure_outcome, run, Outcome, Shape};
use shared::{init_tracing, AppError, Config};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "payload-validator")]
#[command(about = "Validate Todo payloads against the request/response schemas")]
struct Cli {
    /// 検証するスキーマ
    #[arg(long, value_enum)]
    shape: Shape,

    /// 入力ファイル（省略時または "-" で標準入力）
    file: Option<PathBuf>,
}

fn finish(outcome: Outcome) -> ! {
    println!("{}", outcome.output);
    std::process::exit(outcome.exit_code)
}

fn main() {
    let cli = Cli::parse();

    // 設定が読めない時点では環境が不明なため詳細は出さない
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            finish(failure_outcome(&e, false))
        }
    };

    if let Err(e) = init_tracing(config.log_format) {
        let error = AppError::Internal(format!("トレーシング初期化エラー: {e}"));
        eprintln!("{error}");
        finish(failure_outcome(&error, config.include_error_details()));
    }

    info!(
        shape = cli.shape.as_str(),
        environment = %config.environment,
        "payload-validator開始"
    );

    finish(run(cli.shape, cli.file.as_deref(), config.include_error_details()))
}
