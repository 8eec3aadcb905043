mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::init::Scenario;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stack")]
#[command(about = "書けば、揃う。クラウドリソースを依存順にプロビジョニング", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// スタック定義のリソースをすべて作成（既存なら更新）
    Up {
        /// スタック定義ファイル（省略時は自動検出）
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// テンプレート変数（key=value、複数指定可）
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        /// 同時にプロビジョニングするリソース数の上限
        #[arg(short, long, env = "STACK_PARALLEL", default_value_t = 1)]
        parallel: usize,
        /// AzureサブスクリプションID
        #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
        subscription: Option<String>,
        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },
    /// スタック定義を検証して実行順序を表示
    Validate {
        /// スタック定義ファイル（省略時は自動検出）
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// テンプレート変数（key=value、複数指定可）
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },
    /// シナリオのテンプレートからスタック定義を作成
    Init {
        /// 診断ログの送信先
        #[arg(long, value_enum, default_value_t = Scenario::EventHub)]
        scenario: Scenario,
        /// 出力先
        #[arg(short, long, default_value = "stack.kdl")]
        output: PathBuf,
        /// 既存ファイルを上書き
        #[arg(long)]
        force: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrへ（stdoutは結果表示とJSON出力に使う）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Up {
            file,
            vars,
            parallel,
            subscription,
            json,
        } => {
            commands::up::handle(file, &vars, parallel, subscription, json).await?;
        }
        Commands::Validate { file, vars } => {
            commands::validate::handle(file, &vars)?;
        }
        Commands::Init {
            scenario,
            output,
            force,
        } => {
            commands::init::handle(scenario, &output, force)?;
        }
        Commands::Version => {
            println!("stackflow {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
