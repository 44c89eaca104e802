mod commands;
mod console;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anf-sample")]
#[command(
    about = "Azure NetApp Files のスナップショットポリシーを作成して、後片付けまで行うサンプル",
    long_about = None
)]
struct Cli {
    /// サンプル設定ファイル (YAML)
    #[arg(short, long, global = true, env = "ANF_SAMPLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// アカウント・容量プール・スナップショットポリシー・ボリュームを作成
    Run {
        /// アカウント名（省略時はランダム生成）
        #[arg(short, long)]
        account: Option<String>,
        /// 作成したリソースを削除せずに残す
        #[arg(long)]
        keep_resources: bool,
    },
    /// 前回の実行で残ったリソースを削除
    Cleanup {
        /// 削除するアカウント名
        #[arg(short, long)]
        account: String,
    },
    /// 読み込んだ設定を表示
    ShowConfig,
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr、進捗表示は stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config_path = cli.config.as_deref();

    // コマンドディスパッチ
    let exit_code = match cli.command {
        Commands::Version => {
            println!("anf-sample {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::ShowConfig => {
            commands::show_config::handle(config_path)?;
            0
        }
        Commands::Run {
            account,
            keep_resources,
        } => commands::run::handle(config_path, account, keep_resources).await?,
        Commands::Cleanup { account } => commands::cleanup::handle(config_path, &account).await?,
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
