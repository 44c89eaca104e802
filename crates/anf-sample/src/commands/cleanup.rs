use crate::console::{self, ConsoleProgress};
use crate::utils;
use anf_cloud::{CleanupTargets, NetAppProvider, RunReport, cleanup};
use anf_config::AuthFile;
use colored::Colorize;
use std::path::Path;

/// 設定の名前から ID を組み立てて、クリーンアップだけを実行
pub async fn handle(config_path: Option<&Path>, account: &str) -> anyhow::Result<i32> {
    let config = utils::load_config(config_path)?;
    config.validate()?;
    if account.trim().is_empty() {
        anyhow::bail!("アカウント名を指定してください: anf-sample cleanup --account <name>");
    }

    let auth = AuthFile::from_env()?;
    let ids = config.resource_ids(&auth.subscription_id, account);
    let poll = config.polling.to_poll_config();

    println!("アカウント: {}", account.cyan());
    println!("  • {}", ids.volume_id.dimmed());
    println!("  • {}", ids.pool_id.dimmed());
    println!("  • {}", ids.account_id.dimmed());

    let provider = utils::azure_provider(&auth);
    tracing::info!(provider = provider.name(), account, "starting cleanup");
    let targets = CleanupTargets::from(ids);
    let mut report = RunReport::new();

    console::performing_cleanup();
    let result = cleanup(
        &provider,
        &targets,
        &poll,
        &mut report,
        &mut ConsoleProgress::cleanup(),
    )
    .await;

    let exit_code = match result {
        Ok(()) => {
            console::cleanup_completed();
            0
        }
        Err(e) => {
            eprintln!("\t{} {}", "Cleanup failed:".red().bold(), e);
            1
        }
    };

    println!();
    println!("{} ({}s)", report.to_string().bold(), report.elapsed_secs());
    Ok(exit_code)
}
