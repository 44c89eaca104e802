use crate::console::{self, ConsoleProgress};
use crate::utils;
use anf_cloud::{NetAppProvider, RunGuard, provision};
use anf_config::AuthFile;
use colored::Colorize;
use std::path::Path;

/// サンプル本体: 作成して、フラグが立っていれば後片付け
///
/// 戻り値は終了コード（0: 成功、1: いずれかのフェーズで失敗）
pub async fn handle(
    config_path: Option<&Path>,
    account: Option<String>,
    keep_resources: bool,
) -> anyhow::Result<i32> {
    console::header();

    let config = utils::load_config(config_path)?;
    let auth = AuthFile::from_env()?;

    let account_name = account.unwrap_or_else(|| config.account_name());
    let mut ctx = config.resolve(&auth.subscription_id, &account_name)?;
    if keep_resources {
        ctx.cleanup = false;
    }

    println!("アカウント: {}", account_name.cyan());
    println!("ロケーション: {}", ctx.account.location.cyan());
    console::print_wait_budget(&ctx.poll);
    println!();

    let provider = utils::azure_provider(&auth);
    tracing::info!(
        provider = provider.name(),
        account = %account_name,
        "starting provisioning"
    );

    let outcome = provision(&provider, &ctx, &mut ConsoleProgress::new()).await;
    let guard = RunGuard::new(outcome);

    console::exiting();
    if guard.should_clean_up() {
        console::performing_cleanup();
    } else if !ctx.cleanup && guard.outcome().result.is_ok() {
        println!("\t{}", "クリーンアップは無効です（リソースを残します）".dimmed());
    }

    let summary = guard
        .finish(&provider, &ctx.poll, &mut ConsoleProgress::cleanup())
        .await;
    console::print_summary(&summary);

    Ok(summary.exit_code())
}
