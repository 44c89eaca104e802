use anf_cloud::{CleanupStatus, PollConfig, Progress, ProgressSink, RunSummary};
use colored::Colorize;

/// 進捗イベントをコンソールに表示する
pub struct ConsoleProgress {
    indent: &'static str,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { indent: "" }
    }

    /// クリーンアップ中は一段インデントする
    pub fn cleanup() -> Self {
        Self { indent: "\t" }
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_progress(&mut self, event: &Progress) {
        let line = render(event);
        match event {
            Progress::Failed { .. } => eprintln!("{}{}", self.indent, line),
            _ => println!("{}{}", self.indent, line),
        }
    }
}

fn render(event: &Progress) -> String {
    match event {
        Progress::Started(action) => format!("{}...", action.description()),
        Progress::Succeeded {
            action,
            resource_id: Some(id),
        } => format!(
            "\t{} {} done, resource id: {}",
            "✓".green(),
            action,
            id.cyan()
        ),
        Progress::Succeeded {
            action,
            resource_id: None,
        } => format!("\t{} {} done", "✓".green(), action),
        Progress::Failed { action, error } => {
            format!("\t{} {} failed: {}", "✗".red().bold(), action, error)
        }
        Progress::Skipped { action, reason } => {
            format!("\t{} {} skipped: {}", "-".dimmed(), action, reason)
        }
    }
}

pub fn header() {
    println!(
        "{}",
        "Azure NetApp Files snapshot policy sample - provisioning a volume with a snapshot policy"
            .bold()
    );
    println!("{}", "-".repeat(80));
}

/// 待機設定の表示行（間隔・回数・最大待機時間）
fn wait_budget_line(poll: &PollConfig) -> String {
    format!(
        "待機: {}s 間隔 × {} 回（最大 {}s）",
        poll.interval.as_secs(),
        poll.max_attempts,
        poll.budget().as_secs()
    )
}

pub fn print_wait_budget(poll: &PollConfig) {
    println!("{}", wait_budget_line(poll).dimmed());
}

pub fn exiting() {
    println!();
    println!("{}", "Exiting".bold());
}

pub fn performing_cleanup() {
    println!("\t{}", "Performing clean up".yellow());
}

pub fn cleanup_completed() {
    println!("\t{}", "Cleanup completed!".green().bold());
}

/// 実行結果のまとめを表示
pub fn print_summary(summary: &RunSummary) {
    if let Some(e) = &summary.provision_error {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }

    match &summary.cleanup {
        CleanupStatus::Completed => cleanup_completed(),
        CleanupStatus::Failed(e) => eprintln!("\t{} {}", "Cleanup failed:".red().bold(), e),
        CleanupStatus::Skipped => {}
    }

    let leftovers = summary.leftovers();
    if !leftovers.is_empty() {
        println!();
        println!(
            "{}",
            "以下のリソースが残っています（`anf-sample cleanup --account <name>` で削除できます）:"
                .yellow()
        );
        for id in leftovers {
            println!("  • {}", id.cyan());
        }
    }

    println!();
    println!(
        "{} ({}s)",
        summary.report.to_string().bold(),
        summary.report.elapsed_secs()
    );
}
