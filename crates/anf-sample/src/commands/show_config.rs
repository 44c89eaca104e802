use crate::utils;
use colored::Colorize;
use std::path::Path;

/// 読み込んだ設定を YAML で表示（検証エラーは警告として表示）
pub fn handle(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = utils::load_config(config_path)?;

    println!();
    print!("{}", config.to_yaml()?);
    println!();

    match config.validate() {
        Ok(()) => println!("{}", "✓ 設定は有効です".green()),
        Err(e) => println!("{} {}", "⚠".yellow(), e),
    }
    Ok(())
}
