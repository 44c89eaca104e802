pub mod auth;
pub mod error;
pub mod naming;
pub mod sample;

pub use auth::{AZURE_AUTH_LOCATION, AuthFile};
pub use error::*;
pub use sample::SampleConfig;

use std::path::{Path, PathBuf};

/// 設定ファイルのパスを指す環境変数
pub const ANF_SAMPLE_CONFIG: &str = "ANF_SAMPLE_CONFIG";

/// anf-sample の設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("anf-sample");
    Ok(config_dir)
}

/// サンプル設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 ANF_SAMPLE_CONFIG (直接パス指定)
/// 2. カレントディレクトリ: anf-sample.yaml, .anf-sample.yaml
/// 3. ~/.config/anf-sample/config.yaml (グローバル設定)
///
/// 見つからなければ `None`（デフォルト設定で実行）
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定（存在しなければエラー）
    if let Some(config_path) = std::env::var_os(ANF_SAMPLE_CONFIG).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in ["anf-sample.yaml", ".anf-sample.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 設定を読み込む。明示パスが優先、次に [`find_config_file`]、最後にデフォルト
pub fn load_config(explicit: Option<&Path>) -> Result<(SampleConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    match path {
        Some(path) => {
            let config = SampleConfig::from_path(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((SampleConfig::default(), None)),
    }
}
