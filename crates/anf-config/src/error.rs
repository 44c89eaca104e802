use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "環境変数 {0} が設定されていません。\
        `az ad sp create-for-rbac --sdk-auth` で作成した認証ファイルのパスを指定してください"
    )]
    MissingEnvVar(&'static str),

    #[error("認証ファイルを読み込めません: {path}: {source}")]
    AuthFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("認証ファイルの形式が不正です: {path}: {source}")]
    AuthFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("認証ファイルに {0} がありません")]
    MissingAuthField(&'static str),

    #[error("設定ファイルが見つかりません: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("設定ファイルの形式が不正です: {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("設定が不正です: {0}")]
    Invalid(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<anf_cloud::CloudError> for ConfigError {
    fn from(e: anf_cloud::CloudError) -> Self {
        match e {
            anf_cloud::CloudError::InvalidConfig(msg) => ConfigError::Invalid(msg),
            other => ConfigError::Invalid(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
