//! Azure SDK 認証ファイル（`AZURE_AUTH_LOCATION`）の読み込み

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 認証ファイルのパスを指す環境変数
pub const AZURE_AUTH_LOCATION: &str = "AZURE_AUTH_LOCATION";

const DEFAULT_AD_ENDPOINT: &str = "https://login.microsoftonline.com";
const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com/";

/// Service principal credentials and subscription
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthFile {
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
    pub tenant_id: String,
    #[serde(default = "default_ad_endpoint")]
    pub active_directory_endpoint_url: String,
    #[serde(default = "default_arm_endpoint")]
    pub resource_manager_endpoint_url: String,
}

fn default_ad_endpoint() -> String {
    DEFAULT_AD_ENDPOINT.to_string()
}

fn default_arm_endpoint() -> String {
    DEFAULT_ARM_ENDPOINT.to_string()
}

// client_secret をログに出さない
impl std::fmt::Debug for AuthFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFile")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field(
                "active_directory_endpoint_url",
                &self.active_directory_endpoint_url,
            )
            .field(
                "resource_manager_endpoint_url",
                &self.resource_manager_endpoint_url,
            )
            .finish()
    }
}

impl AuthFile {
    /// 環境変数 `AZURE_AUTH_LOCATION` が指すファイルを読み込む
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(AZURE_AUTH_LOCATION)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingEnvVar(AZURE_AUTH_LOCATION))?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::AuthFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let auth = Self::parse(&content).map_err(|e| match e {
            ParseError::Json(source) => ConfigError::AuthFileParse {
                path: path.to_path_buf(),
                source,
            },
            ParseError::Missing(field) => ConfigError::MissingAuthField(field),
        })?;

        tracing::debug!(path = %path.display(), "loaded auth file: {:?}", auth);
        Ok(auth)
    }

    fn parse(content: &str) -> std::result::Result<Self, ParseError> {
        // Windows で作成したファイルは BOM 付きのことがある
        let content = content.trim_start_matches('\u{feff}');
        let auth: AuthFile = serde_json::from_str(content).map_err(ParseError::Json)?;

        for (field, value) in [
            ("clientId", &auth.client_id),
            ("clientSecret", &auth.client_secret),
            ("subscriptionId", &auth.subscription_id),
            ("tenantId", &auth.tenant_id),
        ] {
            if value.trim().is_empty() {
                return Err(ParseError::Missing(field));
            }
        }

        Ok(auth)
    }
}

enum ParseError {
    Json(serde_json::Error),
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const SAMPLE: &str = r#"{
  "clientId": "11111111-1111-1111-1111-111111111111",
  "clientSecret": "s3cr3t",
  "subscriptionId": "22222222-2222-2222-2222-222222222222",
  "tenantId": "33333333-3333-3333-3333-333333333333",
  "activeDirectoryEndpointUrl": "https://login.microsoftonline.com",
  "resourceManagerEndpointUrl": "https://management.azure.com/",
  "activeDirectoryGraphResourceId": "https://graph.windows.net/",
  "managementEndpointUrl": "https://management.core.windows.net/"
}"#;

    #[test]
    fn test_parse_sdk_auth_file() {
        let auth = AuthFile::parse(SAMPLE).ok().unwrap();
        assert_eq!(auth.subscription_id, "22222222-2222-2222-2222-222222222222");
        assert_eq!(auth.client_secret, "s3cr3t");
    }

    #[test]
    fn test_endpoint_defaults() {
        let auth = AuthFile::parse(
            r#"{"clientId":"c","clientSecret":"s","subscriptionId":"sub","tenantId":"t"}"#,
        )
        .ok()
        .unwrap();
        assert_eq!(auth.active_directory_endpoint_url, DEFAULT_AD_ENDPOINT);
        assert_eq!(auth.resource_manager_endpoint_url, DEFAULT_ARM_ENDPOINT);
    }

    #[test]
    fn test_bom_is_ignored() {
        let content = format!("\u{feff}{}", SAMPLE);
        assert!(AuthFile::parse(&content).is_ok());
    }

    #[test]
    fn test_empty_field_rejected() {
        let result = AuthFile::parse(
            r#"{"clientId":"c","clientSecret":"s","subscriptionId":" ","tenantId":"t"}"#,
        );
        assert!(matches!(result, Err(ParseError::Missing("subscriptionId"))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = AuthFile::parse(SAMPLE).ok().unwrap();
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("azureauth.json");
        fs::write(&path, SAMPLE).unwrap();

        temp_env::with_var(AZURE_AUTH_LOCATION, Some(&path), || {
            let auth = AuthFile::from_env().unwrap();
            assert_eq!(auth.tenant_id, "33333333-3333-3333-3333-333333333333");
        });
    }

    #[test]
    #[serial]
    fn test_from_env_missing() {
        temp_env::with_var_unset(AZURE_AUTH_LOCATION, || {
            let result = AuthFile::from_env();
            assert!(matches!(
                result,
                Err(ConfigError::MissingEnvVar(AZURE_AUTH_LOCATION))
            ));
        });
    }

    #[test]
    fn test_from_path_malformed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("azureauth.json");
        fs::write(&path, "not json").unwrap();

        let result = AuthFile::from_path(&path);
        assert!(matches!(result, Err(ConfigError::AuthFileParse { .. })));
    }

    #[test]
    fn test_from_path_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = AuthFile::from_path(&temp_dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::AuthFileRead { .. })));
    }
}
