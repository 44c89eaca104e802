use anf_cloud_azure::{ArmClient, AzureNetAppProvider, ClientSecretCredential};
use anf_config::{AuthFile, SampleConfig};
use colored::Colorize;
use std::path::Path;

/// 認証ファイルから Azure プロバイダーを組み立てる
pub fn azure_provider(auth: &AuthFile) -> AzureNetAppProvider {
    let credential = ClientSecretCredential::new(
        &auth.tenant_id,
        &auth.client_id,
        &auth.client_secret,
        &auth.active_directory_endpoint_url,
        &auth.resource_manager_endpoint_url,
    );
    let client = ArmClient::new(credential, &auth.resource_manager_endpoint_url);
    AzureNetAppProvider::new(client, &auth.subscription_id)
}

/// 設定を読み込み、読み込んだファイルを表示する
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<SampleConfig> {
    let (config, path) = anf_config::load_config(explicit)?;
    match path {
        Some(path) => println!("📄 設定ファイル: {}", path.display().to_string().cyan()),
        None => println!("📄 設定ファイルなし（デフォルト設定を使用）"),
    }
    Ok(config)
}
