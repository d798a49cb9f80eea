/// 证件目录客户端
use crate::clients::{ApiClient, CatalogService};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{load_catalog_from_toml, Catalog, DocumentType};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// 通过 HTTP 获取证件目录
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    /// 创建新的目录客户端
    pub fn new(config: &Config) -> Self {
        Self {
            api: ApiClient::new(&config.catalog_api_base_url, &config.api_token),
        }
    }
}

#[async_trait]
impl CatalogService for CatalogClient {
    async fn fetch_catalog(&self) -> AppResult<Catalog> {
        let document_types: Vec<DocumentType> = self.api.get_json("document-types", &[]).await?;
        info!("✓ 目录服务返回 {} 种证件", document_types.len());
        Ok(Catalog::new(document_types))
    }
}

/// 从本地 TOML 文件读取证件目录
pub struct TomlCatalog {
    path: PathBuf,
}

impl TomlCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogService for TomlCatalog {
    async fn fetch_catalog(&self) -> AppResult<Catalog> {
        load_catalog_from_toml(&self.path).await
    }
}
