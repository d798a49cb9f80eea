//! 应用入口 - 编排层
//!
//! 负责初始化（校验配置、加载证件目录、创建外部服务客户端），
//! 然后回放一份订单脚本，结束时退出会话

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::clients::{CatalogClient, CatalogService, CheckoutClient, ScheduleClient, TomlCatalog};
use crate::config::Config;
use crate::models::{load_order_plan, Catalog, CheckoutPayload, IdentityContext};
use crate::orchestrator::order_runner;
use crate::services::ReceiptWriter;
use crate::utils::logging::log_startup;
use crate::workflow::{Collaborators, Configurator, ConfiguratorState, Operation};

/// 应用主结构
pub struct App {
    config: Config,
    collaborators: Collaborators,
    /// 目录加载失败时保存原因
    catalog: std::result::Result<Catalog, String>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        log_startup(&config);

        let collaborators = Collaborators {
            schedule: Arc::new(ScheduleClient::new(&config)),
            checkout: Arc::new(CheckoutClient::new(&config)),
            receipt: Arc::new(ReceiptWriter::with_path(config.receipt_file.clone())),
        };

        let source: Box<dyn CatalogService> = match &config.catalog_file {
            Some(path) => Box::new(TomlCatalog::new(path)),
            None => Box::new(CatalogClient::new(&config)),
        };
        let catalog = match source.fetch_catalog().await {
            Ok(catalog) => {
                info!("✓ 证件目录已加载: {} 种证件", catalog.len());
                Ok(catalog)
            }
            Err(e) => {
                error!("❌ {}失败: {}", Operation::CatalogLoad, e);
                Err(e.to_string())
            }
        };

        Ok(Self {
            config,
            collaborators,
            catalog,
        })
    }

    /// 创建会话配置器；目录不可用时进入 `Error`
    pub fn configurator(&self, identity: IdentityContext) -> Configurator {
        match &self.catalog {
            Ok(catalog) => Configurator::new(
                catalog.clone(),
                identity,
                self.collaborators.clone(),
                &self.config,
            ),
            Err(reason) => Configurator::failed(
                reason.clone(),
                identity,
                self.collaborators.clone(),
                &self.config,
            ),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<Option<CheckoutPayload>> {
        let plan = load_order_plan(Path::new(&self.config.order_file)).await?;
        let identity = IdentityContext::from_check_in_json(plan.check_in.as_deref());
        let mut configurator = self.configurator(identity);

        if let ConfiguratorState::Error { reason } = configurator.state() {
            anyhow::bail!("证件目录不可用: {}", reason);
        }

        let outcome = order_runner::play_order(&mut configurator, &plan).await;
        configurator.exit();

        let payload = outcome?;
        match &payload {
            Some(payload) => {
                info!("\n{}", "=".repeat(60));
                info!("✅ 申请完成: 参考号 {}", payload.reference_id);
                info!("💰 合计: {} | 支付方式: {}", payload.total_amount, payload.payment_method);
                info!("🧾 收据已保存至: {}", self.config.receipt_file);
                info!("{}", "=".repeat(60));
            }
            None => info!("未提交申请"),
        }
        Ok(payload)
    }
}
