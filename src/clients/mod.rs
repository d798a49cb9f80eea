//! 外部服务
//!
//! 每个外部协作方都是一个窄接口，配一个基于 reqwest 的 HTTP 实现

pub mod catalog_client;
pub mod checkout_client;
pub mod http;
pub mod schedule_client;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Catalog, CheckoutPayload, FulfillmentSlot};

pub use catalog_client::{CatalogClient, TomlCatalog};
pub use checkout_client::CheckoutClient;
pub use http::ApiClient;
pub use schedule_client::ScheduleClient;

/// 证件目录服务
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_catalog(&self) -> AppResult<Catalog>;
}

/// 预约时段服务；空列表是正常结果
#[async_trait]
pub trait ScheduleService: Send + Sync {
    async fn fetch_slots(&self, requester_id: &str) -> AppResult<Vec<FulfillmentSlot>>;
}

/// 订单持久化服务
#[async_trait]
pub trait CheckoutService: Send + Sync {
    async fn submit(&self, payload: &CheckoutPayload) -> AppResult<()>;
}

/// 收据展示
#[async_trait]
pub trait ReceiptDisplay: Send + Sync {
    async fn show(&self, payload: &CheckoutPayload) -> AppResult<()>;
}
