/// 预约时段客户端
use crate::clients::{ApiClient, ScheduleService};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::FulfillmentSlot;
use async_trait::async_trait;
use tracing::debug;

pub struct ScheduleClient {
    api: ApiClient,
}

impl ScheduleClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api: ApiClient::new(&config.schedule_api_base_url, &config.api_token),
        }
    }
}

#[async_trait]
impl ScheduleService for ScheduleClient {
    async fn fetch_slots(&self, requester_id: &str) -> AppResult<Vec<FulfillmentSlot>> {
        let slots: Option<Vec<FulfillmentSlot>> = self
            .api
            .get_json("schedules", &[("requester_id", requester_id)])
            .await?;
        let slots = slots.unwrap_or_default();
        debug!("申请人 {} 可选时段: {}", requester_id, slots.len());
        Ok(slots)
    }
}
