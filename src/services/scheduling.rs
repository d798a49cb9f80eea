//! 预约时段解析 - 业务能力层
//!
//! 只负责"给这个申请人取可选时段"，不重试，不关心流程

use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::ScheduleService;
use crate::models::{FulfillmentSlot, IdentityContext};
use crate::workflow::error::{FlowError, Operation};

/// 预约时段解析服务
pub struct SchedulingResolver {
    service: Arc<dyn ScheduleService>,
}

impl SchedulingResolver {
    pub fn new(service: Arc<dyn ScheduleService>) -> Self {
        Self { service }
    }

    /// 获取可选时段
    ///
    /// # 返回
    /// - 空列表也是正常结果
    /// - 未签到返回 `NotFound`（调用方应当事先拦截）
    /// - 传输失败返回 `Network`
    pub async fn resolve(&self, identity: &IdentityContext) -> Result<Vec<FulfillmentSlot>, FlowError> {
        let identity = identity.identity().ok_or_else(FlowError::missing_identity)?;

        info!("{} 📅 正在获取预约时段...", identity);

        match self.service.fetch_slots(&identity.requester_id).await {
            Ok(slots) => {
                info!("{} ✓ 获取到 {} 个预约时段", identity, slots.len());
                Ok(slots)
            }
            Err(e) => {
                warn!("{} ⚠️ 获取预约时段失败: {}", identity, e);
                Err(FlowError::network(Operation::ScheduleFetch, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::Identity;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSlots {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ScheduleService for FixedSlots {
        async fn fetch_slots(&self, requester_id: &str) -> AppResult<Vec<FulfillmentSlot>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::api_bad_response("schedules", 500, None));
            }
            Ok(vec![FulfillmentSlot::new("2024-01-23", requester_id)])
        }
    }

    #[tokio::test]
    async fn test_absent_identity_is_not_found_without_call() {
        let service = Arc::new(FixedSlots { calls: AtomicUsize::new(0), fail: false });
        let resolver = SchedulingResolver::new(service.clone());

        let err = resolver.resolve(&IdentityContext::Absent).await.unwrap_err();
        assert_eq!(err, FlowError::missing_identity());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_passes_requester_id() {
        let service = Arc::new(FixedSlots { calls: AtomicUsize::new(0), fail: false });
        let resolver = SchedulingResolver::new(service);
        let ctx = IdentityContext::Present(Identity::new("Juan", "Cruz", "R-1"));

        let slots = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(slots, vec![FulfillmentSlot::new("2024-01-23", "R-1")]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let service = Arc::new(FixedSlots { calls: AtomicUsize::new(0), fail: true });
        let resolver = SchedulingResolver::new(service.clone());
        let ctx = IdentityContext::Present(Identity::new("Juan", "Cruz", "R-1"));

        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(err.is_retryable());
        // 不自动重试
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}
