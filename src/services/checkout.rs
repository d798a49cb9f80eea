//! 订单提交 - 业务能力层
//!
//! 把选择集、预约时段、支付方式冻结成快照并提交。
//! 参考号只在这里生成，每次提交尝试都换新的。

use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::CheckoutService;
use crate::models::{
    Catalog, CheckoutPayload, FulfillmentSlot, Identity, PayloadEntry, PaymentMethod, ReferenceId,
};
use crate::workflow::error::{FlowError, Operation, ValidationError};
use crate::workflow::selection::SelectionSet;

/// 订单提交服务
pub struct CheckoutSubmitter {
    service: Arc<dyn CheckoutService>,
    reference_prefix: String,
}

impl CheckoutSubmitter {
    pub fn new(service: Arc<dyn CheckoutService>, reference_prefix: impl Into<String>) -> Self {
        Self {
            service,
            reference_prefix: reference_prefix.into(),
        }
    }

    /// 生成提交快照
    ///
    /// 任何一个证件不完整都会拒绝生成，绝不提交半成品。
    /// `discarded` 为上次失败提交的参考号，新参考号保证与之不同。
    pub fn prepare(
        &self,
        selection: &SelectionSet,
        catalog: &Catalog,
        slot: &FulfillmentSlot,
        payment_method: PaymentMethod,
        identity: &Identity,
        discarded: Option<&ReferenceId>,
    ) -> Result<CheckoutPayload, FlowError> {
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        let mut entries = Vec::with_capacity(selection.len());
        for entry in selection.iter() {
            let doc = catalog
                .get(entry.document_type_id())
                .ok_or(ValidationError::UnknownDocumentType(entry.document_type_id()))?;
            entry.check_complete(doc)?;

            entries.push(PayloadEntry {
                document_type_id: doc.id,
                label: doc.label().to_string(),
                unit_fee: doc.base_fee,
                copies: entry.copies(),
                chosen_purpose: entry.chosen_purpose().map(String::from),
                matched_purpose_option: entry
                    .chosen_purpose()
                    .map(|chosen| doc.matching_purposes(chosen))
                    .unwrap_or_default(),
                answered_questions: entry.answered_questions().clone(),
            });
        }

        let total_amount = entries.iter().map(PayloadEntry::subtotal).sum();
        let reference_id = self.fresh_reference(discarded);

        Ok(CheckoutPayload {
            entries,
            total_amount,
            payment_method,
            slot: slot.clone(),
            requester_id: identity.requester_id.clone(),
            requester_name: identity.full_name(),
            reference_id,
            created_at: Local::now(),
        })
    }

    fn fresh_reference(&self, discarded: Option<&ReferenceId>) -> ReferenceId {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = ReferenceId::generate(&self.reference_prefix, &mut rng);
            if Some(&candidate) != discarded {
                return candidate;
            }
        }
    }

    /// 提交快照；失败统一视为可重试的网络错误
    pub async fn submit(&self, payload: &CheckoutPayload) -> Result<(), FlowError> {
        info!(
            "[参考号 {}] 📤 正在提交 {} 项证件，合计 {}...",
            payload.reference_id,
            payload.entries.len(),
            payload.total_amount
        );

        match self.service.submit(payload).await {
            Ok(()) => {
                info!("[参考号 {}] ✓ 提交成功", payload.reference_id);
                Ok(())
            }
            Err(e) => {
                warn!("[参考号 {}] ⚠️ 提交失败: {}", payload.reference_id, e);
                Err(FlowError::network(Operation::CheckoutSubmit, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppResult;
    use crate::models::{DocumentType, Money};
    use crate::workflow::selection::SelectionEntry;
    use async_trait::async_trait;

    struct AcceptAll;

    #[async_trait]
    impl CheckoutService for AcceptAll {
        async fn submit(&self, _payload: &CheckoutPayload) -> AppResult<()> {
            Ok(())
        }
    }

    fn submitter() -> CheckoutSubmitter {
        CheckoutSubmitter::new(Arc::new(AcceptAll), "REQ-")
    }

    fn fixture() -> (Catalog, SelectionSet) {
        let a = DocumentType::new(1, "A", Money::from_major(100));
        let b = DocumentType::new(2, "B", Money::from_major(50)).with_purposes(["X", "Y"]);
        let mut set = SelectionSet::new();
        set.commit(SelectionEntry::new(a.id), &a).unwrap();
        let mut entry = SelectionEntry::new(b.id);
        entry.set_purpose("X".to_string());
        set.commit(entry, &b).unwrap();
        set.set_copies(a.id, 3).unwrap();
        (Catalog::new(vec![a, b]), set)
    }

    #[test]
    fn test_prepare_builds_snapshot() {
        let (catalog, set) = fixture();
        let identity = Identity::new("Juan", "Dela Cruz", "42");
        let slot = FulfillmentSlot::new("2024-01-23", "09:00");

        let payload = submitter()
            .prepare(&set, &catalog, &slot, PaymentMethod::Clerk, &identity, None)
            .unwrap();

        assert_eq!(payload.total_amount, Money::from_major(350));
        assert_eq!(payload.entries.len(), 2);
        assert_eq!(payload.entries[0].copies, 3);
        assert!(payload.entries[0].matched_purpose_option.is_empty());
        assert_eq!(payload.entries[1].chosen_purpose.as_deref(), Some("X"));
        assert_eq!(payload.entries[1].matched_purpose_option.len(), 1);
        assert_eq!(payload.requester_id, "42");
        assert_eq!(payload.requester_name, "Juan Dela Cruz");
        assert!(payload.reference_id.as_str().starts_with("REQ-"));
    }

    #[test]
    fn test_unmatched_purpose_is_preserved() {
        let b = DocumentType::new(2, "B", Money::from_major(50)).with_purposes(["X", "Y"]);
        let mut set = SelectionSet::new();
        let mut entry = SelectionEntry::new(b.id);
        entry.set_purpose("Z".to_string());
        set.commit(entry, &b).unwrap();
        let catalog = Catalog::new(vec![b]);

        let payload = submitter()
            .prepare(
                &set,
                &catalog,
                &FulfillmentSlot::new("2024-01-23", ""),
                PaymentMethod::Online,
                &Identity::new("A", "B", "1"),
                None,
            )
            .unwrap();
        assert_eq!(payload.entries[0].chosen_purpose.as_deref(), Some("Z"));
        assert!(payload.entries[0].matched_purpose_option.is_empty());
    }

    #[test]
    fn test_prepare_refuses_empty_selection() {
        let err = submitter()
            .prepare(
                &SelectionSet::new(),
                &Catalog::default(),
                &FulfillmentSlot::new("2024-01-23", ""),
                PaymentMethod::Clerk,
                &Identity::new("A", "B", "1"),
                None,
            )
            .unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::EmptySelection));
    }

    #[test]
    fn test_reference_differs_from_discarded() {
        let (catalog, set) = fixture();
        let identity = Identity::new("Juan", "Dela Cruz", "42");
        let slot = FulfillmentSlot::new("2024-01-23", "09:00");
        let submitter = submitter();

        let first = submitter
            .prepare(&set, &catalog, &slot, PaymentMethod::Clerk, &identity, None)
            .unwrap();
        for _ in 0..20 {
            let retry = submitter
                .prepare(&set, &catalog, &slot, PaymentMethod::Clerk, &identity, Some(&first.reference_id))
                .unwrap();
            assert_ne!(retry.reference_id, first.reference_id);
        }
    }
}
