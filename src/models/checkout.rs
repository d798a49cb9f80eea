//! 提交快照
//!
//! `CheckoutPayload` 在提交那一刻生成，之后与选择集再无关联

use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::document_type::{DocumentTypeId, PurposeOption};
use crate::models::money::Money;
use crate::models::payment::PaymentMethod;
use crate::models::slot::FulfillmentSlot;

/// 参考号随机后缀位数
pub const REFERENCE_DIGITS: u32 = 8;

/// 参考号：固定前缀 + 定长随机十进制后缀
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    /// 生成新的参考号，只在提交时调用
    pub(crate) fn generate<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> Self {
        let bound = 10u64.pow(REFERENCE_DIGITS);
        let suffix = rng.gen_range(0..bound);
        ReferenceId(format!(
            "{}{:0width$}",
            prefix,
            suffix,
            width = REFERENCE_DIGITS as usize
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 提交快照中的单个证件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadEntry {
    pub document_type_id: DocumentTypeId,
    pub label: String,
    pub unit_fee: Money,
    pub copies: u32,
    pub chosen_purpose: Option<String>,
    /// 名称与 `chosen_purpose` 完全一致的用途选项，可能为空
    pub matched_purpose_option: Vec<PurposeOption>,
    pub answered_questions: BTreeMap<String, String>,
}

impl PayloadEntry {
    pub fn subtotal(&self) -> Money {
        self.unit_fee * self.copies
    }
}

/// 提交快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub entries: Vec<PayloadEntry>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub slot: FulfillmentSlot,
    pub requester_id: String,
    pub requester_name: String,
    pub reference_id: ReferenceId,
    pub created_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reference_has_prefix_and_fixed_width() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let id = ReferenceId::generate("REQ-", &mut rng);
            let suffix = id.as_str().strip_prefix("REQ-").unwrap();
            assert_eq!(suffix.len(), REFERENCE_DIGITS as usize);
            assert!(suffix.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = CheckoutPayload {
            entries: vec![PayloadEntry {
                document_type_id: DocumentTypeId(1),
                label: "A".to_string(),
                unit_fee: Money::from_major(100),
                copies: 2,
                chosen_purpose: None,
                matched_purpose_option: vec![],
                answered_questions: BTreeMap::new(),
            }],
            total_amount: Money::from_major(200),
            payment_method: PaymentMethod::Clerk,
            slot: FulfillmentSlot::new("2024-01-23", "09:00"),
            requester_id: "42".to_string(),
            requester_name: "Juan Dela Cruz".to_string(),
            reference_id: ReferenceId("REQ-00000001".to_string()),
            created_at: Local::now(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["totalAmount"], serde_json::json!(200.0));
        assert_eq!(value["paymentMethod"], "Clerk");
        assert_eq!(value["referenceId"], "REQ-00000001");
        assert_eq!(value["entries"][0]["documentTypeId"], 1);
        assert_eq!(payload.entries[0].subtotal(), Money::from_major(200));
    }
}
