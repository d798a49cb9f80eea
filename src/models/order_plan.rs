use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::document_type::DocumentTypeId;
use crate::models::payment::PaymentMethod;

/// 订单脚本：按顺序回放一位申请人的全部操作
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPlan {
    /// 签到二维码原始 JSON（缺失表示未签到）
    #[serde(default)]
    pub check_in: Option<String>,
    pub items: Vec<PlannedItem>,
    /// 选择第几个预约时段（从0开始）
    #[serde(default)]
    pub slot_index: usize,
    pub payment_method: PaymentMethod,
}

/// 订单脚本中的单个证件
#[derive(Debug, Clone, Deserialize)]
pub struct PlannedItem {
    pub document_type_id: DocumentTypeId,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub acknowledge: bool,
    #[serde(default = "default_copies")]
    pub copies: u32,
}

fn default_copies() -> u32 {
    1
}
