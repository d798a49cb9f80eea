//! 配置器状态
//!
//! 每个状态只携带该状态下有意义的数据，迁移规则在 `configurator` 中。

use crate::models::checkout::CheckoutPayload;
use crate::models::document_type::DocumentTypeId;
use crate::models::payment::PaymentMethod;
use crate::models::slot::FulfillmentSlot;
use crate::workflow::selection::SelectionEntry;

/// 配置器状态
///
/// 草稿只存在于 `PurposePending` / `QuestionPending` 中，
/// 因此同一时间最多只有一个证件处于填写中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfiguratorState {
    /// 浏览目录、勾选证件
    Idle,
    /// 等待选择用途
    PurposePending(SelectionEntry),
    /// 等待回答补充问题
    QuestionPending(SelectionEntry),
    /// 等待选择预约时段（列表可能为空）
    SlotPending { slots: Vec<FulfillmentSlot> },
    /// 确认订单摘要
    SummaryReview {
        slots: Vec<FulfillmentSlot>,
        slot: FulfillmentSlot,
    },
    /// 等待选择支付方式；`last_method` 为上次提交失败时所选
    PaymentPending {
        slots: Vec<FulfillmentSlot>,
        slot: FulfillmentSlot,
        last_method: Option<PaymentMethod>,
    },
    /// 提交中
    Committing {
        slots: Vec<FulfillmentSlot>,
        slot: FulfillmentSlot,
        payload: CheckoutPayload,
    },
    /// 提交成功（终态）
    Done { payload: CheckoutPayload },
    /// 会话无法继续（例如目录加载失败）
    Error { reason: String },
}

impl ConfiguratorState {
    pub fn name(&self) -> &'static str {
        match self {
            ConfiguratorState::Idle => "Idle",
            ConfiguratorState::PurposePending(_) => "PurposePending",
            ConfiguratorState::QuestionPending(_) => "QuestionPending",
            ConfiguratorState::SlotPending { .. } => "SlotPending",
            ConfiguratorState::SummaryReview { .. } => "SummaryReview",
            ConfiguratorState::PaymentPending { .. } => "PaymentPending",
            ConfiguratorState::Committing { .. } => "Committing",
            ConfiguratorState::Done { .. } => "Done",
            ConfiguratorState::Error { .. } => "Error",
        }
    }

    /// 正在填写的证件
    pub fn draft(&self) -> Option<&SelectionEntry> {
        match self {
            ConfiguratorState::PurposePending(draft) | ConfiguratorState::QuestionPending(draft) => {
                Some(draft)
            }
            _ => None,
        }
    }

    pub fn draft_document(&self) -> Option<DocumentTypeId> {
        self.draft().map(SelectionEntry::document_type_id)
    }

    /// 已获取的预约时段
    pub fn slots(&self) -> Option<&[FulfillmentSlot]> {
        match self {
            ConfiguratorState::SlotPending { slots }
            | ConfiguratorState::SummaryReview { slots, .. }
            | ConfiguratorState::PaymentPending { slots, .. }
            | ConfiguratorState::Committing { slots, .. } => Some(slots),
            _ => None,
        }
    }

    /// 已选择的预约时段
    pub fn chosen_slot(&self) -> Option<&FulfillmentSlot> {
        match self {
            ConfiguratorState::SummaryReview { slot, .. }
            | ConfiguratorState::PaymentPending { slot, .. }
            | ConfiguratorState::Committing { slot, .. } => Some(slot),
            ConfiguratorState::Done { payload } => Some(&payload.slot),
            _ => None,
        }
    }

    /// 是否处于结算流程中（选时段 → 摘要 → 支付 → 提交）
    pub fn in_checkout(&self) -> bool {
        matches!(
            self,
            ConfiguratorState::SlotPending { .. }
                | ConfiguratorState::SummaryReview { .. }
                | ConfiguratorState::PaymentPending { .. }
                | ConfiguratorState::Committing { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConfiguratorState::Done { .. })
    }
}

impl Default for ConfiguratorState {
    fn default() -> Self {
        ConfiguratorState::Idle
    }
}
