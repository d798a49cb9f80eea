//! 证件申请配置器 - 流程层
//!
//! 把用户动作翻译成状态迁移。规则：
//! - 被拒绝的动作不改动任何状态
//! - 两个异步动作拆成 `begin_*` / `complete_*`，迟到的结果按票据校验后丢弃
//! - 网络错误保存在 `last_error` 中供界面提示，可以原样重试

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::{CheckoutService, ReceiptDisplay, ScheduleService};
use crate::config::Config;
use crate::models::{
    Catalog, CheckoutPayload, DocumentTypeId, FulfillmentSlot, IdentityContext, Money,
    PaymentMethod, ReferenceId,
};
use crate::services::{
    CheckoutSubmitter, LeadTime, OrderSummary, PricingEngine, SchedulingResolver,
};
use crate::workflow::error::{FlowError, ValidationError};
use crate::workflow::selection::{SelectionEntry, SelectionSet};
use crate::workflow::state::ConfiguratorState;

/// 配置器依赖的外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub schedule: Arc<dyn ScheduleService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub receipt: Arc<dyn ReceiptDisplay>,
}

/// 退出会话后交还给外部的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    /// 回到签到入口
    ReturnToCheckIn,
}

/// 异步结果的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// 结果已生效
    Applied,
    /// 状态已变化，结果被丢弃
    Discarded,
}

/// 获取预约时段的票据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTicket {
    id: u64,
}

/// 提交订单的票据，携带本次提交的快照
#[derive(Debug, Clone)]
pub struct CheckoutTicket {
    id: u64,
    payload: CheckoutPayload,
}

impl CheckoutTicket {
    pub fn payload(&self) -> &CheckoutPayload {
        &self.payload
    }
}

/// 证件申请配置器
pub struct Configurator {
    catalog: Catalog,
    identity: IdentityContext,
    selection: SelectionSet,
    state: ConfiguratorState,
    resolver: SchedulingResolver,
    submitter: CheckoutSubmitter,
    receipt: Arc<dyn ReceiptDisplay>,
    pricing: PricingEngine,
    last_error: Option<FlowError>,
    pending_schedule: Option<u64>,
    pending_checkout: Option<u64>,
    next_ticket: u64,
    /// 上次失败提交用过的参考号，重试时不能再用
    last_reference: Option<ReferenceId>,
}

impl Configurator {
    pub fn new(
        catalog: Catalog,
        identity: IdentityContext,
        collaborators: Collaborators,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            identity,
            selection: SelectionSet::new(),
            state: ConfiguratorState::Idle,
            resolver: SchedulingResolver::new(collaborators.schedule),
            submitter: CheckoutSubmitter::new(collaborators.checkout, config.reference_prefix.clone()),
            receipt: collaborators.receipt,
            pricing: PricingEngine::new(config.cutoff_hour),
            last_error: None,
            pending_schedule: None,
            pending_checkout: None,
            next_ticket: 0,
            last_reference: None,
        }
    }

    /// 目录加载失败时使用：进入 `Error`，之后所有动作都会被拒绝
    pub fn failed(
        reason: impl Into<String>,
        identity: IdentityContext,
        collaborators: Collaborators,
        config: &Config,
    ) -> Self {
        let mut configurator = Self::new(Catalog::default(), identity, collaborators, config);
        configurator.state = ConfiguratorState::Error {
            reason: reason.into(),
        };
        configurator
    }

    // ========== 只读访问 ==========

    pub fn state(&self) -> &ConfiguratorState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn last_error(&self) -> Option<&FlowError> {
        self.last_error.as_ref()
    }

    pub fn is_schedule_in_flight(&self) -> bool {
        self.pending_schedule.is_some()
    }

    pub fn is_checkout_in_flight(&self) -> bool {
        self.pending_checkout.is_some()
    }

    pub fn is_selected(&self, id: DocumentTypeId) -> bool {
        self.selection.contains(id)
    }

    pub fn total_amount(&self) -> Money {
        self.pricing.total_amount(&self.selection, &self.catalog)
    }

    pub fn max_processing_days(&self) -> u32 {
        self.pricing.max_processing_days(&self.selection, &self.catalog)
    }

    /// 按当前本地时间给出可取件提示
    pub fn lead_time(&self) -> LeadTime {
        self.pricing.lead_time_now(self.max_processing_days())
    }

    pub fn summary(&self) -> OrderSummary {
        self.pricing
            .summary(&self.selection, &self.catalog, self.state.chosen_slot())
    }

    /// 当前状态下能否发起获取预约时段
    pub fn can_request_schedule(&self) -> bool {
        matches!(self.state, ConfiguratorState::Idle)
            && self.pending_schedule.is_none()
            && !self.selection.is_empty()
            && self.identity.is_present()
    }

    fn conflict(&self, action: &'static str) -> FlowError {
        debug!("[配置器] 拒绝操作 {}，当前状态 {}", action, self.state.name());
        FlowError::StateConflict {
            action,
            state: self.state.name(),
        }
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    // ========== 勾选证件 ==========

    /// 点击证件卡片：已选或正在填写则取消，否则勾选
    pub fn toggle(&mut self, id: DocumentTypeId) -> Result<(), FlowError> {
        if self.selection.contains(id) || self.state.draft_document() == Some(id) {
            self.toggle_off(id)
        } else {
            self.toggle_on(id)
        }
    }

    /// 勾选证件
    ///
    /// 有用途选项先选用途，有补充问题再答题，否则直接加入选择集
    pub fn toggle_on(&mut self, id: DocumentTypeId) -> Result<(), FlowError> {
        if !matches!(self.state, ConfiguratorState::Idle) {
            return Err(self.conflict("toggle_on"));
        }
        let catalog = self.catalog.clone();
        let doc = catalog
            .get(id)
            .ok_or(ValidationError::UnknownDocumentType(id))?;
        if self.selection.contains(id) {
            return Err(ValidationError::AlreadySelected(id).into());
        }

        let draft = SelectionEntry::new(id);
        if doc.has_purposes() {
            debug!("[证件 {}] 等待选择用途", doc.label());
            self.state = ConfiguratorState::PurposePending(draft);
        } else if doc.has_questions() {
            debug!("[证件 {}] 等待回答补充问题", doc.label());
            self.state = ConfiguratorState::QuestionPending(draft);
        } else {
            self.selection.commit(draft, doc)?;
            info!("[证件 {}] ✓ 已加入", doc.label());
        }
        Ok(())
    }

    /// 取消勾选：无论是否填写完成都移除；正在填写的草稿直接丢弃
    pub fn toggle_off(&mut self, id: DocumentTypeId) -> Result<(), FlowError> {
        if matches!(
            self.state,
            ConfiguratorState::Committing { .. }
                | ConfiguratorState::Done { .. }
                | ConfiguratorState::Error { .. }
        ) {
            return Err(self.conflict("toggle_off"));
        }

        let had_draft = self.state.draft_document() == Some(id);
        let removed = self.selection.remove(id).is_some();
        if !had_draft && !removed {
            return Err(ValidationError::NotSelected(id).into());
        }

        if had_draft {
            self.state = ConfiguratorState::Idle;
        } else if self.state.in_checkout() && self.selection.is_empty() {
            info!("[配置器] 选择集已清空，退出结算");
            self.state = ConfiguratorState::Idle;
        }
        debug!("[证件 {}] 已移除", id);
        Ok(())
    }

    // ========== 填写草稿 ==========

    pub fn choose_purpose(&mut self, purpose: &str) -> Result<(), FlowError> {
        if !matches!(self.state, ConfiguratorState::PurposePending(_)) {
            return Err(self.conflict("choose_purpose"));
        }
        let purpose = purpose.trim();
        if purpose.is_empty() {
            return Err(ValidationError::EmptyPurpose.into());
        }

        let mut draft = match std::mem::take(&mut self.state) {
            ConfiguratorState::PurposePending(draft) => draft,
            other => {
                self.state = other;
                return Err(self.conflict("choose_purpose"));
            }
        };
        draft.set_purpose(purpose.to_string());

        let catalog = self.catalog.clone();
        let id = draft.document_type_id();
        let doc = catalog
            .get(id)
            .ok_or(ValidationError::UnknownDocumentType(id))?;

        if doc.has_questions() {
            self.state = ConfiguratorState::QuestionPending(draft);
        } else {
            self.selection.commit(draft, doc)?;
            info!("[证件 {}] ✓ 已加入，用途: {}", doc.label(), purpose);
        }
        Ok(())
    }

    pub fn answer_question(&mut self, question_id: &str, value: &str) -> Result<(), FlowError> {
        if !matches!(self.state, ConfiguratorState::QuestionPending(_)) {
            return Err(self.conflict("answer_question"));
        }
        let catalog = self.catalog.clone();
        if let ConfiguratorState::QuestionPending(draft) = &mut self.state {
            let id = draft.document_type_id();
            let doc = catalog
                .get(id)
                .ok_or(ValidationError::UnknownDocumentType(id))?;
            draft.record_answer(doc, question_id, value)?;
        }
        Ok(())
    }

    /// 勾选或取消同意条款
    pub fn set_acknowledged(&mut self, acknowledged: bool) -> Result<(), FlowError> {
        if let ConfiguratorState::QuestionPending(draft) = &mut self.state {
            draft.set_acknowledged(acknowledged);
            return Ok(());
        }
        Err(self.conflict("set_acknowledged"))
    }

    /// 确认答案；未同意条款或有问题未答时拒绝
    pub fn confirm_questions(&mut self) -> Result<(), FlowError> {
        let catalog = self.catalog.clone();
        let doc = match &self.state {
            ConfiguratorState::QuestionPending(draft) => {
                let id = draft.document_type_id();
                let doc = catalog
                    .get(id)
                    .ok_or(ValidationError::UnknownDocumentType(id))?;
                draft.check_complete(doc)?;
                doc
            }
            _ => return Err(self.conflict("confirm_questions")),
        };

        if let ConfiguratorState::QuestionPending(draft) = std::mem::take(&mut self.state) {
            self.selection.commit(draft, doc)?;
            info!("[证件 {}] ✓ 已加入（已回答全部问题）", doc.label());
        }
        Ok(())
    }

    /// 从答题返回：有用途选项回到选用途（保留草稿），否则放弃草稿
    pub fn back_from_questions(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, ConfiguratorState::QuestionPending(_)) {
            return Err(self.conflict("back_from_questions"));
        }
        if let ConfiguratorState::QuestionPending(draft) = std::mem::take(&mut self.state) {
            let has_purposes = self
                .catalog
                .get(draft.document_type_id())
                .is_some_and(|doc| doc.has_purposes());
            if has_purposes {
                self.state = ConfiguratorState::PurposePending(draft);
            }
        }
        Ok(())
    }

    /// 关闭弹窗，放弃草稿
    pub fn cancel_sub_flow(&mut self) -> Result<(), FlowError> {
        match self.state {
            ConfiguratorState::PurposePending(_) | ConfiguratorState::QuestionPending(_) => {
                self.state = ConfiguratorState::Idle;
                Ok(())
            }
            _ => Err(self.conflict("cancel_sub_flow")),
        }
    }

    // ========== 份数 ==========

    fn guard_copies(&self, action: &'static str) -> Result<(), FlowError> {
        match self.state {
            ConfiguratorState::Committing { .. }
            | ConfiguratorState::Done { .. }
            | ConfiguratorState::Error { .. } => Err(self.conflict(action)),
            _ => Ok(()),
        }
    }

    pub fn increment_copies(&mut self, id: DocumentTypeId) -> Result<u32, FlowError> {
        self.guard_copies("increment_copies")?;
        Ok(self.selection.increment_copies(id)?)
    }

    /// 已经是 1 份时不做改动
    pub fn decrement_copies(&mut self, id: DocumentTypeId) -> Result<u32, FlowError> {
        self.guard_copies("decrement_copies")?;
        Ok(self.selection.decrement_copies(id)?)
    }

    pub fn set_copies(&mut self, id: DocumentTypeId, copies: u32) -> Result<(), FlowError> {
        self.guard_copies("set_copies")?;
        Ok(self.selection.set_copies(id, copies)?)
    }

    // ========== 预约时段 ==========

    /// 发起获取预约时段；校验都在发请求之前完成
    pub fn begin_schedule(&mut self) -> Result<ScheduleTicket, FlowError> {
        if !matches!(self.state, ConfiguratorState::Idle) || self.pending_schedule.is_some() {
            return Err(self.conflict("request_schedule"));
        }
        if self.selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        if !self.identity.is_present() {
            let err = FlowError::missing_identity();
            warn!("[配置器] ⚠️ {}", err);
            self.last_error = Some(err.clone());
            return Err(err);
        }

        let id = self.issue_ticket();
        self.pending_schedule = Some(id);
        self.last_error = None;
        Ok(ScheduleTicket { id })
    }

    /// 应用获取预约时段的结果
    ///
    /// 票据过期、状态已离开 `Idle` 或选择集已清空时丢弃结果
    pub fn complete_schedule(
        &mut self,
        ticket: ScheduleTicket,
        result: Result<Vec<FulfillmentSlot>, FlowError>,
    ) -> Result<Completion, FlowError> {
        if self.pending_schedule != Some(ticket.id) {
            debug!("[配置器] 丢弃过期的预约时段结果 (票据 {})", ticket.id);
            return Ok(Completion::Discarded);
        }
        self.pending_schedule = None;

        if !matches!(self.state, ConfiguratorState::Idle) || self.selection.is_empty() {
            debug!(
                "[配置器] 状态已变为 {}，丢弃预约时段结果",
                self.state.name()
            );
            return Ok(Completion::Discarded);
        }

        match result {
            Ok(slots) => {
                if slots.is_empty() {
                    warn!("[配置器] ⚠️ 没有可选的预约时段");
                }
                self.state = ConfiguratorState::SlotPending { slots };
                Ok(Completion::Applied)
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// 获取预约时段（begin + 请求 + complete）
    pub async fn request_schedule(&mut self) -> Result<Completion, FlowError> {
        let ticket = self.begin_schedule()?;
        let result = self.resolver.resolve(&self.identity).await;
        self.complete_schedule(ticket, result)
    }

    pub fn choose_slot(&mut self, slot: &FulfillmentSlot) -> Result<(), FlowError> {
        let slots = match &self.state {
            ConfiguratorState::SlotPending { slots } => slots,
            _ => return Err(self.conflict("choose_slot")),
        };
        if slots.is_empty() {
            return Err(ValidationError::NoSlotsAvailable.into());
        }
        if !slots.contains(slot) {
            return Err(ValidationError::UnknownSlot(slot.to_string()).into());
        }

        if let ConfiguratorState::SlotPending { slots } = std::mem::take(&mut self.state) {
            info!("[配置器] 📅 已选择预约时段 {}", slot);
            self.state = ConfiguratorState::SummaryReview {
                slots,
                slot: slot.clone(),
            };
        }
        Ok(())
    }

    /// 按列表位置选择时段
    pub fn choose_slot_at(&mut self, index: usize) -> Result<(), FlowError> {
        let slot = match &self.state {
            ConfiguratorState::SlotPending { slots } if slots.is_empty() => {
                return Err(ValidationError::NoSlotsAvailable.into());
            }
            ConfiguratorState::SlotPending { slots } => slots
                .get(index)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownSlot(format!("#{}", index)))?,
            _ => return Err(self.conflict("choose_slot")),
        };
        self.choose_slot(&slot)
    }

    // ========== 摘要与支付 ==========

    pub fn confirm_summary(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, ConfiguratorState::SummaryReview { .. }) {
            return Err(self.conflict("confirm_summary"));
        }
        if let ConfiguratorState::SummaryReview { slots, slot } = std::mem::take(&mut self.state) {
            self.state = ConfiguratorState::PaymentPending {
                slots,
                slot,
                last_method: None,
            };
        }
        Ok(())
    }

    /// 回到选时段，沿用已获取的时段列表
    pub fn change_date(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, ConfiguratorState::SummaryReview { .. }) {
            return Err(self.conflict("change_date"));
        }
        if let ConfiguratorState::SummaryReview { slots, .. } = std::mem::take(&mut self.state) {
            self.state = ConfiguratorState::SlotPending { slots };
        }
        Ok(())
    }

    pub fn go_back_to_summary(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, ConfiguratorState::PaymentPending { .. }) {
            return Err(self.conflict("go_back_to_summary"));
        }
        if let ConfiguratorState::PaymentPending { slots, slot, .. } =
            std::mem::take(&mut self.state)
        {
            self.state = ConfiguratorState::SummaryReview { slots, slot };
        }
        Ok(())
    }

    /// 退出结算回到浏览，保留选择集
    pub fn cancel_checkout(&mut self) -> Result<(), FlowError> {
        match self.state {
            ConfiguratorState::SlotPending { .. }
            | ConfiguratorState::SummaryReview { .. }
            | ConfiguratorState::PaymentPending { .. } => {
                self.state = ConfiguratorState::Idle;
                Ok(())
            }
            _ => Err(self.conflict("cancel_checkout")),
        }
    }

    /// 选择支付方式并冻结快照，进入 `Committing`
    pub fn begin_checkout(&mut self, method: PaymentMethod) -> Result<CheckoutTicket, FlowError> {
        let slot = match &self.state {
            ConfiguratorState::PaymentPending { slot, .. } if self.pending_checkout.is_none() => {
                slot.clone()
            }
            _ => return Err(self.conflict("choose_payment")),
        };
        let identity = match self.identity.identity() {
            Some(identity) => identity,
            None => {
                let err = FlowError::missing_identity();
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let payload = self.submitter.prepare(
            &self.selection,
            &self.catalog,
            &slot,
            method,
            identity,
            self.last_reference.as_ref(),
        )?;

        let id = self.issue_ticket();
        if let ConfiguratorState::PaymentPending { slots, slot, .. } =
            std::mem::take(&mut self.state)
        {
            self.state = ConfiguratorState::Committing {
                slots,
                slot,
                payload: payload.clone(),
            };
        }
        self.pending_checkout = Some(id);
        self.last_error = None;
        Ok(CheckoutTicket { id, payload })
    }

    /// 应用提交结果
    ///
    /// 成功进入 `Done` 并把提交的快照原样交给收据；失败回到 `PaymentPending`，
    /// 选择集、时段和支付方式都不变，参考号作废
    pub async fn complete_checkout(
        &mut self,
        ticket: CheckoutTicket,
        result: Result<(), FlowError>,
    ) -> Result<Completion, FlowError> {
        let current = match &self.state {
            ConfiguratorState::Committing { payload, .. } => Some(&payload.reference_id),
            _ => None,
        };
        if self.pending_checkout != Some(ticket.id) || current != Some(&ticket.payload.reference_id)
        {
            debug!("[参考号 {}] 丢弃过期的提交结果", ticket.payload.reference_id);
            return Ok(Completion::Discarded);
        }
        self.pending_checkout = None;

        let (slots, slot, payload) = match std::mem::take(&mut self.state) {
            ConfiguratorState::Committing {
                slots,
                slot,
                payload,
            } => (slots, slot, payload),
            other => {
                self.state = other;
                return Ok(Completion::Discarded);
            }
        };

        match result {
            Ok(()) => {
                info!(
                    "[参考号 {}] ✅ 申请完成，合计 {}",
                    payload.reference_id, payload.total_amount
                );
                self.last_reference = None;
                if let Err(e) = self.receipt.show(&payload).await {
                    warn!("[参考号 {}] ⚠️ 收据展示失败: {}", payload.reference_id, e);
                }
                self.state = ConfiguratorState::Done { payload };
                Ok(Completion::Applied)
            }
            Err(e) => {
                self.last_reference = Some(payload.reference_id.clone());
                self.state = ConfiguratorState::PaymentPending {
                    slots,
                    slot,
                    last_method: Some(payload.payment_method),
                };
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// 选择支付方式并提交（begin + 请求 + complete）
    pub async fn choose_payment(&mut self, method: PaymentMethod) -> Result<Completion, FlowError> {
        let ticket = self.begin_checkout(method)?;
        let result = self.submitter.submit(ticket.payload()).await;
        self.complete_checkout(ticket, result).await
    }

    // ========== 会话 ==========

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// 开始新的申请，保留身份
    pub fn reset(&mut self) -> Result<(), FlowError> {
        if !self.state.is_terminal() {
            return Err(self.conflict("reset"));
        }
        self.selection.clear();
        self.state = ConfiguratorState::Idle;
        self.last_error = None;
        self.last_reference = None;
        Ok(())
    }

    /// 退出会话：清除身份和选择，迟到的异步结果都会被丢弃
    pub fn exit(&mut self) -> ExitAction {
        if let Some(identity) = self.identity.identity() {
            info!("{} 👋 退出会话", identity);
        }
        self.identity.clear();
        self.selection.clear();
        if !matches!(self.state, ConfiguratorState::Error { .. }) {
            self.state = ConfiguratorState::Idle;
        }
        self.pending_schedule = None;
        self.pending_checkout = None;
        self.last_error = None;
        self.last_reference = None;
        ExitAction::ReturnToCheckIn
    }
}
