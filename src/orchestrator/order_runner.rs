//! 订单回放 - 编排层
//!
//! 把一份订单脚本按用户操作的顺序依次交给配置器：
//! 勾选 → 用途 → 答题 → 份数 → 预约时段 → 摘要 → 支付

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::{CheckoutPayload, OrderPlan, PlannedItem};
use crate::utils::logging::log_summary;
use crate::workflow::{Completion, Configurator, ConfiguratorState};

/// 回放订单脚本
///
/// # 返回
/// - `Some(payload)`: 提交成功，返回提交的快照
/// - `None`: 没有可选的预约时段，已退出结算
pub async fn play_order(
    configurator: &mut Configurator,
    plan: &OrderPlan,
) -> Result<Option<CheckoutPayload>> {
    info!("📋 订单共 {} 种证件", plan.items.len());

    for item in &plan.items {
        configure_item(configurator, item)?;
    }
    info!(
        "💰 当前合计 {} | 最长办理 {} 天 | {}",
        configurator.total_amount(),
        configurator.max_processing_days(),
        configurator.lead_time()
    );

    configurator
        .request_schedule()
        .await
        .context("获取预约时段失败")?;

    let no_slots = configurator
        .state()
        .slots()
        .map_or(true, |slots| slots.is_empty());
    if no_slots {
        warn!("⚠️ 没有可选的预约时段，退出结算");
        configurator.cancel_checkout()?;
        return Ok(None);
    }

    configurator
        .choose_slot_at(plan.slot_index)
        .with_context(|| format!("无法选择第 {} 个预约时段", plan.slot_index))?;
    log_summary(&configurator.summary());
    configurator.confirm_summary()?;

    match configurator
        .choose_payment(plan.payment_method)
        .await
        .context("提交申请失败")?
    {
        Completion::Applied => {}
        Completion::Discarded => anyhow::bail!("提交结果已过期"),
    }

    match configurator.state() {
        ConfiguratorState::Done { payload } => Ok(Some(payload.clone())),
        other => anyhow::bail!("提交后状态异常: {}", other.name()),
    }
}

/// 配置单个证件
fn configure_item(configurator: &mut Configurator, item: &PlannedItem) -> Result<()> {
    let id = item.document_type_id;
    configurator
        .toggle_on(id)
        .with_context(|| format!("无法勾选证件 {}", id))?;

    if matches!(configurator.state(), ConfiguratorState::PurposePending(_)) {
        let purpose = item
            .purpose
            .as_deref()
            .with_context(|| format!("证件 {} 需要填写用途", id))?;
        configurator.choose_purpose(purpose)?;
    }

    if matches!(configurator.state(), ConfiguratorState::QuestionPending(_)) {
        for (question_id, answer) in &item.answers {
            configurator
                .answer_question(question_id, answer)
                .with_context(|| format!("证件 {} 的问题 {} 回答无效", id, question_id))?;
        }
        configurator.set_acknowledged(item.acknowledge)?;
        if let Err(e) = configurator.confirm_questions() {
            configurator.cancel_sub_flow()?;
            return Err(e).with_context(|| format!("证件 {} 未能完成填写", id));
        }
    }

    if item.copies != 1 {
        configurator.set_copies(id, item.copies)?;
    }
    info!("[证件 {}] ✓ 已配置 {} 份", id, item.copies);
    Ok(())
}
