//! 计价服务 - 业务能力层
//!
//! 总价和办理天数都是选择集的纯函数，每次读取都重新计算，不做缓存。

use chrono::{Local, Timelike};
use serde::Serialize;
use std::fmt;

use crate::models::{Catalog, DocumentType, FulfillmentSlot, Money};
use crate::workflow::selection::{SelectionEntry, SelectionSet};

/// 默认截止小时：15 点之前 24 小时可取，之后 48 小时
pub const DEFAULT_CUTOFF_HOUR: u32 = 15;

/// 可取件时间提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeadTime {
    /// 截止时间前下单
    After24Hours,
    /// 截止时间后下单
    After48Hours,
    /// 明确的办理天数
    Days(u32),
}

impl fmt::Display for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadTime::After24Hours => f.write_str("available after 24 hours"),
            LeadTime::After48Hours => f.write_str("available after 48 hours"),
            LeadTime::Days(1) => f.write_str("available after 1 day"),
            LeadTime::Days(n) => write!(f, "available after {} days", n),
        }
    }
}

/// 订单摘要中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub label: String,
    pub purpose: Option<String>,
    pub unit_fee: Money,
    pub copies: u32,
    pub subtotal: Money,
}

/// 订单摘要（确认页展示用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub total_amount: Money,
    pub max_processing_days: u32,
    pub slot: Option<FulfillmentSlot>,
}

/// 计价服务
///
/// 职责：
/// - 只统计填写完整的证件
/// - 不持有选择集，不缓存结果
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine {
    cutoff_hour: u32,
}

impl PricingEngine {
    pub fn new(cutoff_hour: u32) -> Self {
        Self { cutoff_hour }
    }

    /// 选择集中填写完整的证件及其目录定义
    fn complete_entries<'a>(
        selection: &'a SelectionSet,
        catalog: &'a Catalog,
    ) -> impl Iterator<Item = (&'a SelectionEntry, &'a DocumentType)> {
        selection.iter().filter_map(move |entry| {
            catalog
                .get(entry.document_type_id())
                .filter(|doc| entry.is_complete(doc))
                .map(|doc| (entry, doc))
        })
    }

    /// 总价 = Σ 份数 × 单价
    pub fn total_amount(&self, selection: &SelectionSet, catalog: &Catalog) -> Money {
        Self::complete_entries(selection, catalog)
            .map(|(entry, doc)| doc.base_fee * entry.copies())
            .sum()
    }

    /// 最长办理天数；空选择集为 0
    pub fn max_processing_days(&self, selection: &SelectionSet, catalog: &Catalog) -> u32 {
        Self::complete_entries(selection, catalog)
            .map(|(_, doc)| doc.processing_days)
            .max()
            .unwrap_or(0)
    }

    /// 把办理天数换成提示；0 天时只取决于当前小时是否早于截止时间
    pub fn lead_time(&self, days: u32, hour: u32) -> LeadTime {
        match days {
            0 if hour < self.cutoff_hour => LeadTime::After24Hours,
            0 => LeadTime::After48Hours,
            n => LeadTime::Days(n),
        }
    }

    /// 按本地当前时间给出提示
    pub fn lead_time_now(&self, days: u32) -> LeadTime {
        self.lead_time(days, Local::now().hour())
    }

    /// 生成订单摘要
    pub fn summary(
        &self,
        selection: &SelectionSet,
        catalog: &Catalog,
        slot: Option<&FulfillmentSlot>,
    ) -> OrderSummary {
        let lines: Vec<SummaryLine> = Self::complete_entries(selection, catalog)
            .map(|(entry, doc)| SummaryLine {
                label: doc.label().to_string(),
                purpose: entry.chosen_purpose().map(String::from),
                unit_fee: doc.base_fee,
                copies: entry.copies(),
                subtotal: doc.base_fee * entry.copies(),
            })
            .collect();

        OrderSummary {
            total_amount: lines.iter().map(|l| l.subtotal).sum(),
            max_processing_days: self.max_processing_days(selection, catalog),
            lines,
            slot: slot.cloned(),
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CUTOFF_HOUR)
    }
}
