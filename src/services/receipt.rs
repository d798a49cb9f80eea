//! 收据 - 业务能力层
//!
//! 只负责把提交快照渲染成收据并写入文件，不关心流程

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::fmt;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::clients::ReceiptDisplay;
use crate::error::{AppError, AppResult};
use crate::models::{CheckoutPayload, FulfillmentSlot, Money, PaymentMethod, ReferenceId};

/// 没有用途的证件在收据上显示的名称
pub const DEFAULT_SERVICE_NAME: &str = "Certified Service";

/// 收据中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub label: String,
    pub service: String,
    pub unit_fee: Money,
    pub copies: u32,
    pub subtotal: Money,
}

/// 收据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub requester_name: String,
    pub reference_id: ReferenceId,
    pub slot: FulfillmentSlot,
    pub issued_at: DateTime<Local>,
    pub lines: Vec<ReceiptLine>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
}

impl Receipt {
    /// 只读取快照，不重新计价
    pub fn from_payload(payload: &CheckoutPayload) -> Self {
        let lines = payload
            .entries
            .iter()
            .map(|entry| ReceiptLine {
                label: entry.label.clone(),
                service: entry
                    .chosen_purpose
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
                unit_fee: entry.unit_fee,
                copies: entry.copies,
                subtotal: entry.subtotal(),
            })
            .collect();

        Self {
            requester_name: payload.requester_name.clone(),
            reference_id: payload.reference_id.clone(),
            slot: payload.slot.clone(),
            issued_at: payload.created_at,
            lines,
            total_amount: payload.total_amount,
            payment_method: payload.payment_method,
        }
    }

    /// 按支付方式给出的提示语
    pub fn payment_message(&self) -> &'static str {
        match self.payment_method {
            PaymentMethod::Online => "Transaction Verified. Keep this for your records.",
            PaymentMethod::Clerk => "Present this reference to the clerk for final processing.",
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==============================")?;
        writeln!(f, "Reference: {}", self.reference_id)?;
        writeln!(f, "Requester: {}", self.requester_name)?;
        writeln!(f, "Schedule:  {}", self.slot)?;
        writeln!(f, "Issued:    {}", self.issued_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "------------------------------")?;
        for line in &self.lines {
            writeln!(
                f,
                "{} ({}) {} x {} = {}",
                line.label, line.service, line.unit_fee, line.copies, line.subtotal
            )?;
        }
        writeln!(f, "------------------------------")?;
        writeln!(f, "Total:     {}", self.total_amount)?;
        writeln!(f, "Payment:   {}", self.payment_method)?;
        writeln!(f, "{}", self.payment_message())?;
        writeln!(f, "==============================")
    }
}

/// 收据写入服务
///
/// 职责：
/// - 将收据追加写入文件
/// - 只处理单张收据
pub struct ReceiptWriter {
    receipt_file_path: String,
}

impl ReceiptWriter {
    /// 写入指定文件（路径来自 `Config::receipt_file`）
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            receipt_file_path: path.into(),
        }
    }

    /// 追加写入一张收据
    pub async fn write(&self, receipt: &Receipt) -> AppResult<()> {
        debug!(
            "写入收据: 参考号 {} | {} 项 | 文件 {}",
            receipt.reference_id,
            receipt.lines.len(),
            self.receipt_file_path
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.receipt_file_path)
            .await
            .map_err(|e| AppError::file_write_failed(&self.receipt_file_path, e))?;

        file.write_all(receipt.to_string().as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(&self.receipt_file_path, e))?;
        file.flush()
            .await
            .map_err(|e| AppError::file_write_failed(&self.receipt_file_path, e))?;

        Ok(())
    }
}

#[async_trait]
impl ReceiptDisplay for ReceiptWriter {
    async fn show(&self, payload: &CheckoutPayload) -> AppResult<()> {
        let receipt = Receipt::from_payload(payload);
        self.write(&receipt).await?;
        info!(
            "[参考号 {}] 🧾 收据已写入 {}",
            receipt.reference_id, self.receipt_file_path
        );
        Ok(())
    }
}
