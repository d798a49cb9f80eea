/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::OrderSummary;

/// 初始化日志输出
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("document_request={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 证件申请");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    match &config.catalog_file {
        Some(path) => info!("📁 证件目录: {}", path),
        None => info!("🌐 证件目录: {}", config.catalog_api_base_url),
    }
    info!("📋 订单脚本: {}", config.order_file);
    info!("{}", "=".repeat(60));
}

/// 打印订单摘要
pub fn log_summary(summary: &OrderSummary) {
    info!("\n{}", "─".repeat(60));
    info!("🧾 订单摘要");
    for line in &summary.lines {
        info!(
            "  {} ({}) {} x {} = {}",
            truncate_text(&line.label, 30),
            line.purpose.as_deref().unwrap_or("-"),
            line.unit_fee,
            line.copies,
            line.subtotal
        );
    }
    if let Some(slot) = &summary.slot {
        info!("📅 预约时段: {}", slot);
    }
    info!("💰 合计: {}", summary.total_amount);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_text("出生证明", 2), "出生...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
