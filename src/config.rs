use crate::error::{AppError, AppResult};
use crate::services::DEFAULT_CUTOFF_HOUR;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    // --- 后端服务配置 ---
    /// 证件目录服务地址
    pub catalog_api_base_url: String,
    /// 预约时段服务地址
    pub schedule_api_base_url: String,
    /// 订单提交服务地址
    pub checkout_api_base_url: String,
    /// 访问令牌（为空则不发送 Authorization 头）
    pub api_token: String,
    /// 本地目录文件，设置后不再请求目录服务
    pub catalog_file: Option<String>,
    // --- 会话配置 ---
    /// 订单脚本（TOML）
    pub order_file: String,
    /// 收据输出文件
    pub receipt_file: String,
    /// 参考号前缀
    pub reference_prefix: String,
    /// 当日截止小时（24小时制），之前下单 24 小时可取，之后 48 小时
    pub cutoff_hour: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_api_base_url: "http://localhost:8000/api/v1".to_string(),
            schedule_api_base_url: "http://localhost:8000/api/v1".to_string(),
            checkout_api_base_url: "http://localhost:8000/api/v1".to_string(),
            api_token: String::new(),
            catalog_file: None,
            order_file: "order.toml".to_string(),
            receipt_file: "receipts.txt".to_string(),
            reference_prefix: "REQ-".to_string(),
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            catalog_api_base_url: std::env::var("CATALOG_API_BASE_URL").unwrap_or(default.catalog_api_base_url),
            schedule_api_base_url: std::env::var("SCHEDULE_API_BASE_URL").unwrap_or(default.schedule_api_base_url),
            checkout_api_base_url: std::env::var("CHECKOUT_API_BASE_URL").unwrap_or(default.checkout_api_base_url),
            api_token: std::env::var("API_TOKEN").unwrap_or(default.api_token),
            catalog_file: std::env::var("CATALOG_FILE").ok().or(default.catalog_file),
            order_file: std::env::var("ORDER_FILE").unwrap_or(default.order_file),
            receipt_file: std::env::var("RECEIPT_FILE").unwrap_or(default.receipt_file),
            reference_prefix: std::env::var("REFERENCE_PREFIX").unwrap_or(default.reference_prefix),
            cutoff_hour: std::env::var("CUTOFF_HOUR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.cutoff_hour),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.cutoff_hour > 23 {
            return Err(AppError::invalid_config(
                "cutoff_hour",
                format!("{} 不在 0-23 范围内", self.cutoff_hour),
            ));
        }
        if self.reference_prefix.trim().is_empty() {
            return Err(AppError::invalid_config("reference_prefix", "前缀不能为空"));
        }
        Ok(())
    }
}
