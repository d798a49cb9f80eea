use serde::{Deserialize, Serialize};
use std::fmt;

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// 线上支付（跳转支付网关，不在本系统内）
    Online,
    /// 窗口现场缴费
    Clerk,
}

impl PaymentMethod {
    pub fn name(self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online",
            PaymentMethod::Clerk => "Clerk",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
