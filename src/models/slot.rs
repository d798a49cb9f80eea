use serde::{Deserialize, Serialize};
use std::fmt;

/// 预约办理时段
///
/// 由预约服务按申请人下发，不可修改
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FulfillmentSlot {
    pub date: String,
    #[serde(default)]
    pub time: String,
}

impl FulfillmentSlot {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

impl fmt::Display for FulfillmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.time.is_empty() {
            write!(f, "{}", self.date)
        } else {
            write!(f, "{} {}", self.date, self.time)
        }
    }
}
