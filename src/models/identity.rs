//! 申请人身份
//!
//! 身份由外部签到步骤（扫码）提供，以显式上下文对象传入配置器

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::AppResult;

/// 申请人身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(alias = "firstname", alias = "first_name")]
    pub first_name: String,
    #[serde(alias = "lastname", alias = "last_name")]
    pub last_name: String,
    #[serde(alias = "id", alias = "requester_id", deserialize_with = "deserialize_requester_id")]
    pub requester_id: String,
}

impl Identity {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        requester_id: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            requester_id: requester_id.into(),
        }
    }

    /// 解析签到二维码中的 JSON
    pub fn from_check_in_json(raw: &str) -> AppResult<Self> {
        let identity: Identity = serde_json::from_str(raw)?;
        Ok(identity)
    }

    /// 全名（收据上显示）
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[申请人 {} ({})]", self.full_name(), self.requester_id)
    }
}

// 二维码里的 id 可能是数字也可能是字符串
fn deserialize_requester_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    let id = match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.trim().to_string(),
        Raw::Number(n) => n.to_string(),
    };
    if id.is_empty() {
        return Err(serde::de::Error::custom("requester id 不能为空"));
    }
    Ok(id)
}

/// 会话身份上下文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityContext {
    Present(Identity),
    #[default]
    Absent,
}

impl IdentityContext {
    /// 从签到数据构造；数据缺失或无法解析时视为未签到
    pub fn from_check_in_json(raw: Option<&str>) -> Self {
        match raw.map(Identity::from_check_in_json) {
            Some(Ok(identity)) => IdentityContext::Present(identity),
            Some(Err(e)) => {
                warn!("⚠️ 签到数据无法解析，按未签到处理: {}", e);
                IdentityContext::Absent
            }
            None => IdentityContext::Absent,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityContext::Present(identity) => Some(identity),
            IdentityContext::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, IdentityContext::Present(_))
    }

    /// 清除身份（退出会话）
    pub fn clear(&mut self) {
        *self = IdentityContext::Absent;
    }
}
