//! 证件类型数据结构
//!
//! 目录服务下发的每一种证件都自带子表单：用途选项、补充问题、办理天数。
//! 办理天数在边界处统一转换为 `u32`，其余模块不再关心原始格式。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::models::money::Money;

/// 证件类型ID（会话内稳定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentTypeId(pub u64);

impl fmt::Display for DocumentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 用途选项
///
/// 后端既可能下发纯字符串，也可能下发 `{name, description}` 对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurposeOption {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PurposeOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

impl<'de> Deserialize<'de> for PurposeOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Full {
                name: String,
                #[serde(default)]
                description: Option<String>,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Name(name) => PurposeOption::new(name),
            Raw::Full { name, description } => PurposeOption { name, description },
        })
    }
}

/// 补充问题的输入类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Date,
    Number,
    /// 未知类型一律按文本处理
    #[default]
    #[serde(other)]
    Text,
}

/// 补充问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementaryQuestion {
    pub id: String,
    #[serde(alias = "question")]
    pub prompt: String,
    #[serde(default, alias = "type", alias = "input_kind")]
    pub input_kind: InputKind,
}

/// 证件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub id: DocumentTypeId,
    pub name: String,
    /// 展示名称，缺省时使用 `name`
    #[serde(default)]
    label: Option<String>,
    #[serde(alias = "price", alias = "fee", alias = "base_fee")]
    pub base_fee: Money,
    #[serde(
        default,
        alias = "days",
        alias = "processing_days",
        deserialize_with = "deserialize_processing_days"
    )]
    pub processing_days: u32,
    #[serde(default, alias = "subOptions", alias = "purpose_options")]
    pub purpose_options: Vec<PurposeOption>,
    #[serde(
        default,
        alias = "subQuestion",
        alias = "questions",
        alias = "supplementary_questions"
    )]
    pub supplementary_questions: Vec<SupplementaryQuestion>,
}

impl DocumentType {
    pub fn new(id: u64, name: impl Into<String>, base_fee: Money) -> Self {
        Self {
            id: DocumentTypeId(id),
            name: name.into(),
            label: None,
            base_fee,
            processing_days: 0,
            purpose_options: Vec::new(),
            supplementary_questions: Vec::new(),
        }
    }

    pub fn with_processing_days(mut self, days: u32) -> Self {
        self.processing_days = days;
        self
    }

    pub fn with_purposes<I, S>(mut self, purposes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.purpose_options = purposes.into_iter().map(PurposeOption::new).collect();
        self
    }

    pub fn with_question(
        mut self,
        id: impl Into<String>,
        prompt: impl Into<String>,
        input_kind: InputKind,
    ) -> Self {
        self.supplementary_questions.push(SupplementaryQuestion {
            id: id.into(),
            prompt: prompt.into(),
            input_kind,
        });
        self
    }

    /// 展示名称
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn has_purposes(&self) -> bool {
        !self.purpose_options.is_empty()
    }

    pub fn has_questions(&self) -> bool {
        !self.supplementary_questions.is_empty()
    }

    pub fn question(&self, id: &str) -> Option<&SupplementaryQuestion> {
        self.supplementary_questions.iter().find(|q| q.id == id)
    }

    /// 名称与 `chosen` 完全相同的用途选项（可能为空，不做模糊匹配）
    pub fn matching_purposes(&self, chosen: &str) -> Vec<PurposeOption> {
        self.purpose_options
            .iter()
            .filter(|opt| opt.name == chosen)
            .cloned()
            .collect()
    }
}

/// 从可能是文本的办理天数中取出开头的连续数字，取不到则为 0
///
/// `"3"` → 3，`"3-5 days"` → 3，`"n/a"` → 0
///
/// 只认 ASCII 数字（全角、阿拉伯-印度数字视为取不到）；超出 u32 的数字封顶为 `u32::MAX`
pub fn leading_days(text: &str) -> u32 {
    static LEADING_DIGITS: OnceLock<Option<Regex>> = OnceLock::new();

    let re = LEADING_DIGITS.get_or_init(|| Regex::new(r"^\s*([0-9]+)").ok());
    re.as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|cap| cap.get(1))
        // 此处只剩纯 ASCII 数字，解析失败只可能是溢出
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .unwrap_or(0)
}

// 办理天数可能是数字、字符串或 null
fn deserialize_processing_days<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;

    struct DaysVisitor;

    impl<'de> Visitor<'de> for DaysVisitor {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or text describing processing days")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(u32::try_from(value).unwrap_or(u32::MAX))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value < 0 {
                Ok(0)
            } else {
                self.visit_u64(value as u64)
            }
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value.is_finite() && value >= 0.0 {
                Ok(value.trunc().min(u32::MAX as f64) as u32)
            } else {
                Ok(0)
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(leading_days(value))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(DaysVisitor)
        }
    }

    deserializer.deserialize_any(DaysVisitor)
}
