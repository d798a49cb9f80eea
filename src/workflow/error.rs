//! 流程错误
//!
//! 校验错误和状态冲突只在状态机内部处理（拒绝操作，不改状态）；
//! 网络错误会作为可关闭的提示暴露给调用方，可以重试。

use std::fmt;
use thiserror::Error;

use crate::models::document_type::{DocumentTypeId, InputKind};

/// 异步操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CatalogLoad,
    ScheduleFetch,
    CheckoutSubmit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CatalogLoad => "加载证件目录",
            Operation::ScheduleFetch => "获取预约时段",
            Operation::CheckoutSubmit => "提交申请",
        };
        f.write_str(name)
    }
}

/// 状态机拒绝的操作
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// 必填项缺失或格式不对
    #[error("校验失败: {0}")]
    Validation(#[from] ValidationError),
    /// 缺少申请人身份
    #[error("未找到{what}，请先完成签到")]
    NotFound { what: &'static str },
    /// 网络请求失败（可重试）
    #[error("{operation}失败，请重试: {message}")]
    Network { operation: Operation, message: String },
    /// 当前状态不允许该操作
    #[error("当前状态 {state} 不允许操作 {action}")]
    StateConflict {
        action: &'static str,
        state: &'static str,
    },
}

impl FlowError {
    pub fn network(operation: Operation, err: impl fmt::Display) -> Self {
        FlowError::Network {
            operation,
            message: err.to_string(),
        }
    }

    pub fn missing_identity() -> Self {
        FlowError::NotFound { what: "申请人身份" }
    }

    /// 是否可以原样重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, FlowError::Network { .. })
    }
}

/// 校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("证件 {0} 不在目录中")]
    UnknownDocumentType(DocumentTypeId),
    #[error("证件 {0} 尚未选择")]
    NotSelected(DocumentTypeId),
    #[error("证件 {0} 已经选择")]
    AlreadySelected(DocumentTypeId),
    #[error("证件 {0} 需要选择用途")]
    MissingPurpose(DocumentTypeId),
    #[error("用途不能为空")]
    EmptyPurpose,
    #[error("证件 {document_type_id} 还有未回答的问题: {question_ids:?}")]
    UnansweredQuestions {
        document_type_id: DocumentTypeId,
        question_ids: Vec<String>,
    },
    #[error("证件 {0} 需要先勾选同意条款")]
    TermsNotAcknowledged(DocumentTypeId),
    #[error("未知问题: {0}")]
    UnknownQuestion(String),
    #[error("问题 {question_id} 的答案 '{value}' 不是合法的 {kind:?}")]
    InvalidAnswer {
        question_id: String,
        kind: InputKind,
        value: String,
    },
    #[error("份数至少为 1")]
    ZeroCopies,
    #[error("份数不能超过 {0}")]
    TooManyCopies(u32),
    #[error("尚未选择任何证件")]
    EmptySelection,
    #[error("没有可选的预约时段")]
    NoSlotsAvailable,
    #[error("预约时段 {0} 不在可选列表中")]
    UnknownSlot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(FlowError::network(Operation::ScheduleFetch, "timeout").is_retryable());
        assert!(!FlowError::missing_identity().is_retryable());
        assert!(!FlowError::from(ValidationError::EmptySelection).is_retryable());
    }

    #[test]
    fn test_network_message_mentions_operation() {
        let err = FlowError::network(Operation::CheckoutSubmit, "502 Bad Gateway");
        let text = err.to_string();
        assert!(text.contains("提交申请"));
        assert!(text.contains("502"));
    }
}
