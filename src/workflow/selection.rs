//! 选择集
//!
//! 只保存已经填写完整的证件；填写中的草稿由状态机持有。

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::document_type::{DocumentType, DocumentTypeId, InputKind};
use crate::workflow::error::ValidationError;

/// 单个证件最多可申请的份数
pub const MAX_COPIES: u32 = 999;

/// 单个证件的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEntry {
    document_type_id: DocumentTypeId,
    copies: u32,
    chosen_purpose: Option<String>,
    answered_questions: BTreeMap<String, String>,
    acknowledged_terms: bool,
}

impl SelectionEntry {
    /// 新建草稿，默认 1 份
    pub fn new(document_type_id: DocumentTypeId) -> Self {
        Self {
            document_type_id,
            copies: 1,
            chosen_purpose: None,
            answered_questions: BTreeMap::new(),
            acknowledged_terms: false,
        }
    }

    pub fn document_type_id(&self) -> DocumentTypeId {
        self.document_type_id
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    pub fn chosen_purpose(&self) -> Option<&str> {
        self.chosen_purpose.as_deref()
    }

    pub fn answered_questions(&self) -> &BTreeMap<String, String> {
        &self.answered_questions
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answered_questions.get(question_id).map(String::as_str)
    }

    pub fn acknowledged_terms(&self) -> bool {
        self.acknowledged_terms
    }

    pub(crate) fn set_purpose(&mut self, purpose: String) {
        self.chosen_purpose = Some(purpose);
    }

    pub(crate) fn set_acknowledged(&mut self, acknowledged: bool) {
        self.acknowledged_terms = acknowledged;
    }

    /// 记录答案；空白答案视为清除
    pub(crate) fn record_answer(
        &mut self,
        doc: &DocumentType,
        question_id: &str,
        value: &str,
    ) -> Result<(), ValidationError> {
        let question = doc
            .question(question_id)
            .ok_or_else(|| ValidationError::UnknownQuestion(question_id.to_string()))?;

        let value = value.trim();
        if value.is_empty() {
            self.answered_questions.remove(question_id);
            return Ok(());
        }

        if !answer_matches_kind(question.input_kind, value) {
            return Err(ValidationError::InvalidAnswer {
                question_id: question_id.to_string(),
                kind: question.input_kind,
                value: value.to_string(),
            });
        }

        self.answered_questions
            .insert(question_id.to_string(), value.to_string());
        Ok(())
    }

    /// 尚未回答的问题
    pub fn unanswered_questions(&self, doc: &DocumentType) -> Vec<String> {
        doc.supplementary_questions
            .iter()
            .filter(|q| !self.answered_questions.contains_key(&q.id))
            .map(|q| q.id.clone())
            .collect()
    }

    /// 检查是否填写完整，返回第一个缺失项
    pub fn check_complete(&self, doc: &DocumentType) -> Result<(), ValidationError> {
        if doc.has_purposes() && self.chosen_purpose.is_none() {
            return Err(ValidationError::MissingPurpose(doc.id));
        }
        if doc.has_questions() {
            let missing = self.unanswered_questions(doc);
            if !missing.is_empty() {
                return Err(ValidationError::UnansweredQuestions {
                    document_type_id: doc.id,
                    question_ids: missing,
                });
            }
            if !self.acknowledged_terms {
                return Err(ValidationError::TermsNotAcknowledged(doc.id));
            }
        }
        Ok(())
    }

    pub fn is_complete(&self, doc: &DocumentType) -> bool {
        self.check_complete(doc).is_ok()
    }
}

fn answer_matches_kind(kind: InputKind, value: &str) -> bool {
    match kind {
        InputKind::Text => true,
        InputKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        InputKind::Number => value.parse::<f64>().map(f64::is_finite).unwrap_or(false),
    }
}

/// 已完成配置的证件集合（按加入顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: Vec<SelectionEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: DocumentTypeId) -> bool {
        self.entries.iter().any(|e| e.document_type_id == id)
    }

    pub fn get(&self, id: DocumentTypeId) -> Option<&SelectionEntry> {
        self.entries.iter().find(|e| e.document_type_id == id)
    }

    fn get_mut(&mut self, id: DocumentTypeId) -> Option<&mut SelectionEntry> {
        self.entries.iter_mut().find(|e| e.document_type_id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 加入一个填写完整的证件；不完整或重复的会被拒绝
    pub(crate) fn commit(
        &mut self,
        entry: SelectionEntry,
        doc: &DocumentType,
    ) -> Result<(), ValidationError> {
        entry.check_complete(doc)?;
        if self.contains(entry.document_type_id) {
            return Err(ValidationError::AlreadySelected(entry.document_type_id));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: DocumentTypeId) -> Option<SelectionEntry> {
        let index = self.entries.iter().position(|e| e.document_type_id == id)?;
        Some(self.entries.remove(index))
    }

    /// 增加份数；已到 `MAX_COPIES` 时不做任何改动
    pub(crate) fn increment_copies(&mut self, id: DocumentTypeId) -> Result<u32, ValidationError> {
        let entry = self.get_mut(id).ok_or(ValidationError::NotSelected(id))?;
        if entry.copies < MAX_COPIES {
            entry.copies += 1;
        }
        Ok(entry.copies)
    }

    /// 减少份数；已经是 1 份时不做任何改动
    pub(crate) fn decrement_copies(&mut self, id: DocumentTypeId) -> Result<u32, ValidationError> {
        let entry = self.get_mut(id).ok_or(ValidationError::NotSelected(id))?;
        if entry.copies > 1 {
            entry.copies -= 1;
        }
        Ok(entry.copies)
    }

    pub(crate) fn set_copies(&mut self, id: DocumentTypeId, copies: u32) -> Result<(), ValidationError> {
        if copies == 0 {
            return Err(ValidationError::ZeroCopies);
        }
        if copies > MAX_COPIES {
            return Err(ValidationError::TooManyCopies(MAX_COPIES));
        }
        let entry = self.get_mut(id).ok_or(ValidationError::NotSelected(id))?;
        entry.copies = copies;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
