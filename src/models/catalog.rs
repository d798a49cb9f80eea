use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::document_type::{DocumentType, DocumentTypeId};

/// 证件目录
///
/// 会话开始时加载一次，之后只读；克隆只复制引用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DocumentType>", into = "Vec<DocumentType>")]
pub struct Catalog {
    document_types: Arc<[DocumentType]>,
}

impl Catalog {
    pub fn new(document_types: Vec<DocumentType>) -> Self {
        Self {
            document_types: document_types.into(),
        }
    }

    pub fn get(&self, id: DocumentTypeId) -> Option<&DocumentType> {
        self.document_types.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentType> {
        self.document_types.iter()
    }

    pub fn len(&self) -> usize {
        self.document_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_types.is_empty()
    }
}

impl From<Vec<DocumentType>> for Catalog {
    fn from(document_types: Vec<DocumentType>) -> Self {
        Catalog::new(document_types)
    }
}

impl From<Catalog> for Vec<DocumentType> {
    fn from(catalog: Catalog) -> Self {
        catalog.document_types.to_vec()
    }
}
