use crate::error::{AppError, AppResult, FileError};
use crate::models::catalog::Catalog;
use crate::models::document_type::DocumentType;
use crate::models::order_plan::OrderPlan;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// TOML 目录文件结构
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    document_types: Vec<DocumentType>,
}

/// 解析 TOML 格式的证件目录
pub fn parse_catalog_toml(content: &str) -> Result<Catalog, toml::de::Error> {
    let file: CatalogFile = toml::from_str(content)?;
    Ok(Catalog::new(file.document_types))
}

/// 从 TOML 文件加载证件目录
///
/// 错误区分文件不存在、读取失败和格式错误，均带文件路径
pub async fn load_catalog_from_toml(toml_file_path: &Path) -> AppResult<Catalog> {
    let path = toml_file_path.display().to_string();
    if !toml_file_path.exists() {
        return Err(AppError::File(FileError::NotFound { path }));
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path, e))?;

    let catalog =
        parse_catalog_toml(&content).map_err(|e| AppError::toml_parse_failed(&path, e))?;

    tracing::info!(
        "成功加载 {} 种证件: {}",
        catalog.len(),
        toml_file_path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(catalog)
}

/// 从 TOML 文件加载订单脚本
pub async fn load_order_plan(toml_file_path: &Path) -> Result<OrderPlan> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let plan: OrderPlan = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document_type::{DocumentTypeId, InputKind};
    use crate::models::money::Money;
    use crate::models::payment::PaymentMethod;

    const CATALOG: &str = r#"
[[document_types]]
id = 1
name = "Barangay Clearance"
base_fee = 100
processing_days = "3"

[[document_types]]
id = 2
name = "Birth Certificate"
base_fee = 200.5
processing_days = 1
purpose_options = ["Newborn", "Late Registration"]

[[document_types.supplementary_questions]]
id = "father_bday"
prompt = "Father birthday"
input_kind = "date"
"#;

    #[test]
    fn test_parse_catalog_toml() {
        let catalog = parse_catalog_toml(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = catalog.get(DocumentTypeId(1)).unwrap();
        assert_eq!(first.processing_days, 3);
        assert_eq!(first.base_fee, Money::from_major(100));

        let second = catalog.get(DocumentTypeId(2)).unwrap();
        assert_eq!(second.base_fee, Money::from_minor(20050));
        assert_eq!(second.purpose_options.len(), 2);
        assert_eq!(second.supplementary_questions[0].input_kind, InputKind::Date);
    }

    #[tokio::test]
    async fn test_load_order_plan() {
        let path = std::env::temp_dir().join(format!("order_plan_{}.toml", std::process::id()));
        let content = r#"
check_in = '{"firstname":"Juan","lastname":"Dela Cruz","id":42}'
slot_index = 1
payment_method = "Online"

[[items]]
document_type_id = 2
purpose = "Newborn"
acknowledge = true
copies = 2

[items.answers]
father_bday = "1970-01-31"
"#;
        tokio::fs::write(&path, content).await.unwrap();

        let plan = load_order_plan(&path).await.unwrap();
        assert_eq!(plan.slot_index, 1);
        assert_eq!(plan.payment_method, PaymentMethod::Online);
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].copies, 2);
        assert_eq!(plan.items[0].answers.get("father_bday").map(String::as_str), Some("1970-01-31"));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_catalog_file() {
        let result = load_catalog_from_toml(Path::new("/definitely/not/here.toml")).await;
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_malformed_catalog_reports_parse_error_with_path() {
        let path = std::env::temp_dir().join(format!("bad_catalog_{}.toml", std::process::id()));
        tokio::fs::write(&path, "[[document_types]\nid = ").await.unwrap();

        let err = load_catalog_from_toml(&path).await.unwrap_err();
        match err {
            AppError::File(FileError::TomlParseFailed { path: reported, .. }) => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("意外错误: {:?}", other),
        }

        let _ = tokio::fs::remove_file(&path).await;
    }
}
