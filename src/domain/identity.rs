// ==========================================
// PCA 采购计划 - 目录物品标识
// ==========================================
// 职责: 汇总分组键 (描述 + 计量单位) 及其规范化
// ==========================================
// 规范化规则:
// 1) 去除首尾空白
// 2) 连续空白折叠为单个空格
// 3) 转为小写 (Unicode)
// 重音保留,不做音译
// ==========================================

use serde::Serialize;
use std::hash::{Hash, Hasher};

/// 规范化标识文本
pub fn normalize_identity_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 目录物品标识
///
/// 相等与哈希只比较规范化后的键；`description`/`unit` 保留首次出现的展示文本。
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItemIdentity {
    pub description: String,
    pub unit: String,
    #[serde(skip)]
    key: (String, String),
}

impl CatalogItemIdentity {
    pub fn new(description: &str, unit: &str) -> Self {
        Self {
            description: description.split_whitespace().collect::<Vec<_>>().join(" "),
            unit: unit.split_whitespace().collect::<Vec<_>>().join(" "),
            key: (
                normalize_identity_text(description),
                normalize_identity_text(unit),
            ),
        }
    }

    /// 规范化分组键
    pub fn key(&self) -> &(String, String) {
        &self.key
    }
}

impl PartialEq for CatalogItemIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CatalogItemIdentity {}

impl Hash for CatalogItemIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identity_text() {
        assert_eq!(normalize_identity_text("  Desktop   Computer "), "desktop computer");
        assert_eq!(normalize_identity_text("Papel\tA4\n"), "papel a4");
        assert_eq!(normalize_identity_text("CADEIRA GIRATÓRIA"), "cadeira giratória");
        assert_eq!(normalize_identity_text("   "), "");
    }

    #[test]
    fn test_identity_equality_ignores_case_and_spacing() {
        let a = CatalogItemIdentity::new("Desktop Computer", "UN");
        let b = CatalogItemIdentity::new("  desktop  computer", "un ");
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
        // 展示文本保留原大小写
        assert_eq!(b.description, "desktop computer");
        assert_eq!(a.description, "Desktop Computer");
    }

    #[test]
    fn test_identity_unit_is_part_of_key() {
        let a = CatalogItemIdentity::new("Papel A4", "RESMA");
        let b = CatalogItemIdentity::new("Papel A4", "CX");
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_keeps_accents() {
        let a = CatalogItemIdentity::new("Cadeira giratória", "UN");
        let b = CatalogItemIdentity::new("Cadeira giratoria", "UN");
        assert_ne!(a, b);
    }
}
