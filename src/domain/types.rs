// ==========================================
// PCA 采购计划 - 领域类型定义
// ==========================================
// 依据: PCA 汇总规则 - 优先级体系
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 需求优先级 (Priority)
// ==========================================
// 红线: 等级比较依赖枚举顺序,不是字符串比较
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,    // 低 (Baixa)
    Medium, // 中 (Média)
    High,   // 高 (Alta)
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl Priority {
    /// 全部等级（从低到高）
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }

    /// i18n 标签键
    pub fn label_key(&self) -> &'static str {
        match self {
            Priority::Low => "priority.low",
            Priority::Medium => "priority.medium",
            Priority::High => "priority.high",
        }
    }
}

/// 优先级文本无法识别
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl fmt::Display for UnknownPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "无法识别的优先级: '{}'", self.0)
    }
}

impl std::error::Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    /// 解析优先级文本
    ///
    /// 接受英文 (HIGH/MEDIUM/LOW) 与来源系统的葡文标签 (ALTA/MÉDIA/BAIXA)，
    /// 忽略大小写与首尾空白。无法识别时返回错误，不回落默认值。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" | "ALTA" => Ok(Priority::High),
            "MEDIUM" | "MEDIA" | "MÉDIA" => Ok(Priority::Medium),
            "LOW" | "BAIXA" => Ok(Priority::Low),
            _ => Err(UnknownPriority(s.to_string())),
        }
    }
}
