// ==========================================
// PCA 采购计划 - 访问控制数据
// ==========================================
// 职责: 角色 → 能力标志 的静态映射
// 约束:
// - 角色为封闭枚举,映射表为穷尽 match (新增角色必须在编译期补全)
// - 每个角色对每个标志都有取值;未知标志名一律视为 false
// - 仅用于决定展示哪些界面,不参与汇总计算
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 角色 (Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,     // 系统管理员
    Manager,   // 采购主管 (Gestor)
    Requester, // 部门需求人 (Solicitante)
    Auditor,   // 审计/监督 (只读)
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Requester, Role::Auditor];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Requester => "REQUESTER",
            Role::Auditor => "AUDITOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知角色: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrador" => Ok(Role::Admin),
            "manager" | "gestor" => Ok(Role::Manager),
            "requester" | "solicitante" => Ok(Role::Requester),
            "auditor" => Ok(Role::Auditor),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

// ==========================================
// 能力标志 (Permissions)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub manage_users: bool,
    pub create_requests: bool,
    pub approve_requests: bool,
    pub edit_plan: bool,
    pub consolidate_plan: bool,
    pub export_plan: bool,
    pub manage_documents: bool,
    pub view_reports: bool,
}

impl Permissions {
    /// 全部标志名
    pub const FLAGS: [&'static str; 8] = [
        "manage_users",
        "create_requests",
        "approve_requests",
        "edit_plan",
        "consolidate_plan",
        "export_plan",
        "manage_documents",
        "view_reports",
    ];

    /// 按名称查询标志；未知名称返回 false
    pub fn allows(&self, flag: &str) -> bool {
        match flag {
            "manage_users" => self.manage_users,
            "create_requests" => self.create_requests,
            "approve_requests" => self.approve_requests,
            "edit_plan" => self.edit_plan,
            "consolidate_plan" => self.consolidate_plan,
            "export_plan" => self.export_plan,
            "manage_documents" => self.manage_documents,
            "view_reports" => self.view_reports,
            _ => false,
        }
    }

    /// 已授予的标志名
    pub fn granted(&self) -> Vec<&'static str> {
        Self::FLAGS.iter().copied().filter(|f| self.allows(f)).collect()
    }
}

/// 角色权限表
pub fn permissions_for(role: Role) -> Permissions {
    match role {
        Role::Admin => Permissions {
            manage_users: true,
            create_requests: true,
            approve_requests: true,
            edit_plan: true,
            consolidate_plan: true,
            export_plan: true,
            manage_documents: true,
            view_reports: true,
        },
        Role::Manager => Permissions {
            manage_users: false,
            create_requests: true,
            approve_requests: true,
            edit_plan: true,
            consolidate_plan: true,
            export_plan: true,
            manage_documents: true,
            view_reports: true,
        },
        Role::Requester => Permissions {
            create_requests: true,
            view_reports: true,
            ..Permissions::default()
        },
        Role::Auditor => Permissions {
            export_plan: true,
            view_reports: true,
            ..Permissions::default()
        },
    }
}
