use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 后台权限级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    /// 只读: 查看抽奖记录
    Viewer,
    /// 查看记录 + 管理奖品
    Editor,
}

/// 后台操作所需的能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewDrawLog,
    EditPrizes,
}

impl AccessTier {
    pub fn allows(self, capability: Capability) -> bool {
        match (self, capability) {
            (_, Capability::ViewDrawLog) => true,
            (AccessTier::Editor, Capability::EditPrizes) => true,
            (AccessTier::Viewer, Capability::EditPrizes) => false,
        }
    }
}

impl std::fmt::Display for AccessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessTier::Viewer => write!(f, "viewer"),
            AccessTier::Editor => write!(f, "editor"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AdminLoginRequest {
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminLoginResponse {
    pub access_token: String,
    pub tier: AccessTier,
    /// 有效期 (秒)
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_capabilities() {
        assert!(AccessTier::Viewer.allows(Capability::ViewDrawLog));
        assert!(!AccessTier::Viewer.allows(Capability::EditPrizes));
        assert!(AccessTier::Editor.allows(Capability::ViewDrawLog));
        assert!(AccessTier::Editor.allows(Capability::EditPrizes));
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&AccessTier::Editor).unwrap(),
            "\"editor\""
        );
        assert_eq!(AccessTier::Viewer.to_string(), "viewer");
    }
}
