use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AccessTier, AdminLoginRequest, AdminLoginResponse, Capability};
use crate::utils::{JwtService, verify_password};

/// 后台两级口令校验
#[derive(Clone)]
pub struct AdminService {
    admin: AdminConfig,
    jwt_service: JwtService,
}

impl AdminService {
    pub fn new(admin: AdminConfig, jwt_service: JwtService) -> Self {
        if admin.viewer_password_hash.is_empty() && admin.editor_password_hash.is_empty() {
            log::warn!("No admin password hashes configured, admin login is disabled");
        }
        Self { admin, jwt_service }
    }

    /// 后台登录, 成功返回带权限级别的访问令牌
    pub fn login(&self, request: AdminLoginRequest) -> AppResult<AdminLoginResponse> {
        let tier = self
            .authenticate(&request.password)?
            .ok_or_else(|| AppError::AuthError("Invalid password".to_string()))?;

        let access_token = self.jwt_service.generate_admin_token(tier)?;
        log::info!("Admin login with {tier} access");

        Ok(AdminLoginResponse {
            access_token,
            tier,
            expires_in: self.jwt_service.get_expires_in(),
        })
    }

    /// 编辑级口令优先匹配
    pub fn authenticate(&self, password: &str) -> AppResult<Option<AccessTier>> {
        if password.is_empty() {
            return Ok(None);
        }
        if verify_password(password, &self.admin.editor_password_hash)? {
            return Ok(Some(AccessTier::Editor));
        }
        if verify_password(password, &self.admin.viewer_password_hash)? {
            return Ok(Some(AccessTier::Viewer));
        }
        Ok(None)
    }

    /// 检查请求携带的权限级别是否具备所需能力
    pub fn require(tier: Option<AccessTier>, capability: Capability) -> AppResult<AccessTier> {
        match tier {
            None => Err(AppError::AuthError("Missing access token".to_string())),
            Some(t) if t.allows(capability) => Ok(t),
            Some(_) => Err(AppError::PermissionDenied),
        }
    }
}
