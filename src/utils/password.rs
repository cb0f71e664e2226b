use bcrypt::{DEFAULT_COST, hash, verify};
use crate::error::{AppError, AppResult};

/// 验证后台口令强度
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 || password.len() > 72 {
        return Err(AppError::ValidationError(
            "Password must be between 8 and 72 characters".to_string(),
        ));
    }

    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_lowercase || !has_uppercase || !has_digit {
        return Err(AppError::ValidationError(
            "Password must contain upper and lower case letters and a digit".to_string(),
        ));
    }

    Ok(())
}

/// 对口令进行哈希
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

/// 验证口令; 哈希为空 (该级别未配置) 时一律不通过
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    if hash.is_empty() {
        return Ok(false);
    }
    verify(password, hash)
        .map_err(|e| AppError::ConfigError(format!("Invalid password hash: {e}")))
}
