// ==========================================
// 模切机生产记录系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// ==========================================

use crate::engine::validator::EntryViolation;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 所有错误均为可恢复错误：调用方展示信息后继续运行
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    /// 录入/设置校验失败（携带全部违规）
    #[error("数据验证失败: {message}")]
    ValidationError {
        message: String,
        violations: Vec<EntryViolation>,
    },

    /// 导入文件或设置无法解析（已有数据不受影响）
    #[error("解析失败: {0}")]
    ParseError(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 存储错误（内存状态已回滚）
    // ==========================================
    #[error("保存失败: {0}")]
    PersistenceError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 由录入违规列表构造校验错误（消息取第一条违规）
    pub fn from_violations(violations: Vec<EntryViolation>) -> Self {
        let message = violations
            .iter()
            .map(EntryViolation::message)
            .next()
            .unwrap_or_default();
        ApiError::ValidationError {
            message,
            violations,
        }
    }

    /// 违规列表（非校验错误返回空切片）
    pub fn violations(&self) -> &[EntryViolation] {
        match self {
            ApiError::ValidationError { violations, .. } => violations,
            _ => &[],
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::PersistenceError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::QuotaExceeded {
            key: "productionRecords".to_string(),
            required: 120,
            quota: 100,
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::PersistenceError(msg) => {
                assert!(msg.contains("productionRecords"));
                assert!(msg.contains("120"));
            }
            _ => panic!("Expected PersistenceError"),
        }
    }

    #[test]
    fn test_validation_error_keeps_all_violations() {
        let err = ApiError::from_violations(vec![
            EntryViolation::MissingProductName,
            EntryViolation::MissingCuts,
        ]);
        assert_eq!(err.violations().len(), 2);
        assert!(ApiError::NotFound("x".to_string()).violations().is_empty());
    }
}
