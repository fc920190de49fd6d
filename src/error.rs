//! # 统一错误处理模块
//!
//! 定义 labkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `ParseError`: 输入行格式错误或缺失
//! - `ConfigurationError`: 当前模式缺少必需参数
//! - `ValidationError`: 参数超出有效范围
//! - `IOError`: 文件读写失败
//! - `FetchError`: 网络请求重试耗尽
//! - `LayerNotFoundError`: 自动检测不到建筑图层
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// labkit 统一错误类型
#[derive(Error, Debug)]
pub enum LabkitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} input: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("{mode} mode requires {missing}")]
    ConfigurationError { mode: String, missing: String },

    #[error("Invalid value for {name}: {reason}")]
    ValidationError { name: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 网络错误
    // ─────────────────────────────────────────────────────────────
    #[error("Request failed after {attempts} attempt(s): {request}\nReason: {reason}")]
    FetchError {
        request: String,
        attempts: u32,
        reason: String,
    },

    #[error("No building layer found among {available} advertised layer(s)")]
    LayerNotFound { available: usize },

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LabkitError {
    /// 错误类别名称，用于退出时的错误提示
    pub fn kind(&self) -> &'static str {
        match self {
            LabkitError::FileReadError { .. }
            | LabkitError::FileWriteError { .. }
            | LabkitError::FileNotFound { .. }
            | LabkitError::CsvError(_) => "IOError",
            LabkitError::ParseError { .. } | LabkitError::JsonError(_) => "ParseError",
            LabkitError::ConfigurationError { .. } => "ConfigurationError",
            LabkitError::ValidationError { .. } => "ValidationError",
            LabkitError::FetchError { .. } => "FetchError",
            LabkitError::LayerNotFound { .. } => "LayerNotFoundError",
        }
    }

    pub(crate) fn validation(name: &str, reason: impl Into<String>) -> Self {
        LabkitError::ValidationError {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, LabkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = LabkitError::ConfigurationError {
            mode: "dpa".to_string(),
            missing: "--M".to_string(),
        };
        assert_eq!(err.kind(), "ConfigurationError");
        assert_eq!(err.to_string(), "dpa mode requires --M");

        let err = LabkitError::validation("--fluence", "must be > 0");
        assert_eq!(err.kind(), "ValidationError");

        let err = LabkitError::LayerNotFound { available: 3 };
        assert_eq!(err.kind(), "LayerNotFoundError");
    }
}
