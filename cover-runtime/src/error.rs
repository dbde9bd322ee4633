//! # Error 模块
//!
//! 定义 cover-runtime 中使用的错误类型。
//!
//! 转场逻辑本身从不返回致命错误：未绑定效果会降级为直通，
//! 加载启动失败只会提前结束本次转场。这里的错误只出现在配置阶段。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 字段取值无效
    #[error("配置项 '{field}' 无效: {reason}")]
    Invalid {
        /// 字段路径（如 `effect.duration`）
        field: String,
        /// 原因
        reason: String,
    },
}

impl ConfigError {
    /// 构造字段无效错误
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
