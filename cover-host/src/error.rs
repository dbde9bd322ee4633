//! 宿主层错误类型

use cover_runtime::ConfigError;
use thiserror::Error;

/// 宿主层错误
#[derive(Error, Debug)]
pub enum HostError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 时间线序列化失败
    #[error("时间线序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 转场没有在限定时间内结束
    #[error("转场在 {seconds}s 内没有结束（停在 {phase} 阶段）")]
    Timeout {
        /// 模拟时长上限
        seconds: f32,
        /// 超时时所处阶段
        phase: String,
    },
}

/// Result 类型别名
pub type HostResult<T> = Result<T, HostError>;
