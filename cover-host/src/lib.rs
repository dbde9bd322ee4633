//! # Cover Host
//!
//! 转场编排的无头宿主实现。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 配置加载与校验
//! - 组装调度器、模拟加载器、遮罩效果与编排器
//! - 以固定帧长逐帧驱动
//! - 将转场事件整理为时间线输出
//!
//! Host 层不包含效果与编排逻辑，这些都在 `cover-runtime` 中。

pub mod config;
pub mod error;
pub mod headless;
pub mod timeline;

pub use config::{AppConfig, DEFAULT_CONFIG_PATH, ElementConfig, SimulationConfig};
pub use error::{HostError, HostResult};
pub use headless::{HeadlessRunner, RunReport};
pub use timeline::{Timeline, TimelineEntry};
