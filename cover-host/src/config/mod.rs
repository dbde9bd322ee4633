//! # Config 模块
//!
//! 无头宿主的配置管理。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (cover.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use cover_runtime::{ConfigError, ConfigResult, EffectConfig, SceneTarget, TransitionSettings};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "cover.json";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 转场编排配置
    #[serde(default)]
    pub transition: TransitionSettings,

    /// 遮罩效果；缺省时转场不带动画
    #[serde(default = "default_effect")]
    pub effect: Option<EffectConfig>,

    /// 遮罩元素的设计变换
    #[serde(default)]
    pub element: ElementConfig,

    /// 模拟配置
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// 遮罩元素配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// 设计位置
    #[serde(default)]
    pub position: Vec2,

    /// 设计缩放（均匀）
    #[serde(default = "default_element_scale")]
    pub scale: f32,

    /// 设计旋转（绕 Z 轴，度）
    #[serde(default)]
    pub rotation_degrees: f32,
}

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 帧率
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// 全局时间缩放
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,

    /// 模拟加载从开始到就绪的时长（秒）
    #[serde(default = "default_load_seconds")]
    pub load_seconds: f32,

    /// 场景目录
    #[serde(default = "default_scenes")]
    pub scenes: Vec<String>,

    /// 初始活动场景序号
    #[serde(default)]
    pub initial_scene: usize,

    /// 默认切换目标
    #[serde(default = "default_target")]
    pub target: SceneTarget,

    /// 模拟时长上限（秒）
    #[serde(default = "default_max_seconds")]
    pub max_seconds: f32,
}

// 默认值函数
fn default_effect() -> Option<EffectConfig> {
    Some(EffectConfig::default())
}

fn default_element_scale() -> f32 {
    1.0
}

fn default_fps() -> u32 {
    60
}

fn default_time_scale() -> f32 {
    1.0
}

fn default_load_seconds() -> f32 {
    0.5
}

fn default_scenes() -> Vec<String> {
    vec!["title".to_string(), "stage".to_string()]
}

fn default_target() -> SceneTarget {
    SceneTarget::Name("stage".to_string())
}

fn default_max_seconds() -> f32 {
    30.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transition: TransitionSettings::default(),
            effect: default_effect(),
            element: ElementConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: default_element_scale(),
            rotation_degrees: 0.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            time_scale: default_time_scale(),
            load_seconds: default_load_seconds(),
            scenes: default_scenes(),
            initial_scene: 0,
            target: default_target(),
            max_seconds: default_max_seconds(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!(path = ?path, "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 严格加载配置文件，任何错误都返回给调用方
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> ConfigResult<()> {
        self.transition.validate()?;
        if let Some(effect) = &self.effect {
            effect.validate()?;
        }

        let sim = &self.simulation;
        if sim.fps == 0 {
            return Err(ConfigError::invalid("simulation.fps", "必须大于 0"));
        }
        if !sim.time_scale.is_finite() || sim.time_scale < 0.0 {
            return Err(ConfigError::invalid(
                "simulation.time_scale",
                "必须是非负的有限数值",
            ));
        }
        if !sim.load_seconds.is_finite() || sim.load_seconds < 0.0 {
            return Err(ConfigError::invalid(
                "simulation.load_seconds",
                "必须是非负的有限数值",
            ));
        }
        if !sim.max_seconds.is_finite() || sim.max_seconds <= 0.0 {
            return Err(ConfigError::invalid("simulation.max_seconds", "必须大于 0"));
        }
        if sim.scenes.is_empty() {
            return Err(ConfigError::invalid("simulation.scenes", "场景目录不能为空"));
        }
        if sim.initial_scene >= sim.scenes.len() {
            return Err(ConfigError::invalid(
                "simulation.initial_scene",
                format!("超出场景目录范围（共 {} 个）", sim.scenes.len()),
            ));
        }

        if !self.element.scale.is_finite()
            || !self.element.position.is_finite()
            || !self.element.rotation_degrees.is_finite()
        {
            return Err(ConfigError::invalid("element", "变换必须是有限数值"));
        }

        Ok(())
    }

    /// 单帧时长（秒）
    pub fn frame_seconds(&self) -> f32 {
        1.0 / self.simulation.fps.max(1) as f32
    }
}
