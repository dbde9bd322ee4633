//! # Loader 模块
//!
//! 场景加载协作方的接口，以及一个按帧推进的模拟实现。
//!
//! ## 两阶段加载
//!
//! 1. `begin_load` 开始加载，激活被推迟
//! 2. 进度达到 [`ACTIVATION_THRESHOLD`] 后停住，表示"可以激活"
//! 3. 调用方允许激活后，加载在下一次更新中完成，新场景成为活动场景

use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scheduler::Tickable;
use crate::time::{FrameTime, TimeMode};

/// 推迟激活的加载会停在这个进度
pub const ACTIVATION_THRESHOLD: f32 = 0.9;

/// 切换目标（名称或序号）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SceneTarget {
    /// 按序号
    Index(usize),
    /// 按名称
    Name(String),
}

impl fmt::Display for SceneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneTarget::Index(index) => write!(f, "#{index}"),
            SceneTarget::Name(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for SceneTarget {
    type Err = Infallible;

    /// 纯数字解析为序号，其余解析为名称
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(index) => SceneTarget::Index(index),
            Err(_) => SceneTarget::Name(s.to_string()),
        })
    }
}

impl From<&str> for SceneTarget {
    fn from(name: &str) -> Self {
        SceneTarget::Name(name.to_string())
    }
}

impl From<usize> for SceneTarget {
    fn from(index: usize) -> Self {
        SceneTarget::Index(index)
    }
}

/// 已激活场景的标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneInfo {
    /// 序号
    pub index: usize,
    /// 名称
    pub name: String,
}

/// 加载操作的不透明句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadHandle(u64);

impl LoadHandle {
    /// 创建句柄（供 [`SceneLoader`] 实现使用）
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// 原始值
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 场景加载协作方
pub trait SceneLoader {
    /// 开始一次推迟激活的加载；无法开始时返回 `None`
    fn begin_load(&mut self, target: &SceneTarget) -> Option<LoadHandle>;

    /// 加载进度 [0, 1]
    fn progress(&self, handle: LoadHandle) -> f32;

    /// 允许或禁止激活
    fn set_activation_allowed(&mut self, handle: LoadHandle, allowed: bool);

    /// 当前活动场景
    fn active_scene(&self) -> Option<SceneInfo>;
}

/// 编排器持有的加载器引用
pub type LoaderHandle = Rc<RefCell<dyn SceneLoader>>;

/// 进行中的模拟加载
#[derive(Debug, Clone)]
struct LoadOperation {
    handle: LoadHandle,
    scene: SceneInfo,
    elapsed: f32,
    progress: f32,
    activation_allowed: bool,
    completed: bool,
}

/// 模拟场景加载器
///
/// 进度随时间线性升到 [`ACTIVATION_THRESHOLD`] 并停住；
/// 允许激活且进度已到阈值后，在下一次 `update` 中完成。
/// 新的加载会取代尚未完成的旧加载。
#[derive(Debug)]
pub struct SimulatedSceneLoader {
    scenes: Vec<String>,
    load_seconds: f32,
    time_mode: TimeMode,
    progress_cap: f32,
    failing: bool,
    next_handle: u64,
    operation: Option<LoadOperation>,
    active: Option<SceneInfo>,
}

impl SimulatedSceneLoader {
    /// 创建加载器
    ///
    /// # 参数
    /// - `scenes`: 场景目录，序号即位置
    /// - `load_seconds`: 从开始到进度达到阈值所需的时间
    pub fn new(scenes: Vec<String>, load_seconds: f32) -> Self {
        Self {
            scenes,
            load_seconds: load_seconds.max(0.0),
            time_mode: TimeMode::Unscaled,
            progress_cap: 1.0,
            failing: false,
            next_handle: 1,
            operation: None,
            active: None,
        }
    }

    /// 设置时间轴
    pub fn with_time_mode(mut self, mode: TimeMode) -> Self {
        self.time_mode = mode;
        self
    }

    /// 设置初始活动场景
    pub fn with_active_scene(mut self, index: usize) -> Self {
        self.active = self.lookup(&SceneTarget::Index(index));
        self
    }

    /// 让加载卡在给定进度（模拟永远无法就绪的加载）
    pub fn with_progress_cap(mut self, cap: f32) -> Self {
        self.progress_cap = cap.clamp(0.0, 1.0);
        self
    }

    /// 让之后的 `begin_load` 全部失败
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// 场景目录
    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// 是否有未完成的加载
    pub fn is_loading(&self) -> bool {
        self.operation.as_ref().is_some_and(|op| !op.completed)
    }

    fn lookup(&self, target: &SceneTarget) -> Option<SceneInfo> {
        let index = match target {
            SceneTarget::Index(index) => (*index < self.scenes.len()).then_some(*index)?,
            SceneTarget::Name(name) => self.scenes.iter().position(|s| s == name)?,
        };
        Some(SceneInfo {
            index,
            name: self.scenes[index].clone(),
        })
    }

    fn operation(&self, handle: LoadHandle) -> Option<&LoadOperation> {
        self.operation.as_ref().filter(|op| op.handle == handle)
    }
}

impl SceneLoader for SimulatedSceneLoader {
    fn begin_load(&mut self, target: &SceneTarget) -> Option<LoadHandle> {
        if self.failing {
            warn!(scene = %target, "模拟加载器处于失败状态");
            return None;
        }
        let Some(scene) = self.lookup(target) else {
            warn!(scene = %target, "未知场景");
            return None;
        };

        if self.is_loading() {
            debug!("新的加载取代了未完成的加载");
        }

        let handle = LoadHandle(self.next_handle);
        self.next_handle += 1;
        debug!(handle = handle.value(), scene = %scene.name, "开始加载");
        self.operation = Some(LoadOperation {
            handle,
            scene,
            elapsed: 0.0,
            progress: 0.0,
            activation_allowed: false,
            completed: false,
        });
        Some(handle)
    }

    fn progress(&self, handle: LoadHandle) -> f32 {
        self.operation(handle).map_or(0.0, |op| op.progress)
    }

    fn set_activation_allowed(&mut self, handle: LoadHandle, allowed: bool) {
        if let Some(op) = self.operation.as_mut().filter(|op| op.handle == handle) {
            op.activation_allowed = allowed;
        }
    }

    fn active_scene(&self) -> Option<SceneInfo> {
        self.active.clone()
    }
}

impl Tickable for SimulatedSceneLoader {
    fn update(&mut self, frame: &FrameTime) {
        let Some(op) = self.operation.as_mut().filter(|op| !op.completed) else {
            return;
        };

        if op.activation_allowed && op.progress >= ACTIVATION_THRESHOLD {
            op.progress = 1.0;
            op.completed = true;
            info!(scene = %op.scene.name, index = op.scene.index, "场景已激活");
            self.active = Some(op.scene.clone());
            return;
        }

        op.elapsed += frame.delta_for(self.time_mode);
        let fraction = if self.load_seconds <= 0.0 {
            1.0
        } else {
            (op.elapsed / self.load_seconds).min(1.0)
        };
        op.progress = (fraction * ACTIVATION_THRESHOLD).min(self.progress_cap);
    }
}
