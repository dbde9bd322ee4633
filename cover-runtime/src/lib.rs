//! # Cover Runtime
//!
//! 曲线驱动的转场遮罩效果，以及围绕异步场景加载的转场编排。
//!
//! ## 架构概述
//!
//! `cover-runtime` 是纯逻辑核心，不做任何 IO。所有逻辑只在调度器的每帧回调中推进：
//!
//! ```text
//! Host                         Runtime
//!   │                             │
//!   │── request_transition ─────►│ TransitionOrchestrator
//!   │                             │
//!   │── Scheduler::tick(dt) ────►│ update:  SceneLoader → 效果 → 编排器
//!   │                             │ late:    持续效果（Pulse / Wiggle）
//!   │                             │
//!   │◄── TransitionEvent ────────│ Started / Activated / Finished
//! ```
//!
//! ## 核心类型
//!
//! - [`Curve`]：Hermite 关键帧曲线
//! - [`Scheduler`] / [`Tickable`]：按帧推进的协作式调度
//! - [`TransitionEffect`]：遮罩效果的六成员能力接口
//! - [`CoverEffect`]：五种效果的标签联合
//! - [`SceneLoader`]：场景加载协作方
//! - [`TransitionOrchestrator`]：转场状态机
//!
//! ## 使用示例
//!
//! ```ignore
//! let target = SharedTransform::new(Transform::identity());
//! let effect = Rc::new(RefCell::new(EffectConfig::default().build(target)));
//! let loader = Rc::new(RefCell::new(SimulatedSceneLoader::new(scenes, 0.5)));
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.register(loader.clone());
//! scheduler.register(effect.clone());
//! let orchestrator = Rc::new(RefCell::new(
//!     TransitionOrchestrator::new(loader, TransitionSettings::default()).with_effect(effect),
//! ));
//! scheduler.register(orchestrator.clone());
//!
//! orchestrator.borrow_mut().request_transition("stage");
//! loop {
//!     scheduler.tick(1.0 / 60.0);
//!     for event in orchestrator.borrow_mut().drain_events() {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`curve`] / [`easing`]：曲线与命名缓动
//! - [`time`] / [`scheduler`]：帧时间、等待与调度
//! - [`transform`]：宿主元素的变换
//! - [`effects`]：五种遮罩效果
//! - [`noise`]：二维值噪声
//! - [`loader`]：场景加载协作方
//! - [`orchestrator`]：转场编排
//! - [`config`] / [`error`]：配置与错误

pub mod config;
pub mod curve;
pub mod easing;
pub mod effects;
pub mod error;
pub mod loader;
pub mod noise;
pub mod orchestrator;
pub mod scheduler;
pub mod time;
pub mod transform;

// 重导出核心类型
pub use config::EffectConfig;
pub use curve::{Curve, CurveSpec, Keyframe};
pub use easing::EasingFunction;
pub use effects::{
    CoverEffect, EffectHandle, PassthroughEffect, PopEffect, PopSettings, PulseEffect,
    PulseSettings, SlideDirection, SlideEffect, SlideSettings, SpinAxis, SpinEffect,
    SpinSettings, TransitionEffect, WiggleEffect, WiggleSettings,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ACTIVATION_THRESHOLD, LoadHandle, LoaderHandle, SceneInfo, SceneLoader, SceneTarget,
    SimulatedSceneLoader,
};
pub use noise::ValueNoise2D;
pub use orchestrator::{
    TransitionEvent, TransitionOrchestrator, TransitionPhase, TransitionRequester,
    TransitionSettings, TransitionTiming,
};
pub use scheduler::{Scheduler, TickId, Tickable};
pub use time::{Clock, FrameTime, TimeMode, Wait};
pub use transform::{SharedTransform, Transform, TransformTarget};
