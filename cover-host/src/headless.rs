//! # Headless 模块
//!
//! 不依赖窗口的逐帧驱动：按配置组装调度器、模拟加载器、遮罩效果与编排器，
//! 以固定帧长推进，直到转场结束或达到模拟时长上限。

use std::cell::RefCell;
use std::rc::Rc;

use cover_runtime::{
    CoverEffect, EffectHandle, LoaderHandle, SceneInfo, SceneLoader, SceneTarget, Scheduler,
    SharedTransform, SimulatedSceneLoader, SpinAxis, TickId, Transform, TransformTarget,
    TransitionEvent, TransitionOrchestrator, TransitionPhase,
};
use glam::Vec3;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{HostError, HostResult};
use crate::timeline::Timeline;

/// 单次运行的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 事件时间线
    pub timeline: Timeline,
    /// 实际推进的帧数
    pub frames: u64,
    /// 结束时的活动场景
    pub active_scene: Option<SceneInfo>,
    /// 结束时遮罩元素的变换
    pub element: Transform,
}

/// 无头运行器
pub struct HeadlessRunner {
    config: AppConfig,
    scheduler: Scheduler,
    element: SharedTransform,
    loader: Rc<RefCell<SimulatedSceneLoader>>,
    effect: Option<(Rc<RefCell<CoverEffect>>, TickId)>,
    orchestrator: Rc<RefCell<TransitionOrchestrator>>,
}

impl std::fmt::Debug for HeadlessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessRunner")
            .field("scheduler", &self.scheduler)
            .field("effect", &self.effect.as_ref().map(|(e, _)| e.borrow().kind()))
            .field("phase", &self.orchestrator.borrow().phase())
            .finish()
    }
}

impl HeadlessRunner {
    /// 按配置组装运行器
    ///
    /// 注册顺序：加载器 → 效果 → 编排器。
    pub fn new(config: AppConfig) -> HostResult<Self> {
        config.validate()?;

        let sim = &config.simulation;
        let mut scheduler = Scheduler::new();
        scheduler.set_time_scale(sim.time_scale);

        let loader = Rc::new(RefCell::new(
            SimulatedSceneLoader::new(sim.scenes.clone(), sim.load_seconds)
                .with_active_scene(sim.initial_scene),
        ));
        scheduler.register(loader.clone());

        let element = SharedTransform::new(Transform {
            position: config.element.position,
            rotation: SpinAxis::Z.rotation(config.element.rotation_degrees),
            scale: Vec3::splat(config.element.scale),
        });

        let effect = config.effect.as_ref().map(|effect_config| {
            let effect = Rc::new(RefCell::new(effect_config.build(element.clone())));
            let id = scheduler.register(effect.clone());
            info!(kind = effect_config.kind(), id = %id, "遮罩效果已注册");
            (effect, id)
        });

        let loader_handle: LoaderHandle = loader.clone();
        let mut orchestrator =
            TransitionOrchestrator::new(loader_handle, config.transition.clone().sanitized());
        let handle: Option<EffectHandle> = effect
            .as_ref()
            .map(|(effect, _)| effect.clone() as EffectHandle);
        orchestrator.bind_effect(handle);
        orchestrator.add_listener(|event| debug!(event = ?event, "转场事件"));

        let orchestrator = Rc::new(RefCell::new(orchestrator));
        scheduler.register(orchestrator.clone());

        Ok(Self {
            config,
            scheduler,
            element,
            loader,
            effect,
            orchestrator,
        })
    }

    /// 遮罩元素
    pub fn element(&self) -> &SharedTransform {
        &self.element
    }

    /// 当前转场阶段
    pub fn phase(&self) -> TransitionPhase {
        self.orchestrator.borrow().phase()
    }

    /// 启用或禁用遮罩效果
    pub fn set_effect_enabled(&mut self, enabled: bool) -> bool {
        match &self.effect {
            Some((_, id)) => self.scheduler.set_enabled(*id, enabled),
            None => false,
        }
    }

    /// 请求转场并推进到结束
    ///
    /// `target` 为空时使用配置中的默认目标。
    pub fn run(&mut self, target: Option<SceneTarget>) -> HostResult<RunReport> {
        let target = target.unwrap_or_else(|| self.config.simulation.target.clone());
        let dt = self.config.frame_seconds();
        let max_seconds = self.config.simulation.max_seconds;
        let max_frames = (max_seconds / dt).ceil() as u64;

        info!(scene = %target, dt, max_frames, "开始无头运行");

        let mut timeline = Timeline::new();
        let start = self.scheduler.now();
        {
            let mut orchestrator = self.orchestrator.borrow_mut();
            orchestrator.request_transition(target);
            timeline.record(&start, orchestrator.drain_events());
        }

        let mut frames = 0;
        while frames < max_frames {
            let frame = self.scheduler.tick(dt);
            frames += 1;
            timeline.record(&frame, self.orchestrator.borrow_mut().drain_events());
            if !self.orchestrator.borrow().is_transitioning() {
                break;
            }
        }

        if self.orchestrator.borrow().is_transitioning() {
            let phase = format!("{:?}", self.phase());
            self.orchestrator.borrow_mut().cancel();
            return Err(HostError::Timeout {
                seconds: max_seconds,
                phase,
            });
        }

        let finished = timeline
            .entries()
            .iter()
            .filter(|entry| entry.event == TransitionEvent::Finished)
            .count();
        info!(frames, events = timeline.len(), finished, "无头运行结束");

        Ok(RunReport {
            timeline,
            frames,
            active_scene: self.loader.borrow().active_scene(),
            element: self.element.transform(),
        })
    }
}
