//! # Orchestrator 模块
//!
//! 围绕异步场景加载编排遮罩效果的转场状态机。
//!
//! ## 阶段
//!
//! ```text
//! Idle → CoverIn → AwaitingLoad → Activating → SettleDelay → CoverOut → Idle
//! ```
//!
//! 1. **CoverIn**: 效果先对齐到显露态再播放遮挡动画，等待
//!    `max(覆盖值, in_duration)`，再等待可选的加载前延迟，然后开始推迟激活的加载
//! 2. **AwaitingLoad**: 每帧读取加载进度，直到达到激活阈值
//! 3. **Activating**: 允许激活，等一帧让新场景生效，发出 `Activated`
//! 4. **SettleDelay**: 可选的激活后延迟
//! 5. **CoverOut**: （可选）播放显露动画，等待 `max(覆盖值, out_duration)`，发出 `Finished`
//!
//! 转场是一个显式的可恢复任务，由调度器每帧推进一次。
//! 新的转场请求直接丢弃进行中的任务，不回滚效果的视觉状态。
//!
//! 监听器在编排器被借用期间同步执行，不能再借用编排器；
//! 需要在事件里发起下一次转场时使用 [`TransitionRequester`]，
//! 请求会在编排器的下一次 `update` 开头生效。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::effects::{EffectHandle, PassthroughEffect};
use crate::loader::{ACTIVATION_THRESHOLD, LoadHandle, LoaderHandle, SceneInfo, SceneTarget};
use crate::scheduler::Tickable;
use crate::time::{FrameTime, TimeMode, Wait};

/// 转场等待时间配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTiming {
    /// 遮挡阶段的固定等待；与效果自身时长取较大值
    pub cover_in_wait_override: Option<f32>,
    /// 显露阶段的固定等待；与效果自身时长取较大值
    pub cover_out_wait_override: Option<f32>,
    /// 遮挡完成到开始加载之间的延迟
    pub pre_load_delay: f32,
    /// 激活之后到开始显露之间的延迟
    pub post_activation_delay: f32,
}

/// 转场配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// 等待时间
    pub timing: TransitionTiming,
    /// 激活后是否自动播放显露动画
    pub reveal_on_load: bool,
    /// 编排器使用的时间轴
    pub time_mode: TimeMode,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            timing: TransitionTiming::default(),
            reveal_on_load: true,
            time_mode: TimeMode::Unscaled,
        }
    }
}

/// 转场阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    /// 空闲
    #[default]
    Idle,
    /// 遮挡中（包括加载前延迟）
    CoverIn,
    /// 等待加载就绪
    AwaitingLoad,
    /// 等待新场景生效
    Activating,
    /// 激活后延迟
    SettleDelay,
    /// 显露中
    CoverOut,
}

/// 转场通知
///
/// `Finished` 在正常完成和加载无法开始而中止时完全相同。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransitionEvent {
    /// 转场开始
    Started,
    /// 新场景已激活
    Activated(SceneInfo),
    /// 转场结束
    Finished,
}

/// 事件监听器
pub type TransitionListener = Box<dyn FnMut(&TransitionEvent)>;

/// 延迟转场请求
///
/// 可以克隆后交给监听器或其他不持有编排器的代码。多次请求只保留最后一次。
#[derive(Debug, Clone, Default)]
pub struct TransitionRequester {
    pending: Rc<RefCell<Option<SceneTarget>>>,
}

impl TransitionRequester {
    /// 请求在下一帧开始转场
    pub fn request(&self, target: impl Into<SceneTarget>) {
        *self.pending.borrow_mut() = Some(target.into());
    }

    /// 是否有尚未处理的请求
    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    fn take(&self) -> Option<SceneTarget> {
        self.pending.borrow_mut().take()
    }

    fn clear(&self) {
        self.pending.borrow_mut().take();
    }
}

/// 任务当前的挂起点
#[derive(Debug)]
enum Step {
    CoverIn(Wait),
    PreLoad(Wait),
    AwaitingLoad(LoadHandle),
    Activating(LoadHandle),
    SettleDelay(Wait),
    CoverOut(Wait),
}

impl Step {
    fn phase(&self) -> TransitionPhase {
        match self {
            Step::CoverIn(_) | Step::PreLoad(_) => TransitionPhase::CoverIn,
            Step::AwaitingLoad(_) => TransitionPhase::AwaitingLoad,
            Step::Activating(_) => TransitionPhase::Activating,
            Step::SettleDelay(_) => TransitionPhase::SettleDelay,
            Step::CoverOut(_) => TransitionPhase::CoverOut,
        }
    }
}

/// 进行中的转场任务
#[derive(Debug)]
struct Task {
    target: SceneTarget,
    step: Step,
}

/// 转场编排器
///
/// 注册到调度器时应排在加载器之后，保证每帧读到的是加载器更新后的进度。
pub struct TransitionOrchestrator {
    loader: LoaderHandle,
    effect: EffectHandle,
    effect_bound: bool,
    settings: TransitionSettings,
    task: Option<Task>,
    requester: TransitionRequester,
    listeners: Vec<TransitionListener>,
    events: VecDeque<TransitionEvent>,
}

impl std::fmt::Debug for TransitionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionOrchestrator")
            .field("settings", &self.settings)
            .field("effect_bound", &self.effect_bound)
            .field("task", &self.task)
            .field("pending_request", &self.requester.is_pending())
            .field("listeners", &self.listeners.len())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl TransitionOrchestrator {
    /// 创建编排器（尚未绑定效果）
    pub fn new(loader: LoaderHandle, settings: TransitionSettings) -> Self {
        Self {
            loader,
            effect: Rc::new(RefCell::new(PassthroughEffect)),
            effect_bound: false,
            settings,
            task: None,
            requester: TransitionRequester::default(),
            listeners: Vec::new(),
            events: VecDeque::new(),
        }
    }

    /// 创建时绑定效果
    pub fn with_effect(mut self, effect: EffectHandle) -> Self {
        self.bind_effect(Some(effect));
        self
    }

    // ========== 配置 ==========

    /// 绑定效果；`None` 时退化为直通效果
    pub fn bind_effect(&mut self, effect: Option<EffectHandle>) {
        match effect {
            Some(effect) => {
                self.effect = effect;
                self.effect_bound = true;
            }
            None => {
                warn!("未绑定转场效果，转场将不带动画进行");
                self.effect = Rc::new(RefCell::new(PassthroughEffect));
                self.effect_bound = false;
            }
        }
    }

    /// 是否绑定了效果
    pub fn has_effect(&self) -> bool {
        self.effect_bound
    }

    /// 当前配置
    pub fn settings(&self) -> &TransitionSettings {
        &self.settings
    }

    /// 替换配置（对下一次转场生效）
    pub fn set_settings(&mut self, settings: TransitionSettings) {
        self.settings = settings;
    }

    /// 添加事件监听器
    ///
    /// 监听器运行时编排器处于借用中，不能在其中调用编排器的方法；
    /// 发起下一次转场请通过 [`requester`](Self::requester)。
    pub fn add_listener(&mut self, listener: impl FnMut(&TransitionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// 延迟请求句柄，请求在下一次 `update` 开头生效
    pub fn requester(&self) -> TransitionRequester {
        self.requester.clone()
    }

    /// 取出所有未读事件
    pub fn drain_events(&mut self) -> Vec<TransitionEvent> {
        self.events.drain(..).collect()
    }

    // ========== 控制 ==========

    /// 请求转场
    ///
    /// 丢弃进行中的转场任务，把效果对齐到显露态后播放遮挡动画。
    pub fn request_transition(&mut self, target: impl Into<SceneTarget>) {
        let target = target.into();
        if let Some(previous) = self.task.take() {
            info!(
                previous = %previous.target,
                phase = ?previous.step.phase(),
                "取消进行中的转场"
            );
        }
        if !self.effect_bound {
            warn!("未绑定转场效果，使用直通效果");
        }

        {
            let mut effect = self.effect.borrow_mut();
            effect.snap_revealed();
            effect.play_in();
        }

        info!(scene = %target, "转场开始");
        self.emit(TransitionEvent::Started);

        let wait = Wait::new(self.cover_in_wait(), self.settings.time_mode);
        self.task = Some(Task {
            target,
            step: Step::CoverIn(wait),
        });
    }

    /// 丢弃进行中的转场任务和尚未处理的延迟请求，不发出事件
    ///
    /// # 返回
    /// 是否真的取消了任务
    pub fn cancel(&mut self) -> bool {
        self.requester.clear();
        match self.task.take() {
            Some(task) => {
                info!(scene = %task.target, phase = ?task.step.phase(), "转场已取消");
                true
            }
            None => false,
        }
    }

    /// 手动播放显露动画（`reveal_on_load` 关闭时使用）
    pub fn reveal(&mut self) {
        debug!("手动显露");
        self.effect.borrow_mut().play_out();
    }

    // ========== 查询 ==========

    /// 当前阶段
    pub fn phase(&self) -> TransitionPhase {
        self.task
            .as_ref()
            .map_or(TransitionPhase::Idle, |task| task.step.phase())
    }

    /// 是否有进行中的转场
    pub fn is_transitioning(&self) -> bool {
        self.task.is_some()
    }

    /// 进行中转场的目标
    pub fn target(&self) -> Option<&SceneTarget> {
        self.task.as_ref().map(|task| &task.target)
    }

    // ========== 内部 ==========

    fn cover_in_wait(&self) -> f32 {
        let own = self.effect.borrow().in_duration();
        self.settings
            .timing
            .cover_in_wait_override
            .map_or(own, |o| o.max(own))
    }

    fn cover_out_wait(&self) -> f32 {
        let own = self.effect.borrow().out_duration();
        self.settings
            .timing
            .cover_out_wait_override
            .map_or(own, |o| o.max(own))
    }

    fn emit(&mut self, event: TransitionEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.events.push_back(event);
    }

    fn finish(&mut self, target: &SceneTarget) {
        info!(scene = %target, "转场结束");
        self.emit(TransitionEvent::Finished);
    }

    /// 检查挂起点是否可以继续
    ///
    /// `frame` 只在本帧第一次检查时给出；同一帧内新进入的等待不消耗时间。
    fn poll(&self, step: &mut Step, frame: Option<&FrameTime>) -> bool {
        match step {
            Step::CoverIn(wait)
            | Step::PreLoad(wait)
            | Step::SettleDelay(wait)
            | Step::CoverOut(wait) => match frame {
                Some(frame) => wait.advance(frame),
                None => wait.is_done(),
            },
            Step::AwaitingLoad(handle) => {
                self.loader.borrow().progress(*handle) >= ACTIVATION_THRESHOLD
            }
            Step::Activating(_) => frame.is_some(),
        }
    }

    /// 离开当前挂起点，执行阶段动作并进入下一个挂起点
    ///
    /// 返回 `None` 表示转场已结束。
    fn resume(&mut self, task: Task) -> Option<Task> {
        let Task { target, step } = task;
        let mode = self.settings.time_mode;

        let next = match step {
            Step::CoverIn(_) => Step::PreLoad(Wait::new(self.settings.timing.pre_load_delay, mode)),
            Step::PreLoad(_) => {
                let handle = self.loader.borrow_mut().begin_load(&target);
                match handle {
                    Some(handle) => Step::AwaitingLoad(handle),
                    None => {
                        warn!(scene = %target, "加载无法开始，转场中止");
                        self.finish(&target);
                        return None;
                    }
                }
            }
            Step::AwaitingLoad(handle) => {
                self.loader
                    .borrow_mut()
                    .set_activation_allowed(handle, true);
                Step::Activating(handle)
            }
            Step::Activating(handle) => {
                let progress = self.loader.borrow().progress(handle);
                debug!(handle = handle.value(), progress, "加载已激活");
                let scene = self.loader.borrow().active_scene();
                match scene {
                    Some(scene) => {
                        info!(scene = %scene.name, index = scene.index, "场景已切换");
                        self.emit(TransitionEvent::Activated(scene));
                    }
                    None => warn!(scene = %target, "激活后没有活动场景"),
                }
                Step::SettleDelay(Wait::new(self.settings.timing.post_activation_delay, mode))
            }
            Step::SettleDelay(_) => {
                if self.settings.reveal_on_load {
                    self.effect.borrow_mut().play_out();
                }
                Step::CoverOut(Wait::new(self.cover_out_wait(), mode))
            }
            Step::CoverOut(_) => {
                self.finish(&target);
                return None;
            }
        };

        debug!(phase = ?next.phase(), "转场阶段变化");
        Some(Task { target, step: next })
    }
}

impl Tickable for TransitionOrchestrator {
    fn update(&mut self, frame: &FrameTime) {
        // 延迟请求本帧只开始转场，等待从下一帧开始计时
        if let Some(target) = self.requester.take() {
            self.request_transition(target);
            return;
        }

        let Some(mut task) = self.task.take() else {
            return;
        };

        let mut frame = Some(frame);
        loop {
            if !self.poll(&mut task.step, frame.take()) {
                self.task = Some(task);
                return;
            }
            match self.resume(task) {
                Some(next) => task = next,
                None => return,
            }
        }
    }
}
