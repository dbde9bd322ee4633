//! # Effects 模块
//!
//! 转场遮罩效果。
//!
//! ## 核心设计理念
//!
//! 每个效果独占一个宿主元素的变换快照，自己推进自己的播放状态：
//! - 在启用时记录"设计值"（缩放 / 位置 / 旋转），动画都相对它进行
//! - 每帧采样一次曲线（或连续函数），写回宿主元素
//! - 播放完成时把属性对齐到精确的终点值，而不是停在曲线的舍入误差上
//!
//! 编排器只通过 [`TransitionEffect`] 的六个成员使用效果，从不向下转型。
//!
//! ## 支持的效果
//!
//! | 效果 | 属性 | 遮挡态 | 显露态 |
//! |---|---|---|---|
//! | Spin | 绕单轴旋转 | 设计旋转 | 偏转 `reveal_degrees` |
//! | Pop | 均匀缩放 | 设计缩放 | 零缩放 |
//! | Slide | 二维位置 | 设计位置 | 设计位置 + 方向偏移 |
//! | Pulse | 均匀缩放（持续） | 基准缩放 | 基准缩放 |
//! | Wiggle | 位置 / 旋转（持续） | 基准值 | 基准值 |

mod playback;
mod pop;
mod pulse;
mod slide;
mod spin;
mod wiggle;

use std::cell::RefCell;
use std::rc::Rc;

use crate::scheduler::Tickable;
use crate::time::FrameTime;

pub use playback::{PlayDirection, Playback};
pub use pop::{PopEffect, PopSettings};
pub use pulse::{PulseEffect, PulseSettings};
pub use slide::{SlideDirection, SlideEffect, SlideSettings};
pub use spin::{SpinAxis, SpinEffect, SpinSettings};
pub use wiggle::{WiggleEffect, WiggleSettings};

/// 转场效果能力
///
/// 所有调用在任何时刻都是安全的，包括同一调用正在进行中时：
/// 新的播放会取消并替换该实例上正在进行的播放，同一实例上不会并行两个播放。
pub trait TransitionEffect: Tickable {
    /// `play_in` 需要等待的时长（秒）
    fn in_duration(&self) -> f32;

    /// `play_out` 需要等待的时长（秒）
    fn out_duration(&self) -> f32;

    /// 立即进入遮挡态（无动画，幂等）
    fn snap_covered(&mut self);

    /// 立即进入显露态（无动画，幂等）
    fn snap_revealed(&mut self);

    /// 开始（或重新开始）向遮挡态的动画
    fn play_in(&mut self);

    /// 开始（或重新开始）向显露态的动画
    fn play_out(&mut self);
}

/// 解析实例种子：未配置时随机生成，使同时运行的多个实例彼此错开
fn instance_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// 编排器持有的效果引用
pub type EffectHandle = Rc<RefCell<dyn TransitionEffect>>;

/// 直通效果
///
/// 没有绑定效果时使用：时长为零，所有操作为空。
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEffect;

impl Tickable for PassthroughEffect {}

impl TransitionEffect for PassthroughEffect {
    fn in_duration(&self) -> f32 {
        0.0
    }

    fn out_duration(&self) -> f32 {
        0.0
    }

    fn snap_covered(&mut self) {}

    fn snap_revealed(&mut self) {}

    fn play_in(&mut self) {}

    fn play_out(&mut self) {}
}

/// 五种效果的标签联合
///
/// 由配置构造；同一个 `Rc<RefCell<CoverEffect>>` 既可以注册到调度器，
/// 也可以绑定到编排器。
#[derive(Debug)]
pub enum CoverEffect {
    /// 旋转
    Spin(SpinEffect),
    /// 缩放弹出
    Pop(PopEffect),
    /// 滑动
    Slide(SlideEffect),
    /// 脉冲
    Pulse(PulseEffect),
    /// 抖动
    Wiggle(WiggleEffect),
}

impl CoverEffect {
    /// 效果名称（用于日志）
    pub fn kind(&self) -> &'static str {
        match self {
            CoverEffect::Spin(_) => "spin",
            CoverEffect::Pop(_) => "pop",
            CoverEffect::Slide(_) => "slide",
            CoverEffect::Pulse(_) => "pulse",
            CoverEffect::Wiggle(_) => "wiggle",
        }
    }

    fn inner(&self) -> &dyn TransitionEffect {
        match self {
            CoverEffect::Spin(e) => e,
            CoverEffect::Pop(e) => e,
            CoverEffect::Slide(e) => e,
            CoverEffect::Pulse(e) => e,
            CoverEffect::Wiggle(e) => e,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TransitionEffect {
        match self {
            CoverEffect::Spin(e) => e,
            CoverEffect::Pop(e) => e,
            CoverEffect::Slide(e) => e,
            CoverEffect::Pulse(e) => e,
            CoverEffect::Wiggle(e) => e,
        }
    }
}

impl Tickable for CoverEffect {
    fn update(&mut self, frame: &FrameTime) {
        self.inner_mut().update(frame);
    }

    fn late_update(&mut self, frame: &FrameTime) {
        self.inner_mut().late_update(frame);
    }

    fn on_enable(&mut self) {
        self.inner_mut().on_enable();
    }

    fn on_disable(&mut self) {
        self.inner_mut().on_disable();
    }
}

impl TransitionEffect for CoverEffect {
    fn in_duration(&self) -> f32 {
        self.inner().in_duration()
    }

    fn out_duration(&self) -> f32 {
        self.inner().out_duration()
    }

    fn snap_covered(&mut self) {
        self.inner_mut().snap_covered();
    }

    fn snap_revealed(&mut self) {
        self.inner_mut().snap_revealed();
    }

    fn play_in(&mut self) {
        self.inner_mut().play_in();
    }

    fn play_out(&mut self) {
        self.inner_mut().play_out();
    }
}

impl From<SpinEffect> for CoverEffect {
    fn from(effect: SpinEffect) -> Self {
        Self::Spin(effect)
    }
}

impl From<PopEffect> for CoverEffect {
    fn from(effect: PopEffect) -> Self {
        Self::Pop(effect)
    }
}

impl From<SlideEffect> for CoverEffect {
    fn from(effect: SlideEffect) -> Self {
        Self::Slide(effect)
    }
}

impl From<PulseEffect> for CoverEffect {
    fn from(effect: PulseEffect) -> Self {
        Self::Pulse(effect)
    }
}

impl From<WiggleEffect> for CoverEffect {
    fn from(effect: WiggleEffect) -> Self {
        Self::Wiggle(effect)
    }
}
