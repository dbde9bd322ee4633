//! # Pop 效果
//!
//! 均匀缩放弹出。曲线值是施加在设计缩放上的绝对倍率，不做限制，
//! 允许越过 1.0 形成回弹。
//!
//! - 正向：0 → 设计缩放，终点精确为设计缩放
//! - 反向：设计缩放 → 0，采样 `curve(1 - t)` 而不是对值取反，终点精确为 0
//!
//! 禁用时取消播放，不恢复缩放。

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::{Curve, CurveSpec};
use crate::scheduler::Tickable;
use crate::time::{FrameTime, TimeMode};
use crate::transform::{SharedTransform, TransformTarget};

use super::{PlayDirection, Playback, TransitionEffect};

/// Pop 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopSettings {
    /// 时长（秒）
    pub duration: f32,
    /// 倍率曲线
    pub curve: CurveSpec,
    /// 时间轴
    pub time_mode: TimeMode,
}

impl Default for PopSettings {
    fn default() -> Self {
        Self {
            duration: 0.35,
            curve: CurveSpec::Overshoot { amount: 0.15 },
            time_mode: TimeMode::Unscaled,
        }
    }
}

/// Pop 效果
#[derive(Debug)]
pub struct PopEffect {
    target: SharedTransform,
    duration: f32,
    curve: Curve,
    time_mode: TimeMode,
    designed_scale: Vec3,
    playback: Playback,
    direction: PlayDirection,
    enabled: bool,
}

impl PopEffect {
    /// 创建效果，并立即捕获设计缩放
    pub fn new(target: SharedTransform, settings: PopSettings) -> Self {
        let designed_scale = target.transform().scale;
        Self {
            target,
            duration: settings.duration.max(0.0),
            curve: settings.curve.build(),
            time_mode: settings.time_mode,
            designed_scale,
            playback: Playback::default(),
            direction: PlayDirection::Forward,
            enabled: true,
        }
    }

    /// 替换倍率曲线
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// 弹出：0 → 设计缩放
    pub fn pop_in(&mut self) {
        self.start(PlayDirection::Forward);
    }

    /// 收回：设计缩放 → 0
    pub fn pop_out(&mut self) {
        self.start(PlayDirection::Reverse);
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// 设计缩放
    pub fn designed_scale(&self) -> Vec3 {
        self.designed_scale
    }

    fn start(&mut self, direction: PlayDirection) {
        self.direction = direction;
        self.playback = Playback::start(self.duration);
        debug!(direction = ?direction, duration = self.duration, "Pop: 开始播放");
    }

    fn terminal(&self) -> Vec3 {
        match self.direction {
            PlayDirection::Forward => self.designed_scale,
            PlayDirection::Reverse => Vec3::ZERO,
        }
    }
}

impl Tickable for PopEffect {
    fn update(&mut self, frame: &FrameTime) {
        if !self.enabled || !self.playback.is_playing() {
            return;
        }

        let normalized = self.playback.advance(frame.delta_for(self.time_mode));
        if self.playback.is_complete() {
            self.target.set_scale(self.terminal());
            self.playback.stop();
            return;
        }

        let sample_at = match self.direction {
            PlayDirection::Forward => normalized,
            PlayDirection::Reverse => 1.0 - normalized,
        };
        let multiplier = self.curve.evaluate(sample_at);
        self.target.set_scale(self.designed_scale * multiplier);
    }

    fn on_enable(&mut self) {
        self.enabled = true;
        self.designed_scale = self.target.transform().scale;
    }

    fn on_disable(&mut self) {
        self.enabled = false;
        self.playback.stop();
    }
}

impl TransitionEffect for PopEffect {
    fn in_duration(&self) -> f32 {
        self.duration
    }

    fn out_duration(&self) -> f32 {
        self.duration
    }

    fn snap_covered(&mut self) {
        self.playback.stop();
        self.target.set_scale(self.designed_scale);
    }

    fn snap_revealed(&mut self) {
        self.playback.stop();
        self.target.set_scale(Vec3::ZERO);
    }

    fn play_in(&mut self) {
        self.pop_in();
    }

    fn play_out(&mut self) {
        self.pop_out();
    }
}
