//! # Slide 效果
//!
//! 二维位置滑动。曲线值是不做限制的插值系数，
//! 在屏幕外的点（设计位置 + 方向偏移）和设计位置之间做不限制的线性插值。
//!
//! - 滑入（正向）：屏幕外 → 设计位置
//! - 滑出（反向）：设计位置 → 屏幕外
//!
//! 禁用时取消播放，不恢复位置。

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::{Curve, CurveSpec};
use crate::scheduler::Tickable;
use crate::time::{FrameTime, TimeMode};
use crate::transform::{SharedTransform, TransformTarget};

use super::{PlayDirection, Playback, TransitionEffect};

/// 滑动方向（元素从哪一侧进出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideDirection {
    /// 左侧
    #[default]
    Left,
    /// 右侧
    Right,
    /// 上方
    Up,
    /// 下方
    Down,
}

impl SlideDirection {
    /// 该方向上长度为 `distance` 的偏移（y 轴向上为正）
    pub fn offset(&self, distance: f32) -> Vec2 {
        match self {
            SlideDirection::Left => Vec2::new(-distance, 0.0),
            SlideDirection::Right => Vec2::new(distance, 0.0),
            SlideDirection::Up => Vec2::new(0.0, distance),
            SlideDirection::Down => Vec2::new(0.0, -distance),
        }
    }
}

/// Slide 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    /// 方向
    pub direction: SlideDirection,
    /// 偏移距离
    pub distance: f32,
    /// 时长（秒）
    pub duration: f32,
    /// 插值曲线
    pub curve: CurveSpec,
    /// 时间轴
    pub time_mode: TimeMode,
}

impl Default for SlideSettings {
    fn default() -> Self {
        Self {
            direction: SlideDirection::Left,
            distance: 1920.0,
            duration: 0.4,
            curve: CurveSpec::EaseInOut,
            time_mode: TimeMode::Unscaled,
        }
    }
}

/// Slide 效果
#[derive(Debug)]
pub struct SlideEffect {
    target: SharedTransform,
    slide_direction: SlideDirection,
    distance: f32,
    duration: f32,
    curve: Curve,
    time_mode: TimeMode,
    designed_position: Vec2,
    playback: Playback,
    direction: PlayDirection,
    enabled: bool,
}

impl SlideEffect {
    /// 创建效果，并立即捕获设计位置
    pub fn new(target: SharedTransform, settings: SlideSettings) -> Self {
        let designed_position = target.transform().position;
        Self {
            target,
            slide_direction: settings.direction,
            distance: settings.distance,
            duration: settings.duration.max(0.0),
            curve: settings.curve.build(),
            time_mode: settings.time_mode,
            designed_position,
            playback: Playback::default(),
            direction: PlayDirection::Forward,
            enabled: true,
        }
    }

    /// 替换插值曲线
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// 滑入
    pub fn slide_in(&mut self) {
        self.start(PlayDirection::Forward);
    }

    /// 滑出
    pub fn slide_out(&mut self) {
        self.start(PlayDirection::Reverse);
    }

    /// 设置方向（下一帧起生效）
    pub fn set_direction(&mut self, direction: SlideDirection) {
        self.slide_direction = direction;
    }

    /// 设置偏移距离（下一帧起生效）
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// 设计位置
    pub fn designed_position(&self) -> Vec2 {
        self.designed_position
    }

    /// 屏幕外位置
    pub fn offscreen_position(&self) -> Vec2 {
        self.designed_position + self.slide_direction.offset(self.distance)
    }

    fn start(&mut self, direction: PlayDirection) {
        self.direction = direction;
        self.playback = Playback::start(self.duration);
        debug!(
            direction = ?direction,
            side = ?self.slide_direction,
            duration = self.duration,
            "Slide: 开始播放"
        );
    }

    fn endpoints(&self) -> (Vec2, Vec2) {
        let offscreen = self.offscreen_position();
        match self.direction {
            PlayDirection::Forward => (offscreen, self.designed_position),
            PlayDirection::Reverse => (self.designed_position, offscreen),
        }
    }
}

impl Tickable for SlideEffect {
    fn update(&mut self, frame: &FrameTime) {
        if !self.enabled || !self.playback.is_playing() {
            return;
        }

        let normalized = self.playback.advance(frame.delta_for(self.time_mode));
        let (from, to) = self.endpoints();
        if self.playback.is_complete() {
            self.target.set_position(to);
            self.playback.stop();
            return;
        }

        let fraction = self.curve.evaluate(normalized);
        self.target.set_position(from.lerp(to, fraction));
    }

    fn on_enable(&mut self) {
        self.enabled = true;
        self.designed_position = self.target.transform().position;
    }

    fn on_disable(&mut self) {
        self.enabled = false;
        self.playback.stop();
    }
}

impl TransitionEffect for SlideEffect {
    fn in_duration(&self) -> f32 {
        self.duration
    }

    fn out_duration(&self) -> f32 {
        self.duration
    }

    fn snap_covered(&mut self) {
        self.playback.stop();
        self.target.set_position(self.designed_position);
    }

    fn snap_revealed(&mut self) {
        self.playback.stop();
        self.target.set_position(self.offscreen_position());
    }

    fn play_in(&mut self) {
        self.slide_in();
    }

    fn play_out(&mut self) {
        self.slide_out();
    }
}
