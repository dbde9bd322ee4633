//! # Spin 效果
//!
//! 绕一个局部轴旋转。
//!
//! 曲线值被视为 [0, 1] 的旋转进度（越界会被限制）。每帧只施加
//! 自上一帧以来的增量旋转 `Δcurve × degrees`，叠加到当前旋转上，
//! 而不是直接设置绝对值；因此循环时可以在每一圈开头重新捕获基准，
//! 多圈旋转平滑累积。每一圈结束时对齐到精确的终点旋转。
//!
//! 遮挡协议：遮挡态 = 设计旋转，显露态 = 设计旋转再偏转
//! `reveal_degrees`（默认 90°，元素侧对观察者）。效果记录当前相对设计旋转
//! 的偏转角，`play_in` / `play_out` 只转剩余的角度，中途反向不会在终点跳变。
//!
//! 禁用时取消播放，旋转停在最后写入的值。

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::{Curve, CurveSpec};
use crate::scheduler::Tickable;
use crate::time::{FrameTime, TimeMode};
use crate::transform::{SharedTransform, TransformTarget};

use super::{Playback, TransitionEffect};

/// 旋转轴（局部）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinAxis {
    /// X 轴
    X,
    /// Y 轴
    Y,
    /// Z 轴
    #[default]
    Z,
}

impl SpinAxis {
    /// 单位向量
    pub fn vector(&self) -> Vec3 {
        match self {
            SpinAxis::X => Vec3::X,
            SpinAxis::Y => Vec3::Y,
            SpinAxis::Z => Vec3::Z,
        }
    }

    /// 绕该轴旋转 `degrees` 度
    pub fn rotation(&self, degrees: f32) -> Quat {
        Quat::from_axis_angle(self.vector(), degrees.to_radians())
    }
}

/// Spin 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinSettings {
    /// 旋转轴
    pub axis: SpinAxis,
    /// 每圈旋转角度（度）
    pub degrees: f32,
    /// 每圈时长（秒）
    pub duration: f32,
    /// 进度曲线
    pub curve: CurveSpec,
    /// 是否无限循环
    pub looping: bool,
    /// 显露态相对设计旋转的偏转角（度）
    pub reveal_degrees: f32,
    /// 时间轴
    pub time_mode: TimeMode,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            axis: SpinAxis::Z,
            degrees: 360.0,
            duration: 1.0,
            curve: CurveSpec::EaseInOut,
            looping: false,
            reveal_degrees: 90.0,
            time_mode: TimeMode::Unscaled,
        }
    }
}

/// 一圈旋转
#[derive(Debug, Clone, Copy)]
struct SpinCycle {
    /// 本圈总角度
    degrees: f32,
    /// 本圈结束时的精确旋转
    terminal: Quat,
    /// 上一帧的（已限制）曲线值
    last_progress: f32,
    /// 本圈结束时相对设计旋转的偏转角
    end_offset: f32,
    /// 结束后是否继续下一圈
    looping: bool,
}

/// Spin 效果
#[derive(Debug)]
pub struct SpinEffect {
    target: SharedTransform,
    axis: SpinAxis,
    degrees: f32,
    duration: f32,
    curve: Curve,
    looping: bool,
    reveal_degrees: f32,
    time_mode: TimeMode,
    designed_rotation: Quat,
    /// 当前相对设计旋转的偏转角（度）
    offset_degrees: f32,
    playback: Playback,
    cycle: Option<SpinCycle>,
    cycle_count: u32,
    enabled: bool,
}

impl SpinEffect {
    /// 创建效果，并立即捕获设计旋转
    pub fn new(target: SharedTransform, settings: SpinSettings) -> Self {
        let designed_rotation = target.transform().rotation;
        Self {
            target,
            axis: settings.axis,
            degrees: settings.degrees,
            duration: settings.duration.max(0.0),
            curve: settings.curve.build(),
            looping: settings.looping,
            reveal_degrees: settings.reveal_degrees,
            time_mode: settings.time_mode,
            designed_rotation,
            offset_degrees: 0.0,
            playback: Playback::default(),
            cycle: None,
            cycle_count: 0,
            enabled: true,
        }
    }

    /// 替换进度曲线
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    // ========== 直接控制 ==========

    /// 从当前旋转开始转 `degrees` 度（按 `looping` 决定是否循环）
    pub fn play(&mut self) {
        let base = self.target.transform().rotation;
        let terminal = base * self.axis.rotation(self.degrees);
        self.start_cycle(self.degrees, terminal, self.looping);
    }

    /// 停止旋转，保持当前旋转
    pub fn stop(&mut self) {
        self.playback.stop();
        self.cycle = None;
    }

    /// 是否正在旋转
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// 已完成的圈数
    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// 设置旋转轴
    pub fn set_axis(&mut self, axis: SpinAxis) {
        self.axis = axis;
    }

    /// 设置每圈角度
    pub fn set_degrees(&mut self, degrees: f32) {
        self.degrees = degrees;
    }

    /// 设置是否循环（下一次 `play` 生效）
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// 设计旋转
    pub fn designed_rotation(&self) -> Quat {
        self.designed_rotation
    }

    fn revealed_rotation(&self) -> Quat {
        self.designed_rotation * self.axis.rotation(self.reveal_degrees)
    }

    /// 当前相对设计旋转的偏转角（度）
    pub fn offset_degrees(&self) -> f32 {
        self.offset_degrees
    }

    fn start_cycle(&mut self, degrees: f32, terminal: Quat, looping: bool) {
        self.cycle = Some(SpinCycle {
            degrees,
            terminal,
            last_progress: self.curve.evaluate(0.0).clamp(0.0, 1.0),
            end_offset: self.offset_degrees + degrees,
            looping,
        });
        self.playback = Playback::start(self.duration);
        debug!(degrees, duration = self.duration, looping, "Spin: 开始旋转");
    }

    fn snap(&mut self, rotation: Quat, offset_degrees: f32) {
        self.stop();
        self.offset_degrees = offset_degrees;
        self.target.set_rotation(rotation);
    }
}

impl Tickable for SpinEffect {
    fn update(&mut self, frame: &FrameTime) {
        if !self.enabled || !self.playback.is_playing() {
            return;
        }
        let Some(mut cycle) = self.cycle else {
            self.playback.stop();
            return;
        };

        let normalized = self.playback.advance(frame.delta_for(self.time_mode));
        let progress = self.curve.evaluate(normalized).clamp(0.0, 1.0);
        let delta = (progress - cycle.last_progress) * cycle.degrees;
        cycle.last_progress = progress;
        self.offset_degrees += delta;

        let current = self.target.transform().rotation;
        self.target
            .set_rotation(current * self.axis.rotation(delta));

        if !self.playback.is_complete() {
            self.cycle = Some(cycle);
            return;
        }

        // 对齐到精确终点
        self.target.set_rotation(cycle.terminal);
        self.offset_degrees = cycle.end_offset;
        self.cycle_count += 1;

        if cycle.looping {
            // 从新捕获的基准开始下一圈
            let base = cycle.terminal;
            let terminal = base * self.axis.rotation(cycle.degrees);
            self.start_cycle(cycle.degrees, terminal, true);
        } else {
            self.stop();
        }
    }

    fn on_enable(&mut self) {
        self.enabled = true;
        self.designed_rotation = self.target.transform().rotation;
        self.offset_degrees = 0.0;
    }

    fn on_disable(&mut self) {
        self.enabled = false;
        self.stop();
    }
}

impl TransitionEffect for SpinEffect {
    fn in_duration(&self) -> f32 {
        self.duration
    }

    fn out_duration(&self) -> f32 {
        self.duration
    }

    fn snap_covered(&mut self) {
        self.snap(self.designed_rotation, 0.0);
    }

    fn snap_revealed(&mut self) {
        self.snap(self.revealed_rotation(), self.reveal_degrees);
    }

    fn play_in(&mut self) {
        self.start_cycle(-self.offset_degrees, self.designed_rotation, false);
    }

    fn play_out(&mut self) {
        let terminal = self.revealed_rotation();
        self.start_cycle(self.reveal_degrees - self.offset_degrees, terminal, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Clock;
    use crate::transform::Transform;

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.dot(b).abs() > 1.0 - 1e-5
    }

    fn run(effect: &mut SpinEffect, clock: &mut Clock, ticks: usize, dt: f32) {
        for _ in 0..ticks {
            let frame = clock.advance(dt);
            effect.update(&frame);
        }
    }

    #[test]
    fn test_full_turn_returns_to_start_for_any_curve() {
        let start = Quat::from_rotation_y(0.4);
        for curve in [Curve::linear(), Curve::overshoot(0.4), Curve::ease_in()] {
            let target = SharedTransform::new(Transform::with_rotation(start));
            let mut effect = SpinEffect::new(
                target.clone(),
                SpinSettings {
                    degrees: 360.0,
                    duration: 0.5,
                    ..SpinSettings::default()
                },
            )
            .with_curve(curve);
            let mut clock = Clock::new();

            effect.play();
            run(&mut effect, &mut clock, 7, 0.1);

            assert!(!effect.is_playing());
            assert_eq!(effect.cycle_count(), 1);
            assert!(same_rotation(target.rotation(), start));
        }
    }

    #[test]
    fn test_rotation_is_incremental() {
        let target = SharedTransform::default();
        let mut effect = SpinEffect::new(
            target.clone(),
            SpinSettings {
                degrees: 90.0,
                duration: 1.0,
                ..SpinSettings::default()
            },
        )
        .with_curve(Curve::linear());
        let mut clock = Clock::new();

        effect.play();
        run(&mut effect, &mut clock, 5, 0.1);
        // 外部在播放中途追加旋转，增量叠加会保留它
        let external = Quat::from_rotation_x(0.3);
        target.set_rotation(target.rotation() * external);
        let before = target.rotation();
        run(&mut effect, &mut clock, 1, 0.1);

        let expected = before * SpinAxis::Z.rotation(9.0);
        assert!(same_rotation(target.rotation(), expected));
    }

    #[test]
    fn test_looping_accumulates_cycles() {
        let target = SharedTransform::default();
        let mut effect = SpinEffect::new(
            target.clone(),
            SpinSettings {
                degrees: 120.0,
                duration: 0.2,
                looping: true,
                ..SpinSettings::default()
            },
        );
        let mut clock = Clock::new();

        effect.play();
        run(&mut effect, &mut clock, 6, 0.1);

        assert!(effect.is_playing());
        assert_eq!(effect.cycle_count(), 3);
        assert!(same_rotation(target.rotation(), Quat::IDENTITY));

        effect.stop();
        let frozen = target.rotation();
        run(&mut effect, &mut clock, 3, 0.1);
        assert_eq!(target.rotation(), frozen);
    }

    #[test]
    fn test_cover_contract() {
        let designed = Quat::from_rotation_z(0.25);
        let target = SharedTransform::new(Transform::with_rotation(designed));
        let mut effect = SpinEffect::new(
            target.clone(),
            SpinSettings {
                duration: 0.3,
                ..SpinSettings::default()
            },
        );
        let mut clock = Clock::new();
        let revealed = designed * SpinAxis::Z.rotation(90.0);

        effect.snap_revealed();
        effect.snap_revealed();
        assert!(same_rotation(target.rotation(), revealed));

        effect.play_in();
        run(&mut effect, &mut clock, 4, 0.1);
        assert_eq!(target.rotation(), designed);

        effect.play_out();
        run(&mut effect, &mut clock, 4, 0.1);
        assert_eq!(target.rotation(), revealed);

        effect.snap_covered();
        assert_eq!(target.rotation(), designed);
    }

    #[test]
    fn test_reversing_mid_cycle_turns_remaining_angle() {
        let target = SharedTransform::default();
        let mut effect = SpinEffect::new(
            target.clone(),
            SpinSettings {
                duration: 0.3,
                ..SpinSettings::default()
            },
        )
        .with_curve(Curve::linear());
        let mut clock = Clock::new();

        // 显露播放到三分之一处（30°）后改为遮挡
        effect.play_out();
        run(&mut effect, &mut clock, 1, 0.1);
        assert!((effect.offset_degrees() - 30.0).abs() < 1e-3);

        effect.play_in();
        run(&mut effect, &mut clock, 1, 0.1);
        assert!((effect.offset_degrees() - 20.0).abs() < 1e-3);
        assert!(same_rotation(target.rotation(), SpinAxis::Z.rotation(20.0)));

        run(&mut effect, &mut clock, 3, 0.1);
        assert!(!effect.is_playing());
        assert_eq!(target.rotation(), Quat::IDENTITY);
        assert_eq!(effect.offset_degrees(), 0.0);
    }

    #[test]
    fn test_disable_cancels_and_leaves_rotation() {
        let target = SharedTransform::default();
        let mut effect = SpinEffect::new(target.clone(), SpinSettings::default());
        let mut clock = Clock::new();

        effect.play();
        run(&mut effect, &mut clock, 3, 0.1);
        effect.on_disable();
        let frozen = target.rotation();
        run(&mut effect, &mut clock, 10, 0.1);

        assert!(!effect.is_playing());
        assert_eq!(target.rotation(), frozen);
        assert_ne!(frozen, Quat::IDENTITY);
    }

    #[test]
    fn test_enable_recaptures_designed_rotation() {
        let target = SharedTransform::default();
        let mut effect = SpinEffect::new(target.clone(), SpinSettings::default());

        effect.on_disable();
        target.set_rotation(Quat::from_rotation_x(1.0));
        effect.on_enable();
        assert_eq!(effect.designed_rotation(), Quat::from_rotation_x(1.0));
    }

    #[test]
    fn test_zero_duration_snaps_next_tick() {
        let target = SharedTransform::default();
        let mut effect = SpinEffect::new(
            target.clone(),
            SpinSettings {
                degrees: 45.0,
                duration: 0.0,
                ..SpinSettings::default()
            },
        );
        let mut clock = Clock::new();

        effect.play();
        assert_eq!(target.rotation(), Quat::IDENTITY);
        run(&mut effect, &mut clock, 1, 0.016);
        assert_eq!(target.rotation(), SpinAxis::Z.rotation(45.0));
    }
}
