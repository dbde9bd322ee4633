//! # Pulse 效果
//!
//! 持续的均匀缩放脉冲，不受时长限制，直到显式停止。
//!
//! 倍率为 `1 + sin(time × frequency × 2π + phase) × intensity`，
//! `phase` 在创建时由种子决定，用来错开同时运行的多个实例。
//! 在调度器的后置阶段写入缩放，覆盖同一帧内其他更新对缩放的修改。
//!
//! 停止或禁用时精确恢复基准缩放。

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scheduler::Tickable;
use crate::time::{FrameTime, TimeMode};
use crate::transform::{SharedTransform, TransformTarget};

use super::{TransitionEffect, instance_seed};

/// Pulse 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    /// 振幅（倍率偏离 1 的最大值）
    pub intensity: f32,
    /// 频率（Hz）
    pub frequency: f32,
    /// 相位种子，缺省时随机
    pub seed: Option<u64>,
    /// 作为遮罩时 `play_in` 的等待时长
    pub in_duration: f32,
    /// 作为遮罩时 `play_out` 的等待时长
    pub out_duration: f32,
    /// 时间轴
    pub time_mode: TimeMode,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            intensity: 0.05,
            frequency: 1.0,
            seed: None,
            in_duration: 0.0,
            out_duration: 0.0,
            time_mode: TimeMode::Unscaled,
        }
    }
}

/// Pulse 效果
#[derive(Debug)]
pub struct PulseEffect {
    target: SharedTransform,
    intensity: f32,
    frequency: f32,
    phase: f32,
    in_duration: f32,
    out_duration: f32,
    time_mode: TimeMode,
    base_scale: Vec3,
    playing: bool,
    enabled: bool,
}

impl PulseEffect {
    /// 创建效果，捕获基准缩放并确定相位
    pub fn new(target: SharedTransform, settings: PulseSettings) -> Self {
        let base_scale = target.transform().scale;
        let mut rng = StdRng::seed_from_u64(instance_seed(settings.seed));
        let phase = rng.random_range(0.0..TAU);
        Self {
            target,
            intensity: settings.intensity,
            frequency: settings.frequency,
            phase,
            in_duration: settings.in_duration.max(0.0),
            out_duration: settings.out_duration.max(0.0),
            time_mode: settings.time_mode,
            base_scale,
            playing: false,
            enabled: true,
        }
    }

    /// 开始脉冲
    pub fn play(&mut self) {
        if !self.playing {
            debug!(intensity = self.intensity, frequency = self.frequency, "Pulse: 开始");
        }
        self.playing = true;
    }

    /// 停止脉冲并恢复基准缩放
    pub fn stop(&mut self) {
        self.playing = false;
        self.target.set_scale(self.base_scale);
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// 设置振幅
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    /// 设置频率
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// 相位偏移（弧度）
    pub fn phase_offset(&self) -> f32 {
        self.phase
    }

    /// 基准缩放
    pub fn base_scale(&self) -> Vec3 {
        self.base_scale
    }

    fn multiplier(&self, time: f32) -> f32 {
        if self.intensity == 0.0 || self.frequency <= 0.0 {
            return 1.0;
        }
        1.0 + (time * self.frequency * TAU + self.phase).sin() * self.intensity
    }
}

impl Tickable for PulseEffect {
    fn late_update(&mut self, frame: &FrameTime) {
        if !self.enabled || !self.playing {
            return;
        }
        let multiplier = self.multiplier(frame.time_for(self.time_mode));
        self.target.set_scale(self.base_scale * multiplier);
    }

    fn on_enable(&mut self) {
        self.enabled = true;
        self.base_scale = self.target.transform().scale;
    }

    fn on_disable(&mut self) {
        self.enabled = false;
        self.stop();
    }
}

impl TransitionEffect for PulseEffect {
    fn in_duration(&self) -> f32 {
        self.in_duration
    }

    fn out_duration(&self) -> f32 {
        self.out_duration
    }

    fn snap_covered(&mut self) {
        self.stop();
    }

    fn snap_revealed(&mut self) {
        self.stop();
    }

    fn play_in(&mut self) {
        self.play();
    }

    fn play_out(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Clock;
    use crate::transform::Transform;

    fn pulse(target: &SharedTransform, intensity: f32, frequency: f32) -> PulseEffect {
        PulseEffect::new(
            target.clone(),
            PulseSettings {
                intensity,
                frequency,
                seed: Some(11),
                ..PulseSettings::default()
            },
        )
    }

    fn run(effect: &mut PulseEffect, clock: &mut Clock, ticks: usize, dt: f32) -> Vec<f32> {
        (0..ticks)
            .map(|_| {
                let frame = clock.advance(dt);
                effect.update(&frame);
                effect.late_update(&frame);
                effect.target.scale().x
            })
            .collect()
    }

    #[test]
    fn test_stays_within_intensity_band() {
        let target = SharedTransform::new(Transform::with_uniform_scale(2.0));
        let mut effect = pulse(&target, 0.1, 2.0);
        let mut clock = Clock::new();

        effect.play();
        let samples = run(&mut effect, &mut clock, 120, 1.0 / 60.0);

        assert!(samples.iter().all(|s| (1.8 - 1e-4..=2.2 + 1e-4).contains(s)));
        let min = samples.iter().cloned().fold(f32::MAX, f32::min);
        let max = samples.iter().cloned().fold(f32::MIN, f32::max);
        // 两个完整周期，应接近两端
        assert!(max - min > 0.35);
    }

    #[test]
    fn test_zero_intensity_or_frequency_holds_base() {
        for (intensity, frequency) in [(0.0, 1.0), (0.2, 0.0), (0.2, -3.0)] {
            let target = SharedTransform::new(Transform::with_uniform_scale(1.5));
            let mut effect = pulse(&target, intensity, frequency);
            let mut clock = Clock::new();

            effect.play();
            let samples = run(&mut effect, &mut clock, 30, 0.05);
            assert!(samples.iter().all(|s| *s == 1.5));
        }
    }

    #[test]
    fn test_stop_restores_base_exactly() {
        let target = SharedTransform::new(Transform::with_uniform_scale(1.25));
        let mut effect = pulse(&target, 0.3, 1.0);
        let mut clock = Clock::new();

        effect.play();
        run(&mut effect, &mut clock, 7, 0.03);
        effect.stop();

        assert_eq!(target.scale(), Vec3::splat(1.25));
        run(&mut effect, &mut clock, 5, 0.03);
        assert_eq!(target.scale(), Vec3::splat(1.25));
    }

    #[test]
    fn test_idle_pulse_does_not_write() {
        let target = SharedTransform::new(Transform::with_uniform_scale(1.0));
        let mut effect = pulse(&target, 0.3, 1.0);
        let mut clock = Clock::new();

        target.set_scale(Vec3::splat(4.0));
        run(&mut effect, &mut clock, 3, 0.1);
        assert_eq!(target.scale(), Vec3::splat(4.0));
    }

    #[test]
    fn test_seed_determines_phase() {
        let target = SharedTransform::default();
        let a = pulse(&target, 0.1, 1.0);
        let b = pulse(&target, 0.1, 1.0);
        assert_eq!(a.phase_offset(), b.phase_offset());
        assert!((0.0..TAU).contains(&a.phase_offset()));

        let other = PulseEffect::new(
            target,
            PulseSettings {
                seed: Some(12),
                ..PulseSettings::default()
            },
        );
        assert_ne!(a.phase_offset(), other.phase_offset());
    }

    #[test]
    fn test_disable_restores_and_enable_recaptures() {
        let target = SharedTransform::new(Transform::with_uniform_scale(1.0));
        let mut effect = pulse(&target, 0.5, 1.0);
        let mut clock = Clock::new();

        effect.play();
        run(&mut effect, &mut clock, 4, 0.05);
        effect.on_disable();
        assert_eq!(target.scale(), Vec3::ONE);
        assert!(!effect.is_playing());

        target.set_scale(Vec3::splat(3.0));
        effect.on_enable();
        assert_eq!(effect.base_scale(), Vec3::splat(3.0));
    }

    #[test]
    fn test_cover_contract() {
        let target = SharedTransform::new(Transform::with_uniform_scale(1.0));
        let mut effect = PulseEffect::new(
            target.clone(),
            PulseSettings {
                intensity: 0.2,
                in_duration: 0.5,
                out_duration: 0.25,
                seed: Some(3),
                ..PulseSettings::default()
            },
        );
        let mut clock = Clock::new();

        assert_eq!(effect.in_duration(), 0.5);
        assert_eq!(effect.out_duration(), 0.25);

        effect.play_in();
        assert!(effect.is_playing());
        run(&mut effect, &mut clock, 3, 0.1);
        effect.play_out();
        assert!(!effect.is_playing());
        assert_eq!(target.scale(), Vec3::ONE);
    }
}
