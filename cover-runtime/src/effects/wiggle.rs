//! # Wiggle 效果
//!
//! 持续的噪声抖动：位置偏移，以及可选的绕 Z 轴旋转。
//!
//! 采样时间为 `time × speed`，沿噪声场中互不相交的三行取值，
//! 从 [0, 1] 重映射到 [-1, 1] 后乘以对应强度。
//! 不同种子的实例互不相关。停止或禁用时精确恢复基准位置和旋转。

use glam::{Quat, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::noise::ValueNoise2D;
use crate::scheduler::Tickable;
use crate::time::{FrameTime, TimeMode};
use crate::transform::{SharedTransform, Transform, TransformTarget};

use super::{TransitionEffect, instance_seed};

/// 噪声场中的采样行
const ROW_X: f32 = 0.5;
const ROW_Y: f32 = 7.5;
const ROW_ROTATION: f32 = 14.5;

/// Wiggle 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiggleSettings {
    /// 位置偏移强度
    pub position_intensity: f32,
    /// 旋转强度（度），0 表示不旋转
    pub rotation_intensity: f32,
    /// 噪声推进速度
    pub speed: f32,
    /// 噪声种子，缺省时随机
    pub seed: Option<u64>,
    /// 作为遮罩时 `play_in` 的等待时长
    pub in_duration: f32,
    /// 作为遮罩时 `play_out` 的等待时长
    pub out_duration: f32,
    /// 时间轴
    pub time_mode: TimeMode,
}

impl Default for WiggleSettings {
    fn default() -> Self {
        Self {
            position_intensity: 8.0,
            rotation_intensity: 0.0,
            speed: 2.0,
            seed: None,
            in_duration: 0.0,
            out_duration: 0.0,
            time_mode: TimeMode::Unscaled,
        }
    }
}

/// Wiggle 效果
#[derive(Debug)]
pub struct WiggleEffect {
    target: SharedTransform,
    position_intensity: f32,
    rotation_intensity: f32,
    speed: f32,
    noise: ValueNoise2D,
    in_duration: f32,
    out_duration: f32,
    time_mode: TimeMode,
    base_position: Vec2,
    base_rotation: Quat,
    playing: bool,
    enabled: bool,
}

impl WiggleEffect {
    /// 创建效果，捕获基准位置和旋转
    pub fn new(target: SharedTransform, settings: WiggleSettings) -> Self {
        let Transform {
            position, rotation, ..
        } = target.transform();
        Self {
            target,
            position_intensity: settings.position_intensity,
            rotation_intensity: settings.rotation_intensity,
            speed: settings.speed,
            noise: ValueNoise2D::new(instance_seed(settings.seed)),
            in_duration: settings.in_duration.max(0.0),
            out_duration: settings.out_duration.max(0.0),
            time_mode: settings.time_mode,
            base_position: position,
            base_rotation: rotation,
            playing: false,
            enabled: true,
        }
    }

    /// 开始抖动
    pub fn play(&mut self) {
        if !self.playing {
            debug!(
                position = self.position_intensity,
                rotation = self.rotation_intensity,
                speed = self.speed,
                "Wiggle: 开始"
            );
        }
        self.playing = true;
    }

    /// 停止抖动并恢复基准值
    pub fn stop(&mut self) {
        self.playing = false;
        self.restore();
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// 设置位置强度
    pub fn set_position_intensity(&mut self, intensity: f32) {
        self.position_intensity = intensity;
    }

    /// 设置旋转强度（度）
    pub fn set_rotation_intensity(&mut self, degrees: f32) {
        self.rotation_intensity = degrees;
    }

    /// 设置速度
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// 噪声种子
    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }

    /// 基准位置
    pub fn base_position(&self) -> Vec2 {
        self.base_position
    }

    /// 基准旋转
    pub fn base_rotation(&self) -> Quat {
        self.base_rotation
    }

    fn restore(&self) {
        let mut t = self.target.transform();
        t.position = self.base_position;
        t.rotation = self.base_rotation;
        self.target.set_transform(t);
    }

    fn apply(&self, time: f32) {
        if self.speed <= 0.0 {
            self.restore();
            return;
        }

        let t = time * self.speed;
        let offset = Vec2::new(
            self.noise.sample_signed(t, ROW_X),
            self.noise.sample_signed(t, ROW_Y),
        ) * self.position_intensity;

        let rotation = if self.rotation_intensity == 0.0 {
            self.base_rotation
        } else {
            let degrees = self.noise.sample_signed(t, ROW_ROTATION) * self.rotation_intensity;
            self.base_rotation * Quat::from_rotation_z(degrees.to_radians())
        };

        let mut transform = self.target.transform();
        transform.position = self.base_position + offset;
        transform.rotation = rotation;
        self.target.set_transform(transform);
    }
}

impl Tickable for WiggleEffect {
    fn late_update(&mut self, frame: &FrameTime) {
        if !self.enabled || !self.playing {
            return;
        }
        self.apply(frame.time_for(self.time_mode));
    }

    fn on_enable(&mut self) {
        self.enabled = true;
        let t = self.target.transform();
        self.base_position = t.position;
        self.base_rotation = t.rotation;
    }

    fn on_disable(&mut self) {
        self.enabled = false;
        self.stop();
    }
}

impl TransitionEffect for WiggleEffect {
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
