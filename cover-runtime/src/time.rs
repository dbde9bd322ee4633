//! # Time 模块
//!
//! 帧时间与可恢复的等待。
//!
//! 所有播放与编排逻辑只在调度器的每帧回调里推进。
//! 时间有两条轴：
//! - **缩放时间**：受 `time_scale` 影响，暂停（scale = 0）时停止
//! - **非缩放时间**：真实流逝的时间，暂停时仍然前进
//!
//! 效果和编排器通过 [`TimeMode`] 选择使用哪一条。

use serde::{Deserialize, Serialize};

/// 时间轴选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    /// 使用缩放时间（随模拟暂停）
    Scaled,
    /// 忽略时间缩放
    #[default]
    Unscaled,
}

/// 单帧的时间快照
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// 帧序号（第一次 tick 为 1）
    pub frame: u64,
    /// 缩放后的帧间隔（秒）
    pub delta: f32,
    /// 真实帧间隔（秒）
    pub unscaled_delta: f32,
    /// 缩放时间累计（秒）
    pub time: f32,
    /// 真实时间累计（秒）
    pub unscaled_time: f32,
}

impl FrameTime {
    /// 按时间轴取帧间隔
    pub fn delta_for(&self, mode: TimeMode) -> f32 {
        match mode {
            TimeMode::Scaled => self.delta,
            TimeMode::Unscaled => self.unscaled_delta,
        }
    }

    /// 按时间轴取累计时间
    pub fn time_for(&self, mode: TimeMode) -> f32 {
        match mode {
            TimeMode::Scaled => self.time,
            TimeMode::Unscaled => self.unscaled_time,
        }
    }
}

/// 时钟
///
/// 累计两条时间轴，每次 `advance` 产生一个 [`FrameTime`]。
#[derive(Debug, Clone)]
pub struct Clock {
    time_scale: f32,
    current: FrameTime,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// 创建时钟（time_scale = 1）
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            current: FrameTime::default(),
        }
    }

    /// 当前时间缩放
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// 设置时间缩放（负数和非有限值按 0 处理）
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// 前进一帧
    pub fn advance(&mut self, dt: f32) -> FrameTime {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let scaled = dt * self.time_scale;

        self.current = FrameTime {
            frame: self.current.frame + 1,
            delta: scaled,
            unscaled_delta: dt,
            time: self.current.time + scaled,
            unscaled_time: self.current.unscaled_time + dt,
        };
        self.current
    }

    /// 最近一帧
    pub fn now(&self) -> FrameTime {
        self.current
    }
}

/// 可恢复的"等待 N 秒"
///
/// 在第 k 帧创建的等待从第 k+1 帧开始计时；时长不为正的等待视为已完成。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wait {
    duration: f32,
    elapsed: f32,
    mode: TimeMode,
}

impl Wait {
    /// 创建等待
    pub fn new(seconds: f32, mode: TimeMode) -> Self {
        let duration = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        Self {
            duration,
            elapsed: 0.0,
            mode,
        }
    }

    /// 推进一帧，返回是否已完成
    pub fn advance(&mut self, frame: &FrameTime) -> bool {
        if !self.is_done() {
            self.elapsed = (self.elapsed + frame.delta_for(self.mode)).min(self.duration);
        }
        self.is_done()
    }

    /// 是否已完成
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// 总时长
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// 剩余时长
    pub fn remaining(&self) -> f32 {
        self.duration - self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_scaled_and_unscaled() {
        let mut clock = Clock::new();
        clock.advance(0.1);
        clock.set_time_scale(0.0);
        let frame = clock.advance(0.1);

        assert_eq!(frame.frame, 2);
        assert_eq!(frame.delta, 0.0);
        assert!((frame.time - 0.1).abs() < 1e-6);
        assert!((frame.unscaled_time - 0.2).abs() < 1e-6);
        assert_eq!(frame.delta_for(TimeMode::Unscaled), 0.1);
    }

    #[test]
    fn test_clock_rejects_bad_input() {
        let mut clock = Clock::new();
        clock.set_time_scale(-2.0);
        assert_eq!(clock.time_scale(), 0.0);
        clock.set_time_scale(f32::NAN);
        assert_eq!(clock.time_scale(), 0.0);

        let frame = clock.advance(-1.0);
        assert_eq!(frame.unscaled_delta, 0.0);
    }

    #[test]
    fn test_wait_counts_ticks() {
        let mut clock = Clock::new();
        let mut wait = Wait::new(0.25, TimeMode::Unscaled);
        assert!(!wait.is_done());

        assert!(!wait.advance(&clock.advance(0.1)));
        assert!(!wait.advance(&clock.advance(0.1)));
        assert!(wait.advance(&clock.advance(0.1)));
        assert_eq!(wait.remaining(), 0.0);
    }

    #[test]
    fn test_zero_wait_is_done() {
        assert!(Wait::new(0.0, TimeMode::Scaled).is_done());
        assert!(Wait::new(-3.0, TimeMode::Scaled).is_done());
    }

    #[test]
    fn test_scaled_wait_stalls_when_paused() {
        let mut clock = Clock::new();
        clock.set_time_scale(0.0);
        let mut scaled = Wait::new(0.1, TimeMode::Scaled);
        let mut unscaled = Wait::new(0.1, TimeMode::Unscaled);

        for _ in 0..5 {
            let frame = clock.advance(0.05);
            scaled.advance(&frame);
            unscaled.advance(&frame);
        }
        assert!(!scaled.is_done());
        assert!(unscaled.is_done());
    }
}
