//! 有时长的播放状态
//!
//! 每个效果实例最多持有一个 `Playback`；用新值替换旧值即取消旧的播放，
//! 被替换的播放不会再写任何属性。

/// 播放方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayDirection {
    /// 正向（驶向遮挡态）
    #[default]
    Forward,
    /// 反向（驶向显露态）
    Reverse,
}

/// 播放状态
///
/// `elapsed` 永远不会超过 `duration`。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Playback {
    elapsed: f32,
    duration: f32,
    playing: bool,
}

impl Playback {
    /// 开始一次播放
    ///
    /// 时长不为正时，下一帧即完成。
    pub fn start(duration: f32) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            elapsed: 0.0,
            duration,
            playing: true,
        }
    }

    /// 推进一帧，返回推进后的归一化进度
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.playing {
            self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        }
        self.normalized()
    }

    /// 归一化进度 [0, 1]
    pub fn normalized(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// 是否已到达终点
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// 已播放时长
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// 总时长
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// 停止播放
    pub fn stop(&mut self) {
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_never_exceeds_duration() {
        let mut playback = Playback::start(0.3);
        playback.advance(0.2);
        assert!(!playback.is_complete());
        let n = playback.advance(0.2);
        assert_eq!(n, 1.0);
        assert_eq!(playback.elapsed(), 0.3);
        assert!(playback.is_complete());
    }

    #[test]
    fn test_zero_duration_completes_on_first_advance() {
        let mut playback = Playback::start(0.0);
        assert!(playback.is_playing());
        assert_eq!(playback.advance(0.016), 1.0);
        assert!(playback.is_complete());

        let negative = Playback::start(-1.0);
        assert_eq!(negative.duration(), 0.0);
    }

    #[test]
    fn test_stopped_playback_does_not_advance() {
        let mut playback = Playback::start(1.0);
        playback.stop();
        playback.advance(0.5);
        assert_eq!(playback.elapsed(), 0.0);
        assert!(!Playback::default().is_playing());
    }
}
