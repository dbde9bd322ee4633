//! # Timeline 模块
//!
//! 记录每个转场事件发生的帧和时间，输出为文本或 JSON。

use std::fmt;

use cover_runtime::{FrameTime, TransitionEvent};
use serde::Serialize;

/// 时间线条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// 帧序号（请求发生在第一帧之前时为 0）
    pub frame: u64,
    /// 非缩放时间（秒）
    pub time: f32,
    /// 事件
    #[serde(flatten)]
    pub event: TransitionEvent,
}

/// 事件时间线
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// 创建空时间线
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一批发生在同一帧的事件
    pub fn record(&mut self, frame: &FrameTime, events: impl IntoIterator<Item = TransitionEvent>) {
        self.entries.extend(events.into_iter().map(|event| TimelineEntry {
            frame: frame.frame,
            time: frame.unscaled_time,
            event,
        }));
    }

    /// 全部条目
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 是否已记录 `Finished`
    pub fn is_finished(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.event == TransitionEvent::Finished)
    }

    /// 输出为格式化 JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

impl fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[frame {:>5}] {:>8.3}s  ", self.frame, self.time)?;
        match &self.event {
            TransitionEvent::Started => write!(f, "started"),
            TransitionEvent::Activated(scene) => {
                write!(f, "activated  {} (#{})", scene.name, scene.index)
            }
            TransitionEvent::Finished => write!(f, "finished"),
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
