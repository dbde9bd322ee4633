//! # Scheduler 模块
//!
//! 单线程、协作式、逐帧驱动的调度器。
//!
//! 对象实现 [`Tickable`] 并注册到调度器，调度器每帧：
//! 1. 推进时钟
//! 2. 按注册顺序调用每个启用对象的 `update`
//! 3. 再按注册顺序调用每个启用对象的 `late_update`
//!
//! 持续型效果（脉冲、抖动）在 late 阶段写属性，避免被同帧的其它更新覆盖。
//!
//! ```rust,ignore
//! let mut scheduler = Scheduler::new();
//! let loader_id = scheduler.register(loader.clone());
//! let orchestrator_id = scheduler.register(orchestrator.clone());
//! scheduler.tick(1.0 / 60.0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::time::{Clock, FrameTime};

/// 逐帧驱动的对象
///
/// 所有方法都有空的默认实现。
pub trait Tickable {
    /// 每帧更新
    fn update(&mut self, _frame: &FrameTime) {}

    /// 每帧的后置更新（在所有 `update` 之后）
    fn late_update(&mut self, _frame: &FrameTime) {}

    /// 宿主元素变为启用
    fn on_enable(&mut self) {}

    /// 宿主元素变为禁用
    fn on_disable(&mut self) {}
}

/// 调度条目 ID
///
/// 由 `Scheduler` 在注册时分配，不会重复。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(u64);

impl TickId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TickId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TickId({})", self.0)
    }
}

/// 已注册的对象
struct Entry {
    id: TickId,
    object: Rc<RefCell<dyn Tickable>>,
    enabled: bool,
}

/// 调度器
pub struct Scheduler {
    clock: Clock,
    entries: Vec<Entry>,
    next_id: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("clock", &self.clock)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Scheduler {
    /// 创建新的调度器
    pub fn new() -> Self {
        Self {
            clock: Clock::new(),
            entries: Vec::new(),
            next_id: 1,
        }
    }

    // ========== 对象管理 ==========

    /// 注册对象
    ///
    /// 注册顺序即每帧的调用顺序。对象初始为启用状态，注册时不调用 `on_enable`。
    pub fn register<T: Tickable + 'static>(&mut self, object: Rc<RefCell<T>>) -> TickId {
        let id = TickId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            object: object as Rc<RefCell<dyn Tickable>>,
            enabled: true,
        });
        id
    }

    /// 注销对象
    ///
    /// 启用中的对象会先收到 `on_disable`。
    pub fn unregister(&mut self, id: TickId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        if entry.enabled {
            entry.object.borrow_mut().on_disable();
        }
        true
    }

    /// 检查对象是否已注册
    pub fn is_registered(&self, id: TickId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// 已注册对象数量
    pub fn registered_count(&self) -> usize {
        self.entries.len()
    }

    /// 启用或禁用对象
    ///
    /// 状态真正改变时才调用 `on_enable` / `on_disable`。
    pub fn set_enabled(&mut self, id: TickId, enabled: bool) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if entry.enabled == enabled {
            return true;
        }
        entry.enabled = enabled;
        debug!(id = %id, enabled, "调度条目启用状态变化");
        let mut object = entry.object.borrow_mut();
        if enabled {
            object.on_enable();
        } else {
            object.on_disable();
        }
        true
    }

    /// 对象是否启用
    pub fn is_enabled(&self, id: TickId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.enabled)
    }

    // ========== 时间 ==========

    /// 设置时间缩放
    pub fn set_time_scale(&mut self, scale: f32) {
        self.clock.set_time_scale(scale);
    }

    /// 当前时间缩放
    pub fn time_scale(&self) -> f32 {
        self.clock.time_scale()
    }

    /// 最近一帧
    pub fn now(&self) -> FrameTime {
        self.clock.now()
    }

    // ========== 驱动 ==========

    /// 推进一帧
    ///
    /// # 返回
    /// 本帧的时间快照
    pub fn tick(&mut self, dt: f32) -> FrameTime {
        let frame = self.clock.advance(dt);

        for entry in self.entries.iter().filter(|e| e.enabled) {
            entry.object.borrow_mut().update(&frame);
        }
        for entry in self.entries.iter().filter(|e| e.enabled) {
            entry.object.borrow_mut().late_update(&frame);
        }

        frame
    }
}
