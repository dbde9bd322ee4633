//! # Curve 模块
//!
//! 由关键帧描述的标量曲线：把归一化时间 t ∈ [0, 1] 映射到一个值。
//!
//! 相邻关键帧之间使用 Hermite 三次插值，切线取左帧的 `out_tangent`
//! 和右帧的 `in_tangent`（按区间宽度缩放）。输出值不做限制，
//! 可以高于 1.0 或低于 0.0（越界回弹效果依赖这一点），
//! 是否限制由使用曲线的效果自己决定。
//!
//! 曲线创建后不可变，只在播放期间被读取。

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;

/// 曲线关键帧
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// 时间
    pub time: f32,
    /// 值
    pub value: f32,
    /// 入切线（左侧斜率）
    #[serde(default)]
    pub in_tangent: f32,
    /// 出切线（右侧斜率）
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    /// 创建关键帧
    pub const fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }

    /// 创建两侧切线为零的关键帧
    pub const fn flat(time: f32, value: f32) -> Self {
        Self::new(time, value, 0.0, 0.0)
    }
}

/// 关键帧曲线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// 从关键帧创建曲线
    ///
    /// 关键帧按时间排序；时间或值非有限的帧、与前一帧时间重复的帧被丢弃。
    pub fn new(keys: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut keys: Vec<Keyframe> = keys
            .into_iter()
            .filter(|k| k.time.is_finite() && k.value.is_finite())
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        keys.dedup_by(|next, prev| next.time == prev.time);
        Self { keys }
    }

    /// 线性 0 → 1
    pub fn linear() -> Self {
        Self::new([Keyframe::new(0.0, 0.0, 1.0, 1.0), Keyframe::new(1.0, 1.0, 1.0, 1.0)])
    }

    /// 常量曲线
    pub fn constant(value: f32) -> Self {
        Self::new([Keyframe::flat(0.0, value)])
    }

    /// 缓入缓出 0 → 1（两端切线为零）
    pub fn ease_in_out() -> Self {
        Self::new([Keyframe::flat(0.0, 0.0), Keyframe::flat(1.0, 1.0)])
    }

    /// 缓入 0 → 1（等价于 t²）
    pub fn ease_in() -> Self {
        Self::new([Keyframe::flat(0.0, 0.0), Keyframe::new(1.0, 1.0, 2.0, 2.0)])
    }

    /// 缓出 0 → 1（等价于 1 - (1 - t)²）
    pub fn ease_out() -> Self {
        Self::new([Keyframe::new(0.0, 0.0, 2.0, 2.0), Keyframe::flat(1.0, 1.0)])
    }

    /// 越界回弹 0 → 1
    ///
    /// 在 t = 0.7 处达到 `1 + amount`，随后回落到 1。
    pub fn overshoot(amount: f32) -> Self {
        Self::new([
            Keyframe::flat(0.0, 0.0),
            Keyframe::flat(0.7, 1.0 + amount),
            Keyframe::flat(1.0, 1.0),
        ])
    }

    /// 把具名缓动函数烘焙为关键帧曲线
    ///
    /// 切线用有限差分估计；`samples` 至少为 2。
    pub fn from_easing(easing: EasingFunction, samples: usize) -> Self {
        let samples = samples.max(2);
        let step = 1.0 / (samples - 1) as f32;
        let h = step * 0.25;

        let keys = (0..samples).map(|i| {
            let t = i as f32 * step;
            let lo = (t - h).max(0.0);
            let hi = (t + h).min(1.0);
            let slope = (easing.apply(hi) - easing.apply(lo)) / (hi - lo);
            Keyframe::new(t, easing.apply(t), slope, slope)
        });
        Self::new(keys)
    }

    /// 关键帧列表
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// 曲线是否为空
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 计算曲线在 `t` 处的值
    ///
    /// 调用方负责把 `t` 限制在 [0, 1]；超出首尾关键帧时取端点值。
    /// 空曲线返回 0。
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // 第一个 time > t 的位置即右侧关键帧
        let next = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];
        hermite(k0, k1, t)
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::ease_in_out()
    }
}

impl From<Vec<Keyframe>> for Curve {
    fn from(keys: Vec<Keyframe>) -> Self {
        Self::new(keys)
    }
}

impl From<Curve> for Vec<Keyframe> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

fn hermite(k0: &Keyframe, k1: &Keyframe, t: f32) -> f32 {
    let dt = k1.time - k0.time;
    let m0 = k0.out_tangent;
    let m1 = k1.in_tangent;

    // 无限切线表示阶跃
    if !m0.is_finite() || !m1.is_finite() {
        return k0.value;
    }

    let s = ((t - k0.time) / dt).clamp(0.0, 1.0);
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * k0.value + h10 * dt * m0 + h01 * k1.value + h11 * dt * m1
}

/// 曲线配置
///
/// 配置文件中既可以引用预设，也可以直接写关键帧。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CurveSpec {
    /// 线性
    Linear,
    /// 缓入缓出
    #[default]
    EaseInOut,
    /// 越界回弹
    Overshoot {
        /// 峰值超出 1.0 的量
        #[serde(default = "default_overshoot_amount")]
        amount: f32,
    },
    /// 烘焙具名缓动函数
    Easing {
        /// 缓动函数
        easing: EasingFunction,
    },
    /// 自定义关键帧
    Keys {
        /// 关键帧
        keys: Vec<Keyframe>,
    },
}

fn default_overshoot_amount() -> f32 {
    0.15
}

/// 烘焙缓动函数时的采样点数
const EASING_BAKE_SAMPLES: usize = 17;

impl CurveSpec {
    /// 构造曲线
    pub fn build(&self) -> Curve {
        match self {
            CurveSpec::Linear => Curve::linear(),
            CurveSpec::EaseInOut => Curve::ease_in_out(),
            CurveSpec::Overshoot { amount } => Curve::overshoot(*amount),
            CurveSpec::Easing { easing } => Curve::from_easing(*easing, EASING_BAKE_SAMPLES),
            CurveSpec::Keys { keys } => Curve::new(keys.iter().copied()),
        }
    }
}
