//! # Config 模块
//!
//! 效果与转场的可序列化配置。
//!
//! ```json
//! {
//!   "kind": "pop",
//!   "duration": 0.35,
//!   "curve": { "type": "overshoot", "amount": 0.15 }
//! }
//! ```
//!
//! 无效数值不是致命错误：`sanitized` 把负数时长、速度等夹到 0（视为关闭该特性）
//! 并记录警告；`validate` 把同样的问题作为错误报告给工具链。

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::curve::CurveSpec;
use crate::effects::{
    CoverEffect, PopEffect, PopSettings, PulseEffect, PulseSettings, SlideEffect, SlideSettings,
    SpinEffect, SpinSettings, WiggleEffect, WiggleSettings,
};
use crate::error::{ConfigError, ConfigResult};
use crate::orchestrator::TransitionSettings;
use crate::transform::SharedTransform;

/// 效果配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectConfig {
    /// 旋转
    Spin(SpinSettings),
    /// 缩放弹出
    Pop(PopSettings),
    /// 滑动
    Slide(SlideSettings),
    /// 脉冲
    Pulse(PulseSettings),
    /// 抖动
    Wiggle(WiggleSettings),
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig::Pop(PopSettings::default())
    }
}

impl EffectConfig {
    /// 效果名称
    pub fn kind(&self) -> &'static str {
        match self {
            EffectConfig::Spin(_) => "spin",
            EffectConfig::Pop(_) => "pop",
            EffectConfig::Slide(_) => "slide",
            EffectConfig::Pulse(_) => "pulse",
            EffectConfig::Wiggle(_) => "wiggle",
        }
    }

    /// 在目标元素上构造效果
    ///
    /// 效果会立即从 `target` 捕获设计值。
    pub fn build(&self, target: SharedTransform) -> CoverEffect {
        match self.clone().sanitized() {
            EffectConfig::Spin(s) => SpinEffect::new(target, s).into(),
            EffectConfig::Pop(s) => PopEffect::new(target, s).into(),
            EffectConfig::Slide(s) => SlideEffect::new(target, s).into(),
            EffectConfig::Pulse(s) => PulseEffect::new(target, s).into(),
            EffectConfig::Wiggle(s) => WiggleEffect::new(target, s).into(),
        }
    }

    /// 检查数值，报告第一个无效字段
    pub fn validate(&self) -> ConfigResult<()> {
        let kind = self.kind();
        let field = |name: &str| format!("effect.{kind}.{name}");

        match self {
            EffectConfig::Spin(s) => {
                non_negative(&field("duration"), s.duration)?;
                finite(&field("degrees"), s.degrees)?;
                finite(&field("reveal_degrees"), s.reveal_degrees)?;
                curve(&field("curve"), &s.curve)
            }
            EffectConfig::Pop(s) => {
                non_negative(&field("duration"), s.duration)?;
                curve(&field("curve"), &s.curve)
            }
            EffectConfig::Slide(s) => {
                non_negative(&field("duration"), s.duration)?;
                non_negative(&field("distance"), s.distance)?;
                curve(&field("curve"), &s.curve)
            }
            EffectConfig::Pulse(s) => {
                non_negative(&field("intensity"), s.intensity)?;
                non_negative(&field("frequency"), s.frequency)?;
                non_negative(&field("in_duration"), s.in_duration)?;
                non_negative(&field("out_duration"), s.out_duration)
            }
            EffectConfig::Wiggle(s) => {
                non_negative(&field("position_intensity"), s.position_intensity)?;
                non_negative(&field("rotation_intensity"), s.rotation_intensity)?;
                non_negative(&field("speed"), s.speed)?;
                non_negative(&field("in_duration"), s.in_duration)?;
                non_negative(&field("out_duration"), s.out_duration)
            }
        }
    }

    /// 把无效数值修正为"关闭"，每处修正记录一条警告
    pub fn sanitized(mut self) -> Self {
        let kind = self.kind();
        let field = |name: &str| format!("effect.{kind}.{name}");

        match &mut self {
            EffectConfig::Spin(s) => {
                clamp_non_negative(&field("duration"), &mut s.duration);
                zero_if_not_finite(&field("degrees"), &mut s.degrees);
                zero_if_not_finite(&field("reveal_degrees"), &mut s.reveal_degrees);
                default_if_empty(&field("curve"), &mut s.curve);
            }
            EffectConfig::Pop(s) => {
                clamp_non_negative(&field("duration"), &mut s.duration);
                default_if_empty(&field("curve"), &mut s.curve);
            }
            EffectConfig::Slide(s) => {
                clamp_non_negative(&field("duration"), &mut s.duration);
                clamp_non_negative(&field("distance"), &mut s.distance);
                default_if_empty(&field("curve"), &mut s.curve);
            }
            EffectConfig::Pulse(s) => {
                clamp_non_negative(&field("intensity"), &mut s.intensity);
                clamp_non_negative(&field("frequency"), &mut s.frequency);
                clamp_non_negative(&field("in_duration"), &mut s.in_duration);
                clamp_non_negative(&field("out_duration"), &mut s.out_duration);
            }
            EffectConfig::Wiggle(s) => {
                clamp_non_negative(&field("position_intensity"), &mut s.position_intensity);
                clamp_non_negative(&field("rotation_intensity"), &mut s.rotation_intensity);
                clamp_non_negative(&field("speed"), &mut s.speed);
                clamp_non_negative(&field("in_duration"), &mut s.in_duration);
                clamp_non_negative(&field("out_duration"), &mut s.out_duration);
            }
        }
        self
    }
}

impl TransitionSettings {
    /// 检查等待时间
    pub fn validate(&self) -> ConfigResult<()> {
        let timing = &self.timing;
        if let Some(seconds) = timing.cover_in_wait_override {
            non_negative("transition.timing.cover_in_wait_override", seconds)?;
        }
        if let Some(seconds) = timing.cover_out_wait_override {
            non_negative("transition.timing.cover_out_wait_override", seconds)?;
        }
        non_negative("transition.timing.pre_load_delay", timing.pre_load_delay)?;
        non_negative(
            "transition.timing.post_activation_delay",
            timing.post_activation_delay,
        )
    }

    /// 把负数等待夹到 0
    pub fn sanitized(mut self) -> Self {
        let timing = &mut self.timing;
        if let Some(seconds) = timing.cover_in_wait_override.as_mut() {
            clamp_non_negative("transition.timing.cover_in_wait_override", seconds);
        }
        if let Some(seconds) = timing.cover_out_wait_override.as_mut() {
            clamp_non_negative("transition.timing.cover_out_wait_override", seconds);
        }
        clamp_non_negative("transition.timing.pre_load_delay", &mut timing.pre_load_delay);
        clamp_non_negative(
            "transition.timing.post_activation_delay",
            &mut timing.post_activation_delay,
        );
        self
    }
}

// ========== 检查辅助 ==========

fn finite(field: &str, value: f32) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("必须是有限数值，实际为 {value}")))
    }
}

fn non_negative(field: &str, value: f32) -> ConfigResult<()> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(field, format!("不能为负数，实际为 {value}")));
    }
    Ok(())
}

fn curve(field: &str, spec: &CurveSpec) -> ConfigResult<()> {
    if spec.build().is_empty() {
        return Err(ConfigError::invalid(field, "没有有效的关键帧"));
    }
    Ok(())
}

fn clamp_non_negative(field: &str, value: &mut f32) {
    if !value.is_finite() || *value < 0.0 {
        warn!(field, value = *value, "无效数值，按 0 处理");
        *value = 0.0;
    }
}

fn zero_if_not_finite(field: &str, value: &mut f32) {
    if !value.is_finite() {
        warn!(field, value = *value, "非有限数值，按 0 处理");
        *value = 0.0;
    }
}

fn default_if_empty(field: &str, spec: &mut CurveSpec) {
    if spec.build().is_empty() {
        warn!(field, "曲线没有有效的关键帧，使用默认曲线");
        *spec = CurveSpec::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{SlideDirection, TransitionEffect};
    use crate::transform::{Transform, TransformTarget};
    use glam::{Vec2, Vec3};

    #[test]
    fn test_parse_tagged_effects() {
        let json = r#"[
            { "kind": "spin", "axis": "y", "degrees": 180 },
            { "kind": "pop", "duration": 0.5, "curve": { "type": "overshoot", "amount": 0.3 } },
            { "kind": "slide", "direction": "up", "distance": 300 },
            { "kind": "pulse", "intensity": 0.1, "seed": 4 },
            { "kind": "wiggle", "speed": 5, "rotation_intensity": 3 }
        ]"#;
        let configs: Vec<EffectConfig> = serde_json::from_str(json).unwrap();

        let kinds: Vec<_> = configs.iter().map(EffectConfig::kind).collect();
        assert_eq!(kinds, vec!["spin", "pop", "slide", "pulse", "wiggle"]);

        match &configs[2] {
            EffectConfig::Slide(s) => {
                assert_eq!(s.direction, SlideDirection::Up);
                assert_eq!(s.distance, 300.0);
                // 未给出的字段使用默认值
                assert_eq!(s.duration, SlideSettings::default().duration);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &configs[1] {
            EffectConfig::Pop(s) => assert_eq!(s.curve, CurveSpec::Overshoot { amount: 0.3 }),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let result: Result<EffectConfig, _> = serde_json::from_str(r#"{ "kind": "explode" }"#);
        let err: ConfigError = result.unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_reports_field() {
        let config = EffectConfig::Slide(SlideSettings {
            duration: -1.0,
            ..SlideSettings::default()
        });
        let err = config.validate().unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "effect.slide.duration"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(EffectConfig::default().validate().is_ok());
        let nan = EffectConfig::Spin(SpinSettings {
            degrees: f32::NAN,
            ..SpinSettings::default()
        });
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_empty_curve_is_invalid_and_sanitized() {
        let config = EffectConfig::Pop(PopSettings {
            curve: CurveSpec::Keys { keys: Vec::new() },
            ..PopSettings::default()
        });
        assert!(config.validate().is_err());

        match config.sanitized() {
            EffectConfig::Pop(s) => assert_eq!(s.curve, CurveSpec::default()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sanitized_clamps_to_disabled() {
        let config = EffectConfig::Wiggle(WiggleSettings {
            speed: -2.0,
            position_intensity: f32::INFINITY,
            ..WiggleSettings::default()
        })
        .sanitized();

        match &config {
            EffectConfig::Wiggle(s) => {
                assert_eq!(s.speed, 0.0);
                assert_eq!(s.position_intensity, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_captures_designed_values() {
        let target = SharedTransform::new(Transform::with_position(4.0, 5.0));
        let config = EffectConfig::Slide(SlideSettings {
            direction: SlideDirection::Right,
            distance: 10.0,
            ..SlideSettings::default()
        });
        let mut effect = config.build(target.clone());
        assert_eq!(effect.kind(), "slide");

        effect.snap_revealed();
        assert_eq!(target.position(), Vec2::new(14.0, 5.0));
        effect.snap_covered();
        assert_eq!(target.position(), Vec2::new(4.0, 5.0));
    }

    #[test]
    fn test_build_negative_duration_snaps() {
        let target = SharedTransform::new(Transform::with_uniform_scale(2.0));
        let config = EffectConfig::Pop(PopSettings {
            duration: -0.5,
            ..PopSettings::default()
        });
        let effect = config.build(target.clone());
        assert_eq!(effect.in_duration(), 0.0);
        assert_eq!(target.transform().scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_transition_settings_validation() {
        let mut settings = TransitionSettings::default();
        assert!(settings.validate().is_ok());

        settings.timing.pre_load_delay = -0.2;
        settings.timing.cover_out_wait_override = Some(-1.0);
        assert!(settings.validate().is_err());

        let fixed = settings.sanitized();
        assert_eq!(fixed.timing.pre_load_delay, 0.0);
        assert_eq!(fixed.timing.cover_out_wait_override, Some(0.0));
        assert!(fixed.validate().is_ok());
    }

    #[test]
    fn test_transition_settings_defaults_from_partial_json() {
        let settings: TransitionSettings =
            serde_json::from_str(r#"{ "timing": { "post_activation_delay": 0.5 } }"#).unwrap();
        assert!(settings.reveal_on_load);
        assert_eq!(settings.timing.post_activation_delay, 0.5);
        assert_eq!(settings.timing.cover_in_wait_override, None);
    }
}
