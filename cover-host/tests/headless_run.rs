//! # 无头运行集成测试
//!
//! 测试 配置 → HeadlessRunner → Timeline 的完整链路。
//! 这些测试只使用模拟加载器，不依赖真实场景资源。

use std::fs;

use cover_host::{AppConfig, HeadlessRunner, HostError};
use cover_runtime::{
    ConfigError, EffectConfig, SceneInfo, SceneTarget, SlideSettings, TransitionEvent,
    TransitionPhase,
};
use glam::Vec3;

/// 事件名序列，便于比较顺序
fn event_names(report: &cover_host::RunReport) -> Vec<&'static str> {
    report
        .timeline
        .entries()
        .iter()
        .map(|entry| match entry.event {
            TransitionEvent::Started => "started",
            TransitionEvent::Activated(_) => "activated",
            TransitionEvent::Finished => "finished",
        })
        .collect()
}

/// 帧长可被二进制精确表示的配置
fn exact_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.simulation.fps = 16;
    config
}

/// 测试默认配置完整走完一次转场
#[test]
fn test_default_run_completes() {
    let mut runner = HeadlessRunner::new(exact_config()).unwrap();
    let report = runner.run(None).unwrap();

    assert_eq!(event_names(&report), ["started", "activated", "finished"]);
    assert_eq!(
        report.timeline.entries()[1].event,
        TransitionEvent::Activated(SceneInfo {
            index: 1,
            name: "stage".into()
        })
    );
    assert_eq!(report.timeline.entries()[0].frame, 0);
    assert!(report.frames > 0);
    assert_eq!(
        report.active_scene,
        Some(SceneInfo {
            index: 1,
            name: "stage".into()
        })
    );
    assert_eq!(runner.phase(), TransitionPhase::Idle);

    // Pop 显露态：缩放归零
    assert_eq!(report.element.scale, Vec3::ZERO);
}

/// 测试事件帧号单调不减
#[test]
fn test_timeline_is_ordered() {
    let mut runner = HeadlessRunner::new(AppConfig::default()).unwrap();
    let report = runner.run(Some(SceneTarget::Index(0))).unwrap();

    let frames: Vec<u64> = report.timeline.entries().iter().map(|e| e.frame).collect();
    assert!(frames.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(report.timeline.entries().last().unwrap().frame, report.frames);
}

/// 测试不配置效果时转场照常完成
#[test]
fn test_run_without_effect() {
    let config: AppConfig = serde_json::from_str(r#"{ "effect": null }"#).unwrap();
    let mut runner = HeadlessRunner::new(config).unwrap();
    assert!(!runner.set_effect_enabled(false));

    let report = runner.run(Some("stage".into())).unwrap();
    assert_eq!(event_names(&report), ["started", "activated", "finished"]);
    assert_eq!(report.element.scale, Vec3::ONE);
}

/// 测试未知目标：只有开始与结束
#[test]
fn test_unknown_target_finishes_without_activation() {
    let mut runner = HeadlessRunner::new(exact_config()).unwrap();
    let report = runner.run(Some("missing".into())).unwrap();

    assert_eq!(event_names(&report), ["started", "finished"]);
    assert_eq!(
        report.active_scene,
        Some(SceneInfo {
            index: 0,
            name: "title".into()
        })
    );
}

/// 测试加载过慢时超时
#[test]
fn test_slow_load_times_out() {
    let mut config = exact_config();
    config.simulation.load_seconds = 100.0;
    config.simulation.max_seconds = 1.0;

    let mut runner = HeadlessRunner::new(config).unwrap();
    let err = runner.run(None).unwrap_err();
    match err {
        HostError::Timeout { seconds, phase } => {
            assert_eq!(seconds, 1.0);
            assert_eq!(phase, "AwaitingLoad");
        }
        other => panic!("期望超时错误，实际为 {other:?}"),
    }
    assert_eq!(runner.phase(), TransitionPhase::Idle);
}

/// 测试时间缩放为 0 时非缩放时间轴上的转场仍能完成
#[test]
fn test_zero_time_scale_still_completes() {
    let mut config = exact_config();
    config.simulation.time_scale = 0.0;

    let mut runner = HeadlessRunner::new(config).unwrap();
    let report = runner.run(None).unwrap();
    assert!(report.timeline.is_finished());
    assert_eq!(event_names(&report).len(), 3);
}

/// 测试从初始场景切回首个场景
#[test]
fn test_initial_scene_and_target() {
    let mut config = exact_config();
    config.simulation.initial_scene = 1;
    config.simulation.target = SceneTarget::Name("title".into());

    let mut runner = HeadlessRunner::new(config).unwrap();
    let report = runner.run(None).unwrap();
    assert_eq!(report.active_scene.map(|scene| scene.index), Some(0));
}

/// 测试同一个运行器可以连续转场
#[test]
fn test_consecutive_runs() {
    let mut runner = HeadlessRunner::new(exact_config()).unwrap();
    let first = runner.run(Some("stage".into())).unwrap();
    let second = runner.run(Some("title".into())).unwrap();

    assert!(first.timeline.is_finished());
    assert!(second.timeline.is_finished());
    assert!(second.timeline.entries()[0].frame >= first.frames);
    assert_eq!(second.active_scene.map(|scene| scene.name), Some("title".into()));
}

/// 测试无效配置在组装时被拒绝
#[test]
fn test_invalid_config_rejected() {
    let mut config = AppConfig::default();
    config.effect = Some(EffectConfig::Slide(SlideSettings {
        duration: f32::NAN,
        ..SlideSettings::default()
    }));

    let err = HeadlessRunner::new(config).unwrap_err();
    assert!(matches!(
        err,
        HostError::Config(ConfigError::Invalid { ref field, .. }) if field == "effect.slide.duration"
    ));
}

/// 测试配置文件的保存与严格加载
#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cover.json");

    let mut config = exact_config();
    config.simulation.target = SceneTarget::Index(0);
    config.save(&path).unwrap();

    let loaded = AppConfig::from_file(&path).unwrap();
    assert_eq!(loaded.simulation, config.simulation);
    assert_eq!(loaded.effect, config.effect);

    let mut runner = HeadlessRunner::new(loaded).unwrap();
    assert!(runner.run(None).unwrap().timeline.is_finished());
}

/// 测试损坏或缺失的配置文件
#[test]
fn test_broken_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cover.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        AppConfig::from_file(&path),
        Err(ConfigError::Parse(_))
    ));
    // 宽松加载回退到默认配置
    assert_eq!(AppConfig::load(&path).simulation.fps, 60);
    assert_eq!(
        AppConfig::load(dir.path().join("absent.json")).simulation.fps,
        60
    );
}

/// 测试 JSON 时间线输出
#[test]
fn test_timeline_json() {
    let mut runner = HeadlessRunner::new(exact_config()).unwrap();
    let report = runner.run(None).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&report.timeline.to_json().unwrap()).unwrap();
    let events: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["event"].as_str().unwrap())
        .collect();
    assert_eq!(events, ["started", "activated", "finished"]);
    assert_eq!(value[1]["name"], "stage");
}
