mod common;

use std::time::Duration;

use lumen_ngin::{config::EngineConfig, flow::Engine};

use crate::common::test_utils::{CountingGame, ScriptedWindow, call_log};

fn engine() -> Engine<ScriptedWindow, CountingGame> {
    let log = call_log();
    Engine::new(
        &EngineConfig::default(),
        ScriptedWindow::new(log.clone()),
        CountingGame::new(log),
    )
}

#[test]
fn fps_is_published_in_the_title_once_a_second() {
    let mut engine = engine();
    engine.init().unwrap();
    // 60 Hz frames against a 120 Hz tick.
    for _ in 0..61 {
        engine.step(Duration::from_micros(16_600)).unwrap();
    }
    assert_eq!(engine.fps(), 60);
    assert_eq!(engine.window().title, "ENGINE FPS: 60");
    assert_eq!(engine.game().renders, 61);
    assert_eq!(engine.window().updates, 61);
}

#[test]
fn a_long_frame_runs_a_single_update() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.step(Duration::from_millis(500)).unwrap();
    assert_eq!(engine.game().inputs, 1);
    assert_eq!(engine.game().updates, 1);
    assert_eq!(engine.game().renders, 1);
    assert!((engine.game().last_interval - 1.0 / 120.0).abs() < 1e-6);
}

#[test]
fn a_short_frame_only_polls_input() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.step(Duration::from_millis(5)).unwrap();
    engine.step(Duration::ZERO).unwrap();
    assert_eq!(engine.game().inputs, 2);
    assert_eq!(engine.game().updates, 0);
    assert_eq!(engine.game().renders, 0);

    // The leftover time carries over into the next frame.
    engine.step(Duration::from_millis(4)).unwrap();
    assert_eq!(engine.game().updates, 1);
}

#[test]
fn closing_the_window_stops_the_loop_and_cleans_up_in_order() {
    let log = call_log();
    let mut engine = Engine::new(
        &EngineConfig::default(),
        ScriptedWindow::closing_after(log.clone(), 3),
        CountingGame::new(log.clone()),
    );
    engine.start().unwrap();

    assert!(!engine.is_running());
    assert_eq!(engine.game().inits, 1);
    assert!(engine.game().renders >= 3);
    assert_eq!(
        *log.borrow(),
        vec!["window.init", "game.init", "window.cleanup", "game.cleanup"]
    );
}

#[test]
fn failed_initialisation_still_cleans_up() {
    let log = call_log();
    let mut window = ScriptedWindow::new(log.clone());
    window.fail_init = true;
    let mut engine = Engine::new(&EngineConfig::default(), window, CountingGame::new(log.clone()));

    assert!(engine.start().is_err());
    assert_eq!(engine.game().inits, 0);
    assert_eq!(
        *log.borrow(),
        vec!["window.init", "window.cleanup", "game.cleanup"]
    );
}

#[test]
fn tick_rate_follows_the_config() {
    let log = call_log();
    let mut engine = Engine::new(
        &EngineConfig::default().with_tick_rate(10.0),
        ScriptedWindow::new(log.clone()),
        CountingGame::new(log),
    );
    engine.init().unwrap();
    engine.step(Duration::from_millis(90)).unwrap();
    assert_eq!(engine.game().updates, 0);
    engine.step(Duration::from_millis(20)).unwrap();
    assert_eq!(engine.game().updates, 1);
    assert!((engine.game().last_interval - 0.1).abs() < 1e-6);
}
