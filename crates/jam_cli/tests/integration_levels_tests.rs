use std::path::{Path, PathBuf};

use jam_cli::play::{autoplay, replay, Autoplay};
use jam_cli::script::load_script;
use jam_core::clock::SimulationClock;
use jam_core::level::{LevelDefinition, LevelOutcome, SessionConfig};
use jam_core::LevelSession;

fn levels_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../levels")
}

fn bundled_levels() -> Vec<PathBuf> {
    let mut levels: Vec<PathBuf> = std::fs::read_dir(levels_dir())
        .expect("levels dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    levels.sort();
    levels
}

#[test]
fn bundled_levels_load_without_warnings() {
    let levels = bundled_levels();
    assert!(!levels.is_empty());
    let config = SessionConfig::default();
    for path in levels {
        let level = LevelDefinition::load(&path).expect("level parses");
        assert_eq!(
            level.lint(config.bus_capacity),
            vec![],
            "{} has warnings",
            path.display()
        );
        LevelSession::new(level, config.clone()).expect("level builds");
    }
}

#[test]
fn bundled_config_loads() {
    let config = SessionConfig::load(levels_dir().join("configs/fast.json")).expect("config");
    assert_eq!(config.bus_shift_ms, 250);
    assert_eq!(config.lookahead, SessionConfig::default().lookahead);
}

#[test]
fn greedy_autoplay_wins_first_steps() {
    let level = LevelDefinition::load(levels_dir().join("first_steps.json")).expect("level");
    let mut session = LevelSession::new(level, SessionConfig::default()).expect("session");

    autoplay(&mut session, Autoplay::Greedy);

    assert_eq!(session.outcome(), LevelOutcome::Won);
    assert_eq!(session.telemetry().passengers_boarded, 6);
}

#[test]
fn first_steps_script_replays() {
    let level = LevelDefinition::load(levels_dir().join("first_steps.json")).expect("level");
    let clicks = load_script(levels_dir().join("scripts/first_steps.json")).expect("script");
    let mut session = LevelSession::new(level, SessionConfig::default()).expect("session");

    let events = replay(&mut session, &clicks);

    assert!(events > 0);
    assert!(session.telemetry().clicks_accepted >= 2);
    assert!(session.world().resource::<SimulationClock>().is_empty());
}
