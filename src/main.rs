//! Alien Waves entry point
//!
//! Headless native driver: runs a full session on a simulated 60 Hz clock
//! with an auto-aim player, logging wave progress.
//!
//! Usage: `alien-waves [settings.json|-] [relaxed|normal|frantic] [--seed N]`

use std::path::PathBuf;

use alien_waves::sim::{Action, GameEvent, GameMode, GameSession, TickInput, tick};
use alien_waves::{Difficulty, Settings};
use clap::{Parser, ValueEnum};

/// Simulated frame length (~60 Hz)
const FRAME_MS: u64 = 16;
/// Frames the demo player waits between shots
const SHOT_COOLDOWN_FRAMES: u32 = 9;
/// Give up after this much simulated time
const MAX_RUN_MS: u64 = 30 * 60 * 1000;

/// Simple auto-aim player, like an idle/demo mode
struct DemoPlayer {
    cooldown: u32,
}

impl DemoPlayer {
    fn new() -> Self {
        Self { cooldown: 0 }
    }

    /// Decide this frame's input from what the session exposes
    fn input(&mut self, session: &GameSession, now: u64) -> TickInput {
        let mut input = TickInput::default();

        match session.mode() {
            GameMode::Menu => input.actions.push(Action::Start),
            GameMode::Playing if session.hud(now).awaiting_continue => {
                input.actions.push(Action::ContinueWave);
            }
            GameMode::Playing => {
                // Aim at the oldest target that is still alive
                let aim = session
                    .wave()
                    .targets()
                    .iter()
                    .find(|t| t.is_alive())
                    .map(|t| t.pos + glam::Vec2::splat(t.footprint() / 2.0));

                if let Some(point) = aim {
                    input.pointer = Some(point);
                    if self.cooldown == 0 {
                        input.fire.push(point);
                        self.cooldown = SHOT_COOLDOWN_FRAMES;
                    }
                }
                self.cooldown = self.cooldown.saturating_sub(1);
            }
            _ => {}
        }

        input
    }
}

#[derive(Parser, Debug)]
#[command(name = "alien-waves")]
#[command(about = "Play a headless Alien Waves session with an auto-aim player")]
struct Cli {
    /// Settings JSON file; `-` or nothing uses the defaults
    settings: Option<PathBuf>,
    /// Difficulty preset applied on top of the settings
    #[arg(value_enum)]
    difficulty: Option<DifficultyArg>,
    /// Override the run seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    #[value(alias = "easy")]
    Relaxed,
    Normal,
    #[value(alias = "hard")]
    Frantic,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Relaxed => Difficulty::Relaxed,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Frantic => Difficulty::Frantic,
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, alien_waves::ConfigError> {
    let mut settings = match &cli.settings {
        Some(path) if path.as_os_str() != "-" => Settings::load(path)?,
        _ => Settings::default(),
    };
    if let Some(difficulty) = cli.difficulty {
        settings.apply_difficulty(difficulty.into());
        log::info!("Difficulty: {}", settings.difficulty.as_str());
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    settings.validate()?;
    Ok(settings)
}

fn main() {
    let cli = Cli::parse();
    env_logger::init();
    log::info!("Alien Waves (headless) starting...");

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let mut now = 0;
    let mut session = match GameSession::new(&settings, now) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let mut player = DemoPlayer::new();
    let mut shots = 0u32;
    let mut hits = 0u32;

    while now < MAX_RUN_MS {
        let input = player.input(&session, now);
        for event in tick(&mut session, &input, now) {
            match event {
                GameEvent::Shot { hit, .. } => {
                    shots += 1;
                    hits += u32::from(hit.is_some());
                }
                GameEvent::WaveSucceeded { wave } => {
                    let hud = session.hud(now);
                    println!(
                        "Wave {:>2}/{} cleared with {:.1}s to spare",
                        wave,
                        hud.total_waves,
                        hud.time_remaining_ms as f32 / 1000.0
                    );
                }
                _ => {}
            }
        }

        if matches!(session.mode(), GameMode::Over | GameMode::Victory) {
            break;
        }
        now += FRAME_MS;
    }

    let hud = session.hud(now);
    println!(
        "\n{:?} at wave {}/{} after {:.1}s ({} shots, {} hits)",
        session.mode(),
        hud.wave_number,
        hud.total_waves,
        now as f32 / 1000.0,
        shots,
        hits
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_applies_difficulty_and_seed() {
        let cli = Cli::try_parse_from(["alien-waves", "-", "hard", "--seed", "7"])
            .expect("valid arguments");
        let settings = load_settings(&cli).expect("valid settings");
        assert_eq!(settings.difficulty, Difficulty::Frantic);
        assert_eq!(settings.waves.max_budget_ms, 48_000);
        assert_eq!(settings.seed, 7);
    }

    #[test]
    fn test_cli_defaults_without_arguments() {
        let cli = Cli::try_parse_from(["alien-waves"]).expect("valid arguments");
        let settings = load_settings(&cli).expect("valid settings");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_cli_rejects_unknown_difficulty() {
        assert!(Cli::try_parse_from(["alien-waves", "-", "nightmare"]).is_err());
    }
}
