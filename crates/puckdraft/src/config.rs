// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::draft::roster::RosterConfig;
use crate::draft::state::{DraftError, LeagueSettings};
use crate::valuation::cpu::CpuStrategy;
use crate::valuation::scoring::ScoringWeights;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub strategy: StrategyConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub season: String,
    pub num_teams: usize,
    /// The user's 1-based first-round slot.
    pub draft_position: usize,
    #[serde(default)]
    pub pick_timer_secs: u32,
    #[serde(default)]
    pub team_names: Vec<String>,
    /// Position key ("C", "LW", "BN", ...) to slot count.
    pub roster: HashMap<String, usize>,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    cpu: CpuStrategy,
    #[serde(default)]
    scoring: ScoringWeights,
    pool: PoolConfig,
    data_paths: DataPaths,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub cpu: CpuStrategy,
    pub scoring: ScoringWeights,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Cap on the draftable pool, best ADP first.
    pub max_players: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Player CSV path; `{season}` is replaced with `league.season`.
    pub players: String,
}

impl Config {
    /// League settings for the draft engine.
    pub fn league_settings(&self) -> Result<LeagueSettings, ConfigError> {
        let roster = RosterConfig::from_map(&self.league.roster).map_err(validation_error)?;
        Ok(LeagueSettings {
            num_teams: self.league.num_teams,
            user_position: self.league.draft_position,
            roster,
            pick_timer_secs: self.league.pick_timer_secs,
            team_names: self.league.team_names.clone(),
            strategy: self.strategy.cpu.clone(),
        })
    }
}

fn validation_error(err: DraftError) -> ConfigError {
    match err {
        DraftError::InvalidSettings { field, message } => ConfigError::ValidationError { field, message },
        other => ConfigError::ValidationError {
            field: "league".into(),
            message: other.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml` relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        strategy: StrategyConfig {
            cpu: strategy_file.cpu,
            scoring: strategy_file.scoring,
            pool: strategy_file.pool,
        },
        data_paths: strategy_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Files `load_config_from` expects under `config/`.
pub const CONFIG_FILES: [&str; 2] = ["league.toml", "strategy.toml"];

/// Seed `config/` with any of `CONFIG_FILES` it lacks, copied from
/// `defaults/`. Existing files are left alone. Returns the files written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ found in {}; run puckdraft from its crate directory",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if target.exists() || !source.is_file() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot copy {} to {}: {e}", source.display(), target.display()),
        })?;
        info!("Seeded {} from defaults", target.display());
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.season.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.season".into(),
            message: "must not be empty".into(),
        });
    }

    // Team count, draft slot, roster shape and CPU knobs.
    config
        .league_settings()?
        .validate()
        .map_err(validation_error)?;

    if config.strategy.pool.max_players == 0 {
        return Err(ConfigError::ValidationError {
            field: "pool.max_players".into(),
            message: "must be > 0".into(),
        });
    }

    if config.data_paths.players.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data_paths.players".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::Position;
    use std::fs;
    use std::path::PathBuf;

    /// Helper: returns the path to the crate root holding `defaults/`
    /// (works whether `cargo test` runs from the crate root or repo root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/puckdraft/defaults").exists() {
            cwd.join("crates/puckdraft")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Fresh temp dir with `config/` holding copies of both default files.
    fn temp_with_defaults(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        fs::copy(
            root.join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();
        tmp
    }

    fn expect_validation_field(tmp: &Path, expected: &str) {
        let err = load_config_from(tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    fn edit(tmp: &Path, file: &str, from: &str, to: &str) {
        let path = tmp.join("config").join(file);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(from), "{file} should contain {from:?}");
        fs::write(&path, text.replace(from, to)).unwrap();
    }

    #[test]
    fn load_default_config() {
        let tmp = temp_with_defaults("puckdraft_config_defaults");
        let config = load_config_from(&tmp).expect("should load default config");

        assert_eq!(config.league.name, "Puck Drop Mock League");
        assert_eq!(config.league.season, "2024-25");
        assert_eq!(config.league.num_teams, 10);
        assert_eq!(config.league.draft_position, 4);
        assert_eq!(config.league.pick_timer_secs, 60);
        assert_eq!(config.league.roster.get("D"), Some(&4));
        assert_eq!(config.league.roster.get("BN"), Some(&2));

        assert!((config.strategy.cpu.weights.adp - 0.50).abs() < f64::EPSILON);
        assert!((config.strategy.cpu.weights.randomness - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.strategy.cpu.goalie_delay_before_pick, 50);
        assert_eq!(config.strategy.cpu.premium_before_pick, 30);
        assert_eq!(config.strategy.cpu.cpu_delay_ms, 1500);
        assert!((config.strategy.scoring.goals - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.strategy.pool.max_players, 300);
        assert_eq!(config.data_paths.players, "data/players_{season}.csv");

        let settings = config.league_settings().unwrap();
        assert_eq!(settings.num_rounds(), 16);
        assert_eq!(settings.roster.capacity(Position::Forward), 1);
        assert_eq!(settings.user_position, 4);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn cpu_section_falls_back_to_defaults() {
        let tmp = temp_with_defaults("puckdraft_config_cpu_defaults");
        let path = tmp.join("config/strategy.toml");
        let text = fs::read_to_string(&path).unwrap();
        let trimmed = text
            .split("[scoring]")
            .nth(1)
            .map(|rest| format!("[scoring]{rest}"))
            .unwrap();
        fs::write(&path, trimmed).unwrap();

        let config = load_config_from(&tmp).expect("cpu section is optional");
        assert_eq!(config.strategy.cpu, CpuStrategy::default());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_single_team_league() {
        let tmp = temp_with_defaults("puckdraft_config_one_team");
        edit(&tmp, "league.toml", "num_teams = 10", "num_teams = 1");
        expect_validation_field(&tmp, "league.num_teams");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_draft_position_out_of_range() {
        let tmp = temp_with_defaults("puckdraft_config_bad_slot");
        edit(&tmp, "league.toml", "draft_position = 4", "draft_position = 11");
        expect_validation_field(&tmp, "league.draft_position");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_roster_position() {
        let tmp = temp_with_defaults("puckdraft_config_bad_roster");
        edit(&tmp, "league.toml", "BN = 2", "BN = 2\nSS = 1");
        expect_validation_field(&tmp, "roster.SS");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_oversized_roster_without_overflow() {
        let tmp = temp_with_defaults("puckdraft_config_huge_roster");
        let league_toml = r#"
[league]
name = "Test"
season = "2024-25"
num_teams = 4
draft_position = 1

[league.roster]
C = 9223372036854775807
D = 9223372036854775807
"#;
        fs::write(tmp.join("config/league.toml"), league_toml).unwrap();
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert!(field == "roster.C" || field == "roster.D", "field {field}");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_roster() {
        let tmp = temp_with_defaults("puckdraft_config_empty_roster");
        let league_toml = r#"
[league]
name = "Test"
season = "2024-25"
num_teams = 4
draft_position = 1

[league.roster]
C = 0
"#;
        fs::write(tmp.join("config/league.toml"), league_toml).unwrap();
        expect_validation_field(&tmp, "league.roster");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_negative_cpu_weight() {
        let tmp = temp_with_defaults("puckdraft_config_negative_weight");
        edit(&tmp, "strategy.toml", "need = 0.30", "need = -0.30");
        expect_validation_field(&tmp, "cpu.need");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_pool_size() {
        let tmp = temp_with_defaults("puckdraft_config_zero_pool");
        edit(&tmp, "strategy.toml", "max_players = 300", "max_players = 0");
        expect_validation_field(&tmp, "pool.max_players");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_league_toml() {
        let tmp = temp_with_defaults("puckdraft_config_missing_league");
        fs::remove_file(tmp.join("config/league.toml")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_with_defaults("puckdraft_config_invalid_toml");
        fs::write(tmp.join("config/strategy.toml"), "this is not valid [[[ toml").unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("strategy.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_existing() {
        let tmp = std::env::temp_dir().join("puckdraft_config_ensure");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), defaults_dir.join("league.toml")).unwrap();
        fs::copy(root.join("defaults/strategy.toml"), defaults_dir.join("strategy.toml")).unwrap();
        fs::write(defaults_dir.join("notes.txt"), "scratch\n").unwrap();
        fs::write(config_dir.join("league.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(copied[0].ends_with("strategy.toml"));
        assert_eq!(fs::read_to_string(config_dir.join("league.toml")).unwrap(), "# custom\n");
        assert!(!config_dir.join("notes.txt").exists());

        // A second run has nothing left to do.
        assert!(ensure_config_files(&tmp).unwrap().is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("puckdraft_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
