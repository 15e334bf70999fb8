//! Runner configuration.
//!
//! Loaded from a TOML file; missing or broken files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

use saga_gameplay::CombatTuning;

/// Configuration file name.
pub const CONFIG_FILE: &str = "saga.toml";

/// Which enemies the encounter starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Plain melee enemies
    pub melee: u32,
    /// Melee humanoids with attack animations
    pub humanoids: u32,
    /// Archers
    pub archers: u32,
    /// Assassins with charged shots
    pub assassins: u32,
    /// Guards that raise the alarm on sight
    pub guards: u32,
    /// Spawn the boss
    pub boss: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            melee: 2,
            humanoids: 1,
            archers: 2,
            assassins: 1,
            guards: 1,
            boss: true,
        }
    }
}

/// Headless runner parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Random seed
    pub seed: u64,
    /// Simulation ticks per second
    pub frame_rate: u32,
    /// Ticks to run before stopping
    pub max_ticks: u64,
    /// Tick at which enemies are paused, if any
    pub pause_at_tick: Option<u64>,
    /// How long the pause lasts, in ticks
    pub pause_ticks: u64,
    /// Log every event at debug level
    pub log_events: bool,
    /// Enemy roster
    pub roster: RosterConfig,
    /// Actor, projectile and shooter tuning
    pub combat: CombatTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5a6a,
            frame_rate: 60,
            max_ticks: 60 * 60,
            pause_at_tick: None,
            pause_ticks: 120,
            log_events: false,
            roster: RosterConfig::default(),
            combat: CombatTuning::default(),
        }
    }
}

impl SimConfig {
    /// Reads `path`, falling back to defaults when the file is missing or
    /// does not parse.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No runner config at {}, using defaults", path.display());
                return Self::default();
            },
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                return Self::default();
            },
        };
        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded runner config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Ignoring malformed {}: {e}", path.display());
                Self::default()
            },
        }
    }

    /// Clamp values to workable ranges.
    pub fn validate(&mut self) {
        self.frame_rate = self.frame_rate.clamp(10, 240);
        self.max_ticks = self.max_ticks.max(1);
    }

    /// Milliseconds per tick.
    #[must_use]
    pub fn tick_ms(&self) -> u64 {
        (1_000 / u64::from(self.frame_rate.max(1))).max(1)
    }

    /// True while the scheduled pause window covers `tick`.
    #[must_use]
    pub fn paused_at(&self, tick: u64) -> bool {
        self.pause_at_tick
            .is_some_and(|start| tick >= start && tick < start + self.pause_ticks)
    }
}
