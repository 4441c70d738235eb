// Application state management

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::clock::SharedClock;
use crate::config::EngineConfig;
use crate::engine::{EngineSnapshot, VotingEngine};
use crate::ledger::Ledger;

pub type SharedState = Arc<Mutex<AppState>>;

pub type Engine = VotingEngine<Ledger, SharedClock>;

pub struct AppState {
    pub engine: Engine,
    pub clock: SharedClock,
    pub state_file: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedState {
    engine: EngineSnapshot,
    ledger: Ledger,
}

impl AppState {
    /// Fresh state, no persistence
    pub fn new(config: &EngineConfig, clock: SharedClock) -> Self {
        Self {
            engine: VotingEngine::new(
                config.admin_address.clone(),
                config.vault_address.clone(),
                config.stake_amount,
                Ledger::new(),
                clock.clone(),
            ),
            clock,
            state_file: None,
        }
    }

    /// State backed by `config.state_file`, loaded if present. An unreadable
    /// file is moved aside before starting fresh so a later save cannot
    /// overwrite it; if it cannot be moved, startup fails.
    pub fn with_persistence(config: &EngineConfig, clock: SharedClock) -> Result<Self, String> {
        let mut state = Self::new(config, clock);
        state.state_file = Some(config.state_file.clone());

        match state.load_from_disk() {
            Ok(true) => info!(file = %config.state_file, "loaded persisted state"),
            Ok(false) => info!("no persisted state found, starting fresh"),
            Err(e) => {
                let aside = format!("{}.corrupt-{}", config.state_file, chrono::Utc::now().timestamp());
                std::fs::rename(&config.state_file, &aside).map_err(|rename_err| {
                    format!(
                        "Unreadable state file {} ({}) could not be moved aside: {}",
                        config.state_file, e, rename_err
                    )
                })?;
                warn!(error = %e, moved_to = %aside, "unreadable persisted state moved aside, starting fresh");
            }
        }
        if state.engine.stake_amount() != config.stake_amount {
            warn!(
                persisted = state.engine.stake_amount(),
                configured = config.stake_amount,
                "persisted stake amount differs from configuration; keeping persisted value"
            );
        }
        Ok(state)
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn save_to_disk(&self) -> Result<(), String> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };

        let persisted = PersistedState {
            engine: self.engine.snapshot(),
            ledger: self.engine.store().clone(),
        };
        let json = serde_json::to_string_pretty(&persisted).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path, e))?;

        info!(file = %path, "state saved");
        Ok(())
    }

    /// Returns false when there is nothing to load
    pub fn load_from_disk(&mut self) -> Result<bool, String> {
        let Some(path) = &self.state_file else {
            return Ok(false);
        };
        if !std::path::Path::new(path).exists() {
            return Ok(false);
        }

        let json = std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        let persisted: PersistedState = serde_json::from_str(&json).map_err(|e| e.to_string())?;
        self.engine = VotingEngine::from_snapshot(persisted.engine, persisted.ledger, self.clock.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ledger::AccountStore;

    fn config_in_temp(name: &str) -> (EngineConfig, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("stakevote-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = EngineConfig {
            state_file: dir.join("state.json").to_string_lossy().into_owned(),
            ..EngineConfig::default()
        };
        (config, dir)
    }

    fn clock() -> SharedClock {
        Arc::new(ManualClock::new(1_000))
    }

    #[test]
    fn test_unreadable_state_file_is_moved_aside() {
        let (config, dir) = config_in_temp("corrupt");
        std::fs::write(&config.state_file, "{ not json").unwrap();

        let state = AppState::with_persistence(&config, clock()).unwrap();
        assert!(state.engine.list_questions().is_empty());
        assert!(!std::path::Path::new(&config.state_file).exists());

        let moved: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(std::fs::read_to_string(moved[0].path()).unwrap(), "{ not json");

        // Saving now cannot clobber the moved file
        state.save_to_disk().unwrap();
        assert_eq!(std::fs::read_to_string(moved[0].path()).unwrap(), "{ not json");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_then_reload_round_trips_engine_and_ledger() {
        let (config, dir) = config_in_temp("reload");
        let mut state = AppState::with_persistence(&config, clock()).unwrap();
        state.engine.store_mut().fund("0xA", 500).unwrap();
        state.engine.create_question(&config.admin_address, "?", 2_000, 3_000).unwrap();
        state.save_to_disk().unwrap();

        let reloaded = AppState::with_persistence(&config, clock()).unwrap();
        assert_eq!(reloaded.engine.list_questions().len(), 1);
        assert_eq!(reloaded.engine.store().balance("0xA"), 500);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
