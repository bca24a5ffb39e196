// Application state and orchestration logic.
//
// The central event loop that turns user commands, the one-second pick clock
// and deferred CPU selections into draft actions, and pushes a fresh
// snapshot to the presentation layer after each change.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::draft::pick::DraftPlayer;
use crate::draft::state::{DraftAction, DraftState};
use crate::protocol::{DraftSnapshot, UiUpdate, UserCommand};
use crate::valuation::recommend::Recommendation;

/// Pick clock resolution.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// A CPU selection waiting for its delay to elapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCpuPick {
    pub pick_index: usize,
    pub deadline: Instant,
}

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub draft: DraftState,
    /// Draftable pool used for every (re)initialization.
    pub pool: Vec<DraftPlayer>,
    pub pending_cpu: Option<PendingCpuPick>,
    /// Suggestions for the slot at the given pick index. Rolled once per
    /// pick so clock-only snapshots show the same list.
    recommendations: Option<(usize, Vec<Recommendation>)>,
    rng: StdRng,
}

impl AppState {
    pub fn new(config: Config, pool: Vec<DraftPlayer>) -> Self {
        Self::with_rng(config, pool, StdRng::from_os_rng())
    }

    /// Build with a caller-supplied RNG, for reproducible drafts.
    pub fn with_rng(config: Config, pool: Vec<DraftPlayer>, rng: StdRng) -> Self {
        AppState {
            config,
            draft: DraftState::new(),
            pool,
            pending_cpu: None,
            recommendations: None,
            rng,
        }
    }

    /// Set up the league from config and the loaded pool.
    pub fn initialize_league(&mut self) -> anyhow::Result<()> {
        let settings = self.config.league_settings()?;
        let action = DraftAction::Initialize {
            settings,
            players: self.pool.clone(),
        };
        let result = self.draft.apply(action, &mut self.rng);
        self.recommendations = None;
        self.schedule_cpu_pick();
        result?;
        Ok(())
    }

    /// Apply an action and reschedule any CPU pick. Returns whether the
    /// draft changed.
    pub fn dispatch(&mut self, action: DraftAction) -> bool {
        if matches!(action, DraftAction::Reset) {
            self.recommendations = None;
        }
        let changed = match self.draft.apply(action, &mut self.rng) {
            Ok(changed) => changed,
            Err(e) => {
                warn!("Draft action rejected: {}", e);
                false
            }
        };
        self.schedule_cpu_pick();
        changed
    }

    /// Keep `pending_cpu` in step with the slot on the clock.
    ///
    /// An existing deadline is kept while it still targets the current slot.
    fn schedule_cpu_pick(&mut self) {
        match self.draft.pending_cpu_slot() {
            Some(idx) if self.pending_cpu.is_some_and(|p| p.pick_index == idx) => {}
            Some(idx) => {
                let delay = self
                    .draft
                    .settings
                    .as_ref()
                    .map_or(0, |s| s.strategy.cpu_delay_ms);
                debug!("Scheduling CPU pick for slot {} in {}ms", idx, delay);
                self.pending_cpu = Some(PendingCpuPick {
                    pick_index: idx,
                    deadline: Instant::now() + Duration::from_millis(delay),
                });
            }
            None => self.pending_cpu = None,
        }
    }

    /// Resolve the pending CPU pick, if any.
    pub fn run_cpu_pick(&mut self) -> bool {
        match self.pending_cpu.take() {
            Some(pending) => self.dispatch(DraftAction::CpuPick {
                pick_index: pending.pick_index,
            }),
            None => false,
        }
    }

    /// Suggestions for the slot on the clock, computed once per pick.
    pub fn current_recommendations(&mut self) -> Vec<Recommendation> {
        let index = self.draft.current_pick_index;
        match &self.recommendations {
            Some((cached, recs)) if *cached == index => recs.clone(),
            _ => {
                let recs = self.draft.recommendations(&mut self.rng);
                // Nothing is offered off the user's turn; leave the slot open.
                self.recommendations = (!recs.is_empty()).then(|| (index, recs.clone()));
                recs
            }
        }
    }

    pub fn build_snapshot(&mut self) -> DraftSnapshot {
        let recommendations = self.current_recommendations();
        DraftSnapshot::build(&self.draft, &self.config.strategy.scoring, recommendations)
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens with `tokio::select!` on:
/// 1. User commands from the presentation layer
/// 2. The one-second pick clock
/// 3. The deadline of a pending CPU pick
///
/// Exits on `UserCommand::Quit` or when the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let mut clock = tokio::time::interval(TICK_INTERVAL);
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so the first
    // countdown happens after one full interval.
    clock.tick().await;

    send_snapshot(&mut state, &ui_tx).await;

    loop {
        let cpu_deadline = state.pending_cpu.map(|p| p.deadline);

        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Pick clock ---
            _ = clock.tick() => {
                if state.dispatch(DraftAction::Tick) {
                    send_snapshot(&mut state, &ui_tx).await;
                }
            }

            // --- Deferred CPU selection ---
            _ = tokio::time::sleep_until(cpu_deadline.unwrap_or_else(Instant::now)), if cpu_deadline.is_some() => {
                if state.run_cpu_pick() {
                    send_snapshot(&mut state, &ui_tx).await;
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

async fn notice(ui_tx: &mpsc::Sender<UiUpdate>, msg: impl Into<String>) {
    let _ = ui_tx.send(UiUpdate::Notice(msg.into())).await;
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::InitializeLeague => match state.initialize_league() {
            Ok(()) => {
                notice(ui_tx, "League initialized").await;
                send_snapshot(state, ui_tx).await;
            }
            Err(e) => {
                warn!("League initialization failed: {:#}", e);
                notice(ui_tx, format!("Could not initialize league: {e:#}")).await;
            }
        },
        UserCommand::StartDraft => {
            if state.dispatch(DraftAction::StartDraft) {
                send_snapshot(state, ui_tx).await;
            } else if state.draft.settings.is_none() {
                notice(ui_tx, "No league loaded; run `init` first").await;
            } else {
                notice(ui_tx, "Draft already started").await;
            }
        }
        UserCommand::MakePick { player_id } => {
            info!("User pick requested: {}", player_id);
            if state.dispatch(DraftAction::MakePick {
                player_id: player_id.clone(),
            }) {
                send_snapshot(state, ui_tx).await;
            } else {
                notice(ui_tx, format!("Pick of `{player_id}` ignored: not available or no open roster slot")).await;
            }
        }
        UserCommand::ChangeTab(tab) => {
            if state.dispatch(DraftAction::ChangeTab(tab)) {
                info!("Switched to tab: {:?}", tab);
                send_snapshot(state, ui_tx).await;
            }
        }
        UserCommand::ResetDraft => {
            state.dispatch(DraftAction::Reset);
            notice(ui_tx, "Draft reset").await;
            send_snapshot(state, ui_tx).await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}
