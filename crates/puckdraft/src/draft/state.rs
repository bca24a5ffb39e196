// Draft state: league settings, player pools, pick order, team rosters, and
// the transitions that advance a snake draft one pick at a time.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::order::generate_snake_order;
use super::pick::{parse_positions, DraftPick, DraftPlayer};
use super::roster::{RosterConfig, TeamRoster};
use crate::valuation::cpu::{auto_pick_choice, select_best, CpuStrategy};
use crate::valuation::recommend::{recommend, Recommendation};

/// Upper bound on roster size (and therefore rounds).
pub const MAX_ROUNDS: usize = 40;

/// Upper bound on league size.
pub const MAX_TEAMS: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("invalid setting `{field}`: {message}")]
    InvalidSettings { field: String, message: String },

    #[error("not enough draftable players: {available} available, {required} required")]
    InsufficientPlayers { available: usize, required: usize },
}

fn invalid(field: &str, message: impl Into<String>) -> DraftError {
    DraftError::InvalidSettings {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything needed to set up a league before the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub num_teams: usize,
    /// The user's 1-based slot in the first round.
    pub user_position: usize,
    pub roster: RosterConfig,
    /// Seconds the user gets per pick. Zero disables the timer.
    pub pick_timer_secs: u32,
    /// Optional display names, indexed by team. Missing entries are generated.
    #[serde(default)]
    pub team_names: Vec<String>,
    #[serde(default)]
    pub strategy: CpuStrategy,
}

impl LeagueSettings {
    /// Rounds in the draft: one per roster slot.
    pub fn num_rounds(&self) -> usize {
        self.roster.total()
    }

    pub fn total_picks(&self) -> usize {
        self.num_teams * self.num_rounds()
    }

    fn team_name(&self, team_idx: usize) -> String {
        match self.team_names.get(team_idx) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ if team_idx + 1 == self.user_position => "My Team".to_string(),
            _ => format!("Team {}", team_idx + 1),
        }
    }

    /// Reject settings the draft cannot run with.
    pub fn validate(&self) -> Result<(), DraftError> {
        if !(2..=MAX_TEAMS).contains(&self.num_teams) {
            return Err(invalid(
                "league.num_teams",
                format!("must be between 2 and {MAX_TEAMS}, got {}", self.num_teams),
            ));
        }

        if self.user_position == 0 || self.user_position > self.num_teams {
            return Err(invalid(
                "league.draft_position",
                format!(
                    "must be between 1 and {}, got {}",
                    self.num_teams, self.user_position
                ),
            ));
        }

        let rounds = self.num_rounds();
        if rounds == 0 {
            return Err(invalid("league.roster", "must have at least one slot"));
        }
        if rounds > MAX_ROUNDS {
            return Err(invalid(
                "league.roster",
                format!("at most {MAX_ROUNDS} slots allowed, got {rounds}"),
            ));
        }

        let w = &self.strategy.weights;
        let weight_fields: &[(&str, f64)] = &[
            ("cpu.adp", w.adp),
            ("cpu.need", w.need),
            ("cpu.value", w.value),
            ("cpu.randomness", w.randomness),
        ];
        for (name, val) in weight_fields {
            if !val.is_finite() || *val < 0.0 {
                return Err(invalid(name, format!("must be >= 0, got {val}")));
            }
        }
        if weight_fields.iter().all(|(_, val)| *val == 0.0) {
            return Err(invalid("cpu", "at least one weight must be > 0"));
        }

        let s = &self.strategy;
        let multipliers: &[(&str, f64)] = &[
            ("cpu.goalie_penalty", s.goalie_penalty),
            ("cpu.center_boost", s.center_boost),
            ("cpu.defense_boost", s.defense_boost),
        ];
        for (name, val) in multipliers {
            if !val.is_finite() || *val <= 0.0 {
                return Err(invalid(name, format!("must be > 0, got {val}")));
            }
        }
        if !(0.0..=1.0).contains(&s.late_draft_fraction) {
            return Err(invalid(
                "cpu.late_draft_fraction",
                format!("must be between 0.0 and 1.0, got {}", s.late_draft_fraction),
            ));
        }
        if s.recommendation_count == 0 {
            return Err(invalid("cpu.recommendation_count", "must be > 0"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tabs, phases, actions
// ---------------------------------------------------------------------------

/// Which view the presentation layer is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftTab {
    #[default]
    Available,
    DraftBoard,
    Teams,
    MyTeam,
}

impl DraftTab {
    pub fn from_str_tab(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" | "players" => Some(DraftTab::Available),
            "board" | "draftboard" => Some(DraftTab::DraftBoard),
            "teams" => Some(DraftTab::Teams),
            "my" | "myteam" | "roster" => Some(DraftTab::MyTeam),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftTab::Available => "Available",
            DraftTab::DraftBoard => "Draft Board",
            DraftTab::Teams => "Teams",
            DraftTab::MyTeam => "My Team",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftPhase {
    NotStarted,
    InProgress,
    Complete,
}

/// Every way the draft state can change.
#[derive(Debug, Clone)]
pub enum DraftAction {
    Initialize {
        settings: LeagueSettings,
        players: Vec<DraftPlayer>,
    },
    StartDraft,
    MakePick { player_id: String },
    /// Timer-expiry pick for whoever is on the clock.
    AutoPick,
    /// Deferred CPU selection targeting a specific slot.
    CpuPick { pick_index: usize },
    /// One second of wall time.
    Tick,
    ChangeTab(DraftTab),
    Reset,
}

// ---------------------------------------------------------------------------
// DraftState
// ---------------------------------------------------------------------------

/// The complete state of one draft session.
#[derive(Debug, Clone, Default)]
pub struct DraftState {
    /// `None` until a league is initialized.
    pub settings: Option<LeagueSettings>,
    /// The full draftable pool as loaded.
    pub all_players: Vec<Arc<DraftPlayer>>,
    /// Players not yet drafted, in load order.
    pub available: Vec<Arc<DraftPlayer>>,
    pub draft_order: Vec<DraftPick>,
    /// Index into `draft_order` of the next pick to be made.
    pub current_pick_index: usize,
    pub teams: Vec<TeamRoster>,
    pub timer_remaining: u32,
    pub timer_active: bool,
    pub tab: DraftTab,
    pub started: bool,
    pub complete: bool,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action. Returns `Ok(true)` if the state changed.
    ///
    /// Only `Initialize` can fail; stale or duplicate actions are ignored and
    /// return `Ok(false)`.
    pub fn apply<R: Rng>(&mut self, action: DraftAction, rng: &mut R) -> Result<bool, DraftError> {
        let changed = match action {
            DraftAction::Initialize { settings, players } => {
                self.initialize(settings, players)?;
                true
            }
            DraftAction::StartDraft => self.start(),
            DraftAction::MakePick { player_id } => self.make_pick(&player_id),
            DraftAction::AutoPick => self.auto_pick(),
            DraftAction::CpuPick { pick_index } => self.cpu_pick(pick_index, rng),
            DraftAction::Tick => self.tick(),
            DraftAction::ChangeTab(tab) => {
                let changed = self.tab != tab;
                self.tab = tab;
                changed
            }
            DraftAction::Reset => {
                self.reset();
                true
            }
        };
        Ok(changed)
    }

    /// Set up a new league, replacing any previous one.
    ///
    /// The player pool is used as given; filtering it is the caller's job.
    pub fn initialize(&mut self, settings: LeagueSettings, players: Vec<DraftPlayer>) -> Result<(), DraftError> {
        settings.validate()?;

        let required = settings.total_picks();
        if players.len() < required {
            return Err(DraftError::InsufficientPlayers {
                available: players.len(),
                required,
            });
        }

        let all_players: Vec<Arc<DraftPlayer>> = players
            .into_iter()
            .map(|mut p| {
                p.positions = parse_positions(&p.raw_positions);
                Arc::new(p)
            })
            .collect();

        let teams = (0..settings.num_teams)
            .map(|idx| {
                TeamRoster::new(
                    idx,
                    &settings.team_name(idx),
                    idx + 1 == settings.user_position,
                )
            })
            .collect();

        info!(
            "League initialized: {} teams, {} rounds, user drafting #{}, {} players",
            settings.num_teams,
            settings.num_rounds(),
            settings.user_position,
            all_players.len()
        );

        self.draft_order = generate_snake_order(
            settings.num_teams,
            settings.num_rounds(),
            settings.user_position,
        );
        self.available = all_players.clone();
        self.all_players = all_players;
        self.teams = teams;
        self.current_pick_index = 0;
        self.timer_remaining = settings.pick_timer_secs;
        self.timer_active = false;
        self.started = false;
        self.complete = false;
        self.settings = Some(settings);
        Ok(())
    }

    /// Begin the draft. Ignored before initialization or once started.
    pub fn start(&mut self) -> bool {
        if self.settings.is_none() || self.started {
            return false;
        }
        self.started = true;
        self.reset_timer();
        info!("Draft started");
        true
    }

    /// Draft `player_id` into the current slot.
    ///
    /// A no-op if there is no current slot, it is already filled, the player
    /// is not available, or the picking team has no open slot for them.
    pub fn make_pick(&mut self, player_id: &str) -> bool {
        let Some(settings) = self.settings.as_ref() else {
            return false;
        };
        let Some(slot) = self.draft_order.get(self.current_pick_index) else {
            debug!("Ignoring pick of {player_id}: draft order exhausted");
            return false;
        };
        if slot.is_filled() {
            debug!("Ignoring pick of {player_id}: slot {} already filled", slot.pick_number);
            return false;
        }
        let Some(avail_idx) = self.available.iter().position(|p| p.id == player_id) else {
            debug!("Ignoring pick of {player_id}: not available");
            return false;
        };

        let team_idx = slot.team_idx;
        let earlier_picks = self.draft_order[..self.current_pick_index]
            .iter()
            .filter(|p| p.team_idx == team_idx)
            .count();
        // The roster and the draft order must agree before anything moves.
        debug_assert_eq!(
            self.teams[team_idx].picks.len(),
            earlier_picks,
            "team {team_idx} roster out of step with the draft order"
        );

        if !self.teams[team_idx].has_slot_for(&self.available[avail_idx], &settings.roster) {
            debug!("Ignoring pick of {player_id}: no open roster slot for team {team_idx}");
            return false;
        }

        let player = self.available.remove(avail_idx);
        let slot = &mut self.draft_order[self.current_pick_index];
        slot.player = Some(Arc::clone(&player));
        slot.timestamp = Some(Utc::now());
        let pick_number = slot.pick_number;

        let team = &mut self.teams[team_idx];
        let assigned = team.add_pick(Arc::clone(&player), &settings.roster);
        match &assigned {
            Ok(pos) => info!(
                "Pick #{}: {} selects {} ({}) into {}",
                pick_number, team.name, player.name, player.raw_positions, pos
            ),
            Err(e) => error!("Roster assignment failed at pick #{pick_number}: {e}"),
        }
        // Unreachable after the slot check unless the roster itself is corrupt.
        debug_assert!(assigned.is_ok(), "roster assignment failed at pick #{pick_number}");

        self.current_pick_index += 1;
        if self.current_pick_index >= self.draft_order.len() {
            self.complete = true;
            self.timer_active = false;
            info!("Draft complete after {} picks", self.draft_order.len());
        } else {
            self.reset_timer();
        }
        true
    }

    /// Timer-expiry pick for the team on the clock, human or CPU.
    pub fn auto_pick(&mut self) -> bool {
        let Some(settings) = self.settings.as_ref() else {
            return false;
        };
        let Some(slot) = self.current_pick().filter(|s| !s.is_filled()) else {
            return false;
        };
        let roster = &self.teams[slot.team_idx];
        match auto_pick_choice(&self.available, roster, &settings.roster) {
            Some(player) => {
                info!("Auto-picking {} for {}", player.name, roster.name);
                self.make_pick(&player.id)
            }
            None => false,
        }
    }

    /// Resolve a deferred CPU selection for `pick_index`.
    ///
    /// Dropped unless that slot is still current, unfilled, and owned by a
    /// CPU team.
    pub fn cpu_pick<R: Rng>(&mut self, pick_index: usize, rng: &mut R) -> bool {
        if pick_index != self.current_pick_index {
            debug!("Dropping stale CPU pick for slot {pick_index}");
            return false;
        }
        let Some(settings) = self.settings.as_ref() else {
            return false;
        };
        let Some(slot) = self.current_pick().filter(|s| !s.is_filled() && !s.is_user_pick) else {
            return false;
        };
        let roster = &self.teams[slot.team_idx];
        let choice = select_best(
            &self.available,
            roster,
            &settings.roster,
            slot.pick_number,
            &settings.strategy,
            rng,
        );
        match choice {
            Some(player) => {
                let made = self.make_pick(&player.id);
                if !made {
                    warn!("CPU choice {} could not be drafted at slot {pick_index}", player.id);
                }
                made
            }
            None => false,
        }
    }

    /// Count down one second; auto-pick when the clock runs out.
    pub fn tick(&mut self) -> bool {
        let timer_secs = self.settings.as_ref().map_or(0, |s| s.pick_timer_secs);
        if !self.timer_active || timer_secs == 0 || self.complete {
            return false;
        }
        self.timer_remaining = self.timer_remaining.saturating_sub(1);
        if self.timer_remaining == 0 {
            info!("Pick timer expired");
            self.auto_pick();
        }
        true
    }

    /// Drop everything and return to the pre-initialization state.
    pub fn reset(&mut self) {
        info!("Draft reset");
        *self = DraftState::default();
    }

    fn reset_timer(&mut self) {
        self.timer_remaining = self.settings.as_ref().map_or(0, |s| s.pick_timer_secs);
        self.timer_active = self.started && !self.complete && self.is_user_turn();
    }

    // --- Queries ---

    pub fn phase(&self) -> DraftPhase {
        if self.complete {
            DraftPhase::Complete
        } else if self.started {
            DraftPhase::InProgress
        } else {
            DraftPhase::NotStarted
        }
    }

    pub fn is_draft_complete(&self) -> bool {
        self.complete
    }

    /// The slot on the clock, if any.
    pub fn current_pick(&self) -> Option<&DraftPick> {
        self.draft_order.get(self.current_pick_index)
    }

    pub fn is_user_turn(&self) -> bool {
        !self.complete && self.current_pick().is_some_and(|p| p.is_user_pick)
    }

    /// The slot a CPU team should pick for next, if the draft is waiting on one.
    pub fn pending_cpu_slot(&self) -> Option<usize> {
        if !self.started || self.complete {
            return None;
        }
        self.current_pick()
            .filter(|p| !p.is_filled() && !p.is_user_pick)
            .map(|_| self.current_pick_index)
    }

    pub fn user_team(&self) -> Option<&TeamRoster> {
        self.teams.iter().find(|t| t.is_human)
    }

    /// Filled slots, oldest first.
    pub fn completed_picks(&self) -> impl Iterator<Item = &DraftPick> {
        self.draft_order.iter().filter(|p| p.is_filled())
    }

    /// Suggestions for the user, empty unless the user is on the clock.
    pub fn recommendations<R: Rng>(&self, rng: &mut R) -> Vec<Recommendation> {
        let (Some(settings), Some(slot), Some(team)) =
            (self.settings.as_ref(), self.current_pick(), self.user_team())
        else {
            return Vec::new();
        };
        if !self.started || !self.is_user_turn() {
            return Vec::new();
        }
        recommend(
            &self.available,
            team,
            &settings.roster,
            slot.pick_number,
            &settings.strategy,
            settings.strategy.recommendation_count,
            rng,
        )
    }
}
