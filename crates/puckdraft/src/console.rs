// Line-oriented console front end.
//
// Parses typed commands into `UserCommand`s and renders `UiUpdate`s as
// plain text (or JSON). Picks are only forwarded while the user is on the
// clock; CPU slots are resolved by the app loop.

use std::fmt::Write as _;

use thiserror::Error;

use crate::draft::state::{DraftPhase, DraftTab};
use crate::protocol::{DraftSnapshot, PickSummary, PlayerRow, UiUpdate, UserCommand};

/// How many available players the text view lists.
const AVAILABLE_ROWS: usize = 20;

/// Timer values at which a countdown line is printed.
const TIMER_WARNINGS: [u32; 3] = [30, 10, 5];

pub const HELP: &str = "\
commands:
  init          build the league from config and the player pool
  start         start the draft
  pick <id>     draft a player (your turn only)
  tab <name>    available | board | teams | my
  reset         discard the draft
  json          toggle JSON output
  help          show this message
  quit          exit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{command}` needs an argument: {hint}")]
    MissingArgument {
        command: &'static str,
        hint: &'static str,
    },

    #[error("unknown tab `{0}`")]
    UnknownTab(String),
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Send(UserCommand),
    ToggleJson,
    Help,
    Empty,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandParseError> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(ConsoleCommand::Empty);
    };
    let arg = parts.next();

    let cmd = match head.to_lowercase().as_str() {
        "init" => UserCommand::InitializeLeague,
        "start" => UserCommand::StartDraft,
        "pick" | "p" => {
            let player_id = arg.ok_or(CommandParseError::MissingArgument {
                command: "pick",
                hint: "player id",
            })?;
            UserCommand::MakePick {
                player_id: player_id.to_string(),
            }
        }
        "tab" | "t" => {
            let name = arg.ok_or(CommandParseError::MissingArgument {
                command: "tab",
                hint: "available, board, teams or my",
            })?;
            let tab = DraftTab::from_str_tab(name)
                .ok_or_else(|| CommandParseError::UnknownTab(name.to_string()))?;
            UserCommand::ChangeTab(tab)
        }
        "reset" => UserCommand::ResetDraft,
        "quit" | "q" | "exit" => UserCommand::Quit,
        "json" => return Ok(ConsoleCommand::ToggleJson),
        "help" | "?" => return Ok(ConsoleCommand::Help),
        other => return Err(CommandParseError::Unknown(other.to_string())),
    };
    Ok(ConsoleCommand::Send(cmd))
}

// ---------------------------------------------------------------------------
// Console session
// ---------------------------------------------------------------------------

/// What the caller should do with a typed line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    Send(UserCommand),
    Print(String),
    Nothing,
}

/// Console state between lines: output mode and the last snapshot seen.
#[derive(Debug, Default)]
pub struct Console {
    json: bool,
    last: Option<DraftSnapshot>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_line(&mut self, line: &str) -> ConsoleAction {
        match parse_command(line) {
            Ok(ConsoleCommand::Send(UserCommand::MakePick { player_id })) => {
                match self.last.as_ref() {
                    Some(snap) if snap.phase == DraftPhase::InProgress && snap.is_user_turn => {
                        ConsoleAction::Send(UserCommand::MakePick { player_id })
                    }
                    Some(snap) if snap.phase == DraftPhase::NotStarted => {
                        ConsoleAction::Print("The draft has not started; run `start` first.".to_string())
                    }
                    _ => ConsoleAction::Print("It is not your turn to pick.".to_string()),
                }
            }
            Ok(ConsoleCommand::Send(cmd)) => ConsoleAction::Send(cmd),
            Ok(ConsoleCommand::ToggleJson) => {
                self.json = !self.json;
                let mode = if self.json { "JSON" } else { "text" };
                ConsoleAction::Print(format!("Output mode: {mode}"))
            }
            Ok(ConsoleCommand::Help) => ConsoleAction::Print(HELP.to_string()),
            Ok(ConsoleCommand::Empty) => ConsoleAction::Nothing,
            Err(e) => ConsoleAction::Print(e.to_string()),
        }
    }

    /// Render an update, or `None` when nothing worth printing changed.
    ///
    /// Snapshots that only move the pick clock print a countdown line at a
    /// few thresholds instead of a full redraw.
    pub fn render(&mut self, update: UiUpdate) -> Option<String> {
        match update {
            UiUpdate::Notice(msg) => Some(msg),
            UiUpdate::Snapshot(snap) => {
                let clock_only = self.last.as_ref().is_some_and(|prev| {
                    prev.picks_made == snap.picks_made
                        && prev.phase == snap.phase
                        && prev.tab == snap.tab
                        && prev.initialized == snap.initialized
                });
                let out = if self.json {
                    (!clock_only).then(|| {
                        serde_json::to_string(&*snap)
                            .unwrap_or_else(|e| format!("failed to encode snapshot: {e}"))
                    })
                } else if clock_only {
                    (snap.timer_active && TIMER_WARNINGS.contains(&snap.timer_remaining))
                        .then(|| format!("{}s left on your pick", snap.timer_remaining))
                } else {
                    Some(render_snapshot(&snap))
                };
                self.last = Some(*snap);
                out
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn player_line(p: &PlayerRow) -> String {
    format!(
        "{:<10} {:<24} {:<4} {:<8} {:>6.1} {:>7.1}",
        p.id, p.name, p.team, p.positions, p.adp, p.fantasy_points
    )
}

fn pick_label(pick: &PickSummary) -> String {
    format!("{}.{:02}", pick.round, pick.pick_in_round)
}

fn status_line(snap: &DraftSnapshot) -> String {
    if !snap.initialized {
        return "No league loaded. Type `init` to set one up.".to_string();
    }
    match (snap.phase, snap.on_the_clock.as_ref()) {
        (DraftPhase::Complete, _) => format!("Draft complete: {} picks made", snap.picks_made),
        (DraftPhase::NotStarted, _) => format!(
            "{} teams, {} rounds. Type `start` to begin.",
            snap.num_teams, snap.num_rounds
        ),
        (DraftPhase::InProgress, Some(pick)) if snap.is_user_turn => {
            let mut line = format!(
                "Pick {} of {} ({}): YOU are on the clock",
                pick.pick_number,
                snap.total_picks,
                pick_label(pick)
            );
            if snap.timer_active {
                let _ = write!(line, ", {}s", snap.timer_remaining);
            }
            line
        }
        (DraftPhase::InProgress, Some(pick)) => format!(
            "Pick {} of {} ({}): {} is picking",
            pick.pick_number,
            snap.total_picks,
            pick_label(pick),
            pick.team_name
        ),
        (DraftPhase::InProgress, None) => "Waiting".to_string(),
    }
}

pub fn render_snapshot(snap: &DraftSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", snap.tab.label());
    let _ = writeln!(out, "{}", status_line(snap));

    match snap.tab {
        DraftTab::Available => {
            let _ = writeln!(
                out,
                "{:<10} {:<24} {:<4} {:<8} {:>6} {:>7}",
                "ID", "NAME", "TEAM", "POS", "ADP", "FPTS"
            );
            for p in snap.available.iter().take(AVAILABLE_ROWS) {
                let _ = writeln!(out, "{}", player_line(p));
            }
            if !snap.recommendations.is_empty() {
                let _ = writeln!(out, "Suggestions:");
                for rec in &snap.recommendations {
                    let _ = writeln!(
                        out,
                        "  {} ({}) {:.1}: {}",
                        rec.player.name, rec.player.id, rec.score, rec.reason
                    );
                }
            }
        }
        DraftTab::DraftBoard => {
            for pick in &snap.board {
                let name = pick.player.as_ref().map_or("-", |p| p.name.as_str());
                let _ = writeln!(out, "{} #{:<4} {:<16} {}", pick_label(pick), pick.pick_number, pick.team_name, name);
            }
        }
        DraftTab::Teams => {
            for team in &snap.teams {
                let needs: Vec<String> = team.needs.iter().map(|p| p.to_string()).collect();
                let _ = writeln!(
                    out,
                    "{:<16} {:>2} picked, {:>2} left  needs: {}",
                    team.name,
                    team.roster.len(),
                    team.picks_remaining,
                    if needs.is_empty() { "-".to_string() } else { needs.join(" ") }
                );
            }
        }
        DraftTab::MyTeam => match snap.user_team() {
            Some(team) => {
                for entry in &team.roster {
                    let _ = writeln!(out, "{:<5} {}", entry.slot.to_string(), player_line(&entry.player));
                }
                if team.roster.is_empty() {
                    let _ = writeln!(out, "No picks yet.");
                }
            }
            None => {
                let _ = writeln!(out, "No team yet.");
            }
        },
    }
    out.trim_end().to_string()
}
