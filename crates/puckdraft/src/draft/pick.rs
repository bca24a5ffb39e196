// Positions, draftable players, and individual pick slots.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hockey roster positions.
///
/// `Center` through `Goalie` are the primary positions a player can hold
/// natively. `Forward`, `Utility` and `Bench` only exist as roster slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Center,
    LeftWing,
    RightWing,
    Defense,
    Goalie,
    Forward,
    Utility,
    Bench,
}

/// Primary positions in the order roster assignment checks them.
pub const PRIMARY_POSITIONS: [Position; 5] = [
    Position::Center,
    Position::LeftWing,
    Position::RightWing,
    Position::Defense,
    Position::Goalie,
];

/// Positions that qualify a player for the forward-flex slot.
pub const FORWARD_POSITIONS: [Position; 3] =
    [Position::Center, Position::LeftWing, Position::RightWing];

impl Position {
    /// Every position, in slot display order.
    pub const ALL: [Position; 8] = [
        Position::Center,
        Position::LeftWing,
        Position::RightWing,
        Position::Defense,
        Position::Goalie,
        Position::Forward,
        Position::Utility,
        Position::Bench,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Accepts the usual provider abbreviations: "L"/"R" for the wings,
    /// "UT" for utility and "BE"/"BN" for bench.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(Position::Center),
            "LW" | "L" => Some(Position::LeftWing),
            "RW" | "R" => Some(Position::RightWing),
            "D" => Some(Position::Defense),
            "G" => Some(Position::Goalie),
            "F" => Some(Position::Forward),
            "UTIL" | "UT" => Some(Position::Utility),
            "BN" | "BE" | "BENCH" => Some(Position::Bench),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::LeftWing => "LW",
            Position::RightWing => "RW",
            Position::Defense => "D",
            Position::Goalie => "G",
            Position::Forward => "F",
            Position::Utility => "UTIL",
            Position::Bench => "BN",
        }
    }

    /// Whether a player can hold this position natively.
    pub fn is_primary(&self) -> bool {
        PRIMARY_POSITIONS.contains(self)
    }

    /// Whether this is a forward position (C, LW, RW).
    pub fn is_forward(&self) -> bool {
        FORWARD_POSITIONS.contains(self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Parse a raw eligibility string such as `"C/LW"` into primary positions.
///
/// Unknown tokens and slot-only positions (F, UTIL, BN) are dropped, as are
/// duplicates. Order of first appearance is preserved.
pub fn parse_positions(raw: &str) -> Vec<Position> {
    let mut positions = Vec::new();
    for token in raw.split('/') {
        if let Some(pos) = Position::from_str_pos(token) {
            if pos.is_primary() && !positions.contains(&pos) {
                positions.push(pos);
            }
        }
    }
    positions
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Season box-score line. Skater and goalie columns share one record;
/// whichever side does not apply stays at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkaterStats {
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub plus_minus: i32,
    pub penalty_minutes: u32,
    pub power_play_points: u32,
    pub shots: u32,
    pub hits: u32,
    pub blocks: u32,
    pub wins: u32,
    pub saves: u32,
    pub goals_against: u32,
    pub shutouts: u32,
}

/// A player in the draftable pool. Never mutated once the pool is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPlayer {
    pub id: String,
    pub name: String,
    pub team: String,
    /// Eligibility string exactly as the provider sent it, e.g. "C/LW".
    pub raw_positions: String,
    /// Primary positions parsed from `raw_positions`.
    pub positions: Vec<Position>,
    pub adp: f64,
    #[serde(default)]
    pub stats: SkaterStats,
    #[serde(default)]
    pub ownership_pct: Option<f64>,
    #[serde(default)]
    pub overall_rank: Option<u32>,
    #[serde(default)]
    pub position_rank: Option<u32>,
}

impl DraftPlayer {
    /// Build a player with no box-score data, parsing the eligibility string.
    pub fn new(id: &str, name: &str, team: &str, raw_positions: &str, adp: f64) -> Self {
        DraftPlayer {
            id: id.to_string(),
            name: name.to_string(),
            team: team.to_string(),
            raw_positions: raw_positions.to_string(),
            positions: parse_positions(raw_positions),
            adp,
            stats: SkaterStats::default(),
            ownership_pct: None,
            overall_rank: None,
            position_rank: None,
        }
    }

    /// Whether the player natively holds `pos`.
    pub fn holds(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }

    pub fn is_goalie(&self) -> bool {
        self.holds(Position::Goalie)
    }

    /// Whether the player holds any of C, LW, RW.
    pub fn is_forward(&self) -> bool {
        self.positions.iter().any(|p| p.is_forward())
    }

    /// Whether the player satisfies the eligibility rule for a slot,
    /// ignoring capacity.
    pub fn can_fill(&self, slot: Position) -> bool {
        match slot {
            Position::Forward => self.is_forward(),
            Position::Utility | Position::Bench => true,
            primary => self.holds(primary),
        }
    }
}

// ---------------------------------------------------------------------------
// Pick slots
// ---------------------------------------------------------------------------

/// One slot in the draft order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPick {
    /// Overall pick number (1-based, contiguous across rounds).
    pub pick_number: usize,
    /// Round number (1-based).
    pub round: usize,
    /// Position within the round (1-based).
    pub pick_in_round: usize,
    /// Index of the team that owns this slot.
    pub team_idx: usize,
    /// The drafted player, once the slot is filled.
    pub player: Option<Arc<DraftPlayer>>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether this slot belongs to the human team.
    pub is_user_pick: bool,
}

impl DraftPick {
    pub fn is_filled(&self) -> bool {
        self.player.is_some()
    }
}
