// Snake draft order generation.

use super::pick::DraftPick;

/// Team indices in pick order for a given 1-based round.
///
/// Odd rounds run 0..num_teams, even rounds run in reverse.
pub fn round_order(num_teams: usize, round: usize) -> Vec<usize> {
    if round % 2 == 1 {
        (0..num_teams).collect()
    } else {
        (0..num_teams).rev().collect()
    }
}

/// Generate every pick slot of a snake draft.
///
/// Overall pick numbers run 1..=num_teams*num_rounds without resetting per
/// round. `user_position` is the human team's 1-based draft slot.
pub fn generate_snake_order(num_teams: usize, num_rounds: usize, user_position: usize) -> Vec<DraftPick> {
    let user_idx = user_position.checked_sub(1);
    let mut picks = Vec::with_capacity(num_teams * num_rounds);

    for round in 1..=num_rounds {
        for (slot, team_idx) in round_order(num_teams, round).into_iter().enumerate() {
            picks.push(DraftPick {
                pick_number: picks.len() + 1,
                round,
                pick_in_round: slot + 1,
                team_idx,
                player: None,
                timestamp: None,
                is_user_pick: Some(team_idx) == user_idx,
            });
        }
    }

    picks
}
