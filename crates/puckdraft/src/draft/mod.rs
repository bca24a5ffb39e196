// Draft engine: positions, rosters, pick order, and the state machine.

pub mod order;
pub mod pick;
pub mod roster;
pub mod state;
