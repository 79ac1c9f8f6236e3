//! The set of players taking part in a tournament

use crate::strategy::Player;

/// Index of a player in its roster
pub type PlayerId = usize;

/// Owns every player for the lifetime of a tournament
///
/// Matches and the simulator refer to players by [`PlayerId`] only.
#[derive(Default)]
pub struct Roster {
    players: Vec<Box<dyn Player>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_players(players: Vec<Box<dyn Player>>) -> Self {
        Self { players }
    }

    pub fn push(&mut self, player: Box<dyn Player>) -> PlayerId {
        self.players.push(player);
        self.players.len() - 1
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn name(&self, id: PlayerId) -> Option<&str> {
        self.players.get(id).map(|p| p.developer_name())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.developer_name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.developer_name()).collect()
    }

    /// Mutable access to the two players of a match
    ///
    /// Returns `None` if either index is out of range or both are equal.
    pub fn pair_mut(&mut self, a: PlayerId, b: PlayerId) -> Option<(&mut dyn Player, &mut dyn Player)> {
        if a == b || a >= self.players.len() || b >= self.players.len() {
            return None;
        }
        let (first, second) = if a < b {
            let (left, right) = self.players.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.players.split_at_mut(a);
            (&mut right[0], &mut left[b])
        };
        let player_a: &mut dyn Player = first.as_mut();
        let player_b: &mut dyn Player = second.as_mut();
        Some((player_a, player_b))
    }
}

impl std::fmt::Debug for Roster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
