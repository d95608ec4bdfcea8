use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    card::Card,
    error::{CollaboratorError, Rejection},
    event::{Event, RoundView},
    play::Response,
};

pub type PlayerId = usize;

/// Produces moves for one seat. Implementations only ever see what their seat is entitled to.
pub trait Player {
    fn name(&self) -> &str;

    /// Called before the first round of every game with the game's seed.
    fn start_game(&mut self, _seat: PlayerId, _seed: u64) {}

    fn notify(&self, game_log: &[Event], players: &[String]);

    fn obtain_move(&mut self, view: &RoundView) -> Result<Response, CollaboratorError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    hand: Vec<Card>,
    penalty: BTreeMap<Card, usize>,
}

impl PlayerState {
    pub fn new(hand: Vec<Card>) -> Self {
        PlayerState {
            hand,
            penalty: BTreeMap::new(),
        }
    }

    pub fn hand(&self) -> &Vec<Card> {
        &self.hand
    }

    pub fn penalty(&self) -> &BTreeMap<Card, usize> {
        &self.penalty
    }

    pub fn penalty_count(&self, card: Card) -> usize {
        self.penalty.get(&card).copied().unwrap_or(0)
    }

    pub fn remove_from_hand(&mut self, card: Card) -> Result<Card, Rejection> {
        let index = self
            .hand
            .iter()
            .position(|&c| c == card)
            .ok_or(Rejection::CardNotInHand(card))?;
        Ok(self.hand.remove(index))
    }

    pub fn add_to_penalty(&mut self, card: Card) {
        *self.penalty.entry(card).or_insert(0) += 1;
    }

    /// Out of the game once `threshold` cards of one creature lie in front of the player, or
    /// once there is nothing left in hand to start a round with.
    pub fn is_eliminated(&self, threshold: usize) -> bool {
        self.hand.is_empty() || self.penalty.values().any(|&count| count >= threshold)
    }

    pub fn describe_penalty(&self) -> String {
        if self.penalty.is_empty() {
            return "nothing".to_string();
        }
        self.penalty
            .iter()
            .map(|(card, count)| format!("{}x {}", count, card))
            .join(", ")
    }
}
