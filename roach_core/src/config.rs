use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    card::{DeckConfig, Remainder},
    error::SetupError,
    player::PlayerId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarterPolicy {
    /// Whoever took the card starts next, as in the published rules.
    #[default]
    LoserStarts,
    Rotate,
}

impl StarterPolicy {
    pub fn next(&self, previous: PlayerId, loser: PlayerId, seats: usize) -> PlayerId {
        match self {
            StarterPolicy::LoserStarts => loser,
            StarterPolicy::Rotate => (previous + 1) % seats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    #[default]
    LastStanding,
    /// Stop as soon as somebody is out; everybody else wins.
    FirstLoser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub deck: DeckConfig,
    pub remainder: Remainder,
    /// Copies of one creature in a penalty pile that put a player out.
    pub penalty_threshold: usize,
    pub starter_policy: StarterPolicy,
    /// Seat starting the first round; a seeded random seat when unset.
    pub first_starter: Option<PlayerId>,
    pub end_condition: EndCondition,
    pub round_limit: Option<usize>,
    pub move_timeout_ms: u64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            deck: DeckConfig::standard(),
            remainder: Remainder::Spread,
            penalty_threshold: 4,
            starter_policy: StarterPolicy::LoserStarts,
            first_starter: None,
            end_condition: EndCondition::LastStanding,
            round_limit: None,
            move_timeout_ms: 30_000,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn move_timeout(&self) -> Duration {
        Duration::from_millis(self.move_timeout_ms)
    }

    pub fn validate(&self, player_count: usize) -> Result<(), SetupError> {
        if player_count < 2 {
            return Err(SetupError::PlayerCountInvalid(player_count));
        }
        if self.deck.is_empty() {
            return Err(SetupError::InvalidConfig("the deck has no cards".to_string()));
        }
        if self.penalty_threshold == 0 {
            return Err(SetupError::InvalidConfig(
                "penalty_threshold must be at least 1".to_string(),
            ));
        }
        if let Some(seat) = self.first_starter {
            if seat >= player_count {
                return Err(SetupError::InvalidConfig(format!(
                    "first_starter {} is not one of the {} seats",
                    seat, player_count
                )));
            }
        }
        if self.round_limit == Some(0) {
            return Err(SetupError::InvalidConfig(
                "round_limit must be at least 1".to_string(),
            ));
        }
        if self.move_timeout_ms == 0 {
            return Err(SetupError::InvalidConfig(
                "move_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    #[test]
    fn partial_json_should_fall_back_to_defaults() {
        let config: GameConfig = serde_json::from_str(
            r#"{"deck": {"RAT": 2, "BAT": 2}, "starter_policy": "rotate", "round_limit": 50}"#,
        )
        .unwrap();
        assert_eq!(config.deck, DeckConfig::new([(Card::Rat, 2), (Card::Bat, 2)]));
        assert_eq!(config.starter_policy, StarterPolicy::Rotate);
        assert_eq!(config.round_limit, Some(50));
        assert_eq!(config.penalty_threshold, 4);
        assert_eq!(config.end_condition, EndCondition::LastStanding);
    }

    #[test]
    fn validate_should_refuse_bad_settings() {
        let config = GameConfig::default();
        assert_eq!(config.validate(1), Err(SetupError::PlayerCountInvalid(1)));
        assert!(config.validate(3).is_ok());

        let bad = [
            GameConfig {
                penalty_threshold: 0,
                ..GameConfig::default()
            },
            GameConfig {
                deck: DeckConfig::new([]),
                ..GameConfig::default()
            },
            GameConfig {
                first_starter: Some(3),
                ..GameConfig::default()
            },
            GameConfig {
                round_limit: Some(0),
                ..GameConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(3),
                Err(SetupError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn starter_policy_should_pick_loser_or_next_seat() {
        assert_eq!(StarterPolicy::LoserStarts.next(0, 2, 3), 2);
        assert_eq!(StarterPolicy::Rotate.next(2, 1, 3), 0);
    }
}
