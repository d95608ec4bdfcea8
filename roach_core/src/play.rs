use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::{
    card::Card,
    error::{CollaboratorError, Rejection},
    player::PlayerId,
};

/// A move as a collaborator proposes it. The engine decides who made it and what the card
/// really is; only `Play` names a card, picked from the proposer's own hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum Proposal {
    Play {
        card: Card,
        target: PlayerId,
        claim: Card,
    },
    Look,
    Pass {
        target: PlayerId,
        claim: Card,
    },
    Guess {
        guess: bool,
    },
}

impl Proposal {
    pub fn kind(&self) -> ActionKind {
        match self {
            Proposal::Play { .. } => ActionKind::Play,
            Proposal::Look => ActionKind::Look,
            Proposal::Pass { .. } => ActionKind::Pass,
            Proposal::Guess { .. } => ActionKind::Guess,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub proposal: Proposal,
    pub reason: String,
}

impl Response {
    pub fn new(proposal: Proposal, reason: &str) -> Self {
        Response {
            proposal,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Play,
    Look,
    Pass,
    Guess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitCause {
    IllegalMove(Rejection),
    Collaborator(CollaboratorError),
}

impl std::fmt::Display for ForfeitCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForfeitCause::IllegalMove(r) => write!(f, "illegal move: {}", r),
            ForfeitCause::Collaborator(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum Action {
    Play { target: PlayerId, claim: Card },
    Look,
    Pass { target: PlayerId, claim: Card },
    Guess { guess: bool },
    Forfeit { cause: ForfeitCause },
}

impl From<&Proposal> for Action {
    fn from(proposal: &Proposal) -> Self {
        match *proposal {
            Proposal::Play { target, claim, .. } => Action::Play { target, claim },
            Proposal::Look => Action::Look,
            Proposal::Pass { target, claim } => Action::Pass { target, claim },
            Proposal::Guess { guess } => Action::Guess { guess },
        }
    }
}

/// One entry of a round's history. `card` is the ground truth and is only handed out through
/// [`Step::redacted`] to players who are entitled to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub player: PlayerId,
    pub action: Action,
    pub card: Option<Card>,
    pub reason: String,
}

impl Step {
    pub fn redacted(&self) -> Step {
        Step {
            card: None,
            ..self.clone()
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.action, Action::Guess { .. } | Action::Forfeit { .. })
    }

    pub fn describe(&self, players: &[String]) -> String {
        let name = |id: PlayerId| {
            players
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("player {}", id))
        };
        let card = self
            .card
            .map(|c| c.to_string())
            .unwrap_or_else(|| "card".to_string());
        match &self.action {
            Action::Play { target, claim } => format!(
                "{} gives a {} to {} and claims it is a {}.",
                name(self.player),
                card,
                name(*target),
                claim
            ),
            Action::Look => format!("{} looks at the {}.", name(self.player), card),
            Action::Pass { target, claim } => format!(
                "{} passes the {} to {} and claims it is a {}.",
                name(self.player),
                card,
                name(*target),
                claim
            ),
            Action::Guess { guess } => format!(
                "{} says the claim is {}.",
                name(self.player),
                if *guess { "true" } else { "a lie" }
            ),
            Action::Forfeit { cause } => {
                format!("{} forfeits the round: {}.", name(self.player), cause)
            }
        }
    }
}

pub fn guess_is_correct(card: Card, claim: Card, guess: bool) -> bool {
    guess == (card == claim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_should_be_correct_when_it_matches_the_truth_of_the_claim() {
        assert!(guess_is_correct(Card::Rat, Card::Bat, false));
        assert!(guess_is_correct(Card::Rat, Card::Rat, true));
        assert!(!guess_is_correct(Card::Rat, Card::Bat, true));
        assert!(!guess_is_correct(Card::Rat, Card::Rat, false));
    }

    #[test]
    fn redacted_should_strip_only_the_card() {
        let step = Step {
            player: 1,
            action: Action::Pass {
                target: 2,
                claim: Card::Frog,
            },
            card: Some(Card::Fly),
            reason: "why not".to_string(),
        };
        let redacted = step.redacted();
        assert_eq!(redacted.card, None);
        assert_eq!(redacted.action, step.action);
        assert_eq!(redacted.reason, step.reason);
    }

    #[test]
    fn describe_should_hide_unknown_cards() {
        let players = vec!["Ann".to_string(), "Bob".to_string()];
        let step = Step {
            player: 0,
            action: Action::Play {
                target: 1,
                claim: Card::Bat,
            },
            card: None,
            reason: String::new(),
        };
        assert_eq!(
            step.describe(&players),
            "Ann gives a card to Bob and claims it is a BAT."
        );
    }

    #[test]
    fn action_should_serialize_with_an_action_tag() {
        let json = serde_json::to_value(Action::Guess { guess: true }).unwrap();
        assert_eq!(json, serde_json::json!({"action": "GUESS", "guess": true}));
    }
}
