use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{card::Card, player::PlayerId};

/// Why a proposed move was refused. A rejection ends the round as a forfeit for the mover.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    #[error("player {player} acted but player {holder} holds the card")]
    NotYourTurn { player: PlayerId, holder: PlayerId },
    #[error("no card is in play yet, the round has to start with a play")]
    NoCardInPlay,
    #[error("a card is already in play")]
    CardAlreadyInPlay,
    #[error("{0} is not in the player's hand")]
    CardNotInHand(Card),
    #[error("{0} is not part of this deck")]
    UnknownCreature(Card),
    #[error("a card cannot be given to oneself")]
    TargetIsSelf,
    #[error("player {0} cannot receive the card")]
    TargetIneligible(PlayerId),
    #[error("there is no player {0}")]
    UnknownPlayer(PlayerId),
    #[error("the card has to be looked at before it is passed")]
    PassWithoutLook,
    #[error("the card was already looked at")]
    AlreadyLooked,
    #[error("a card that was looked at has to be passed on")]
    MustPassAfterLook,
    #[error("nobody is left to pass to, the holder has to guess")]
    NoTargetsLeft,
    #[error("the round is over")]
    RoundResolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CollaboratorError {
    #[error("no move within {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("collaborator disconnected")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("{cards} cards cannot be dealt to {players} players")]
    DeckExhausted { cards: usize, players: usize },
    #[error("{0} players cannot play, at least 2 are needed")]
    PlayerCountInvalid(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
