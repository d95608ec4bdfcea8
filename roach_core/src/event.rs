use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    card::Card,
    game_lobby::GameResult,
    play::{ActionKind, Step},
    player::PlayerId,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoundStarted { round: usize, starter: PlayerId },
    Step(Step),
    RoundResolved { loser: PlayerId, card: Option<Card> },
    Eliminated(PlayerId),
    GameOver(GameResult),
}

/// Who may see the card carried by an event. Everybody sees the rest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventVisibility {
    Public,
    Private(Vec<PlayerId>),
}

#[derive(Clone, Debug)]
pub struct EventEntry {
    pub round: usize,
    pub visibility: EventVisibility,
    pub event: Event,
}

/// The log as `visible_to` may see it; `None` is the omniscient view.
pub fn filter_event(log: &[EventEntry], visible_to: Option<PlayerId>) -> Vec<Event> {
    log.iter()
        .map(|e| match &e.visibility {
            EventVisibility::Public => e.event.clone(),
            EventVisibility::Private(knowers) => match (visible_to, &e.event) {
                (Some(p), Event::Step(step)) if !knowers.contains(&p) => {
                    Event::Step(step.redacted())
                }
                _ => e.event.clone(),
            },
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub me: PlayerId,
    pub players: Vec<String>,
    pub hand: Vec<Card>,
    pub penalties: Vec<BTreeMap<Card, usize>>,
    pub creatures: Vec<Card>,
    pub holder: PlayerId,
    pub claim: Option<Card>,
    pub claimant: Option<PlayerId>,
    /// The card in play, if this seat has seen it.
    pub known_card: Option<Card>,
    pub history: Vec<Step>,
    pub eligible_targets: Vec<PlayerId>,
    pub legal: Vec<ActionKind>,
}

impl RoundView {
    pub fn may(&self, kind: ActionKind) -> bool {
        self.legal.contains(&kind)
    }
}
