use itertools::Itertools;

use crate::{
    card::{Card, DeckConfig},
    error::Rejection,
    event::RoundView,
    play::{Action, ActionKind, Proposal, Step},
    player::{PlayerId, PlayerState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingPlay,
    Held { seen: bool },
    Resolved,
}

/// The journey of a single card, from the play to the guess or forfeit that ends it.
#[derive(Debug, Clone)]
pub struct Round {
    pub(crate) number: usize,
    pub(crate) starter: PlayerId,
    pub(crate) in_game: Vec<bool>,
    pub(crate) card: Option<Card>,
    pub(crate) holder: PlayerId,
    pub(crate) claim: Option<Card>,
    pub(crate) claimant: Option<PlayerId>,
    pub(crate) history: Vec<Step>,
}

impl Round {
    pub fn new(number: usize, starter: PlayerId, in_game: Vec<bool>) -> Self {
        Round {
            number,
            starter,
            in_game,
            card: None,
            holder: starter,
            claim: None,
            claimant: None,
            history: vec![],
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn starter(&self) -> PlayerId {
        self.starter
    }

    pub fn holder(&self) -> PlayerId {
        self.holder
    }

    pub fn claim(&self) -> Option<Card> {
        self.claim
    }

    pub fn claimant(&self) -> Option<PlayerId> {
        self.claimant
    }

    pub fn history(&self) -> &[Step] {
        &self.history
    }

    pub fn seats(&self) -> usize {
        self.in_game.len()
    }

    pub fn phase(&self) -> Phase {
        match self.history.last() {
            None => Phase::AwaitingPlay,
            Some(step) if step.is_terminal() => Phase::Resolved,
            Some(Step {
                action: Action::Look,
                ..
            }) => Phase::Held { seen: true },
            Some(_) => Phase::Held { seen: false },
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.phase() == Phase::Resolved
    }

    fn has_held(&self, player: PlayerId) -> bool {
        player == self.starter
            || self.history.iter().any(|s| match s.action {
                Action::Play { target, .. } | Action::Pass { target, .. } => target == player,
                _ => false,
            })
    }

    pub fn eligible_targets(&self) -> Vec<PlayerId> {
        (0..self.seats())
            .filter(|&p| self.in_game[p] && p != self.holder && !self.has_held(p))
            .collect()
    }

    /// Whether `player` has legitimately seen the card: its starter once played, anyone who
    /// looked at it, and everybody once it lies face up.
    pub fn knows(&self, player: PlayerId) -> bool {
        self.is_resolved()
            || self.history.iter().any(|s| {
                s.player == player && matches!(s.action, Action::Play { .. } | Action::Look)
            })
    }

    pub fn knowledge(&self) -> Vec<bool> {
        (0..self.seats()).map(|p| self.knows(p)).collect()
    }

    pub fn knowers(&self) -> Vec<PlayerId> {
        (0..self.seats()).filter(|&p| self.knows(p)).collect()
    }

    pub fn legal_actions(&self) -> Vec<ActionKind> {
        match self.phase() {
            Phase::AwaitingPlay => vec![ActionKind::Play],
            Phase::Held { seen: true } => vec![ActionKind::Pass],
            Phase::Held { seen: false } if self.eligible_targets().is_empty() => {
                vec![ActionKind::Guess]
            }
            Phase::Held { seen: false } => vec![ActionKind::Look, ActionKind::Guess],
            Phase::Resolved => vec![],
        }
    }

    pub fn validate(
        &self,
        player: PlayerId,
        proposal: &Proposal,
        hand: &[Card],
        deck: &DeckConfig,
    ) -> Result<(), Rejection> {
        let phase = self.phase();
        if phase == Phase::Resolved {
            return Err(Rejection::RoundResolved);
        }
        if player != self.holder {
            return Err(Rejection::NotYourTurn {
                player,
                holder: self.holder,
            });
        }
        match (phase, proposal) {
            (
                Phase::AwaitingPlay,
                Proposal::Play {
                    card,
                    target,
                    claim,
                },
            ) => {
                if !hand.contains(card) {
                    return Err(Rejection::CardNotInHand(*card));
                }
                self.check_claim(*claim, deck)?;
                self.check_target(player, *target)
            }
            (Phase::AwaitingPlay, _) => Err(Rejection::NoCardInPlay),
            (_, Proposal::Play { .. }) => Err(Rejection::CardAlreadyInPlay),
            (Phase::Held { seen: false }, Proposal::Look) => {
                if self.eligible_targets().is_empty() {
                    Err(Rejection::NoTargetsLeft)
                } else {
                    Ok(())
                }
            }
            (Phase::Held { seen: false }, Proposal::Pass { .. }) => Err(Rejection::PassWithoutLook),
            (Phase::Held { seen: false }, Proposal::Guess { .. }) => Ok(()),
            (Phase::Held { seen: true }, Proposal::Look) => Err(Rejection::AlreadyLooked),
            (Phase::Held { seen: true }, Proposal::Guess { .. }) => {
                Err(Rejection::MustPassAfterLook)
            }
            (Phase::Held { seen: true }, Proposal::Pass { target, claim }) => {
                self.check_claim(*claim, deck)?;
                self.check_target(player, *target)
            }
            (Phase::Resolved, _) => Err(Rejection::RoundResolved),
        }
    }

    fn check_claim(&self, claim: Card, deck: &DeckConfig) -> Result<(), Rejection> {
        if deck.contains(claim) {
            Ok(())
        } else {
            Err(Rejection::UnknownCreature(claim))
        }
    }

    fn check_target(&self, player: PlayerId, target: PlayerId) -> Result<(), Rejection> {
        if target == player {
            return Err(Rejection::TargetIsSelf);
        }
        if target >= self.seats() {
            return Err(Rejection::UnknownPlayer(target));
        }
        if !self.eligible_targets().contains(&target) {
            return Err(Rejection::TargetIneligible(target));
        }
        Ok(())
    }

    pub fn view_for(
        &self,
        me: PlayerId,
        players: &[String],
        states: &[PlayerState],
        deck: &DeckConfig,
    ) -> RoundView {
        let knows = self.knows(me);
        RoundView {
            me,
            players: players.to_vec(),
            hand: states.get(me).map(|s| s.hand().clone()).unwrap_or_default(),
            penalties: states.iter().map(|s| s.penalty().clone()).collect_vec(),
            creatures: deck.creatures(),
            holder: self.holder,
            claim: self.claim,
            claimant: self.claimant,
            known_card: if knows { self.card } else { None },
            history: self
                .history
                .iter()
                .map(|s| if knows { s.clone() } else { s.redacted() })
                .collect(),
            eligible_targets: self.eligible_targets(),
            legal: self.legal_actions(),
        }
    }
}
