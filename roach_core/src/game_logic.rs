use log::{debug, warn};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, DeckConfig},
    error::Rejection,
    game_state::Round,
    play::{guess_is_correct, Action, ForfeitCause, Proposal, Response, Step},
    player::{PlayerId, PlayerState},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Guess {
        guesser: PlayerId,
        claimant: PlayerId,
        guess: bool,
        correct: bool,
    },
    Forfeit {
        player: PlayerId,
        cause: ForfeitCause,
    },
}

/// How a round ended. `card` goes face up in front of `loser`; it is only missing when a
/// starter with an empty hand forfeited before playing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: usize,
    pub loser: PlayerId,
    pub card: Option<Card>,
    pub claim: Option<Card>,
    pub resolution: Resolution,
    pub history: Vec<Step>,
}

impl Round {
    pub fn apply(
        &mut self,
        player: PlayerId,
        response: Response,
        states: &mut [PlayerState],
        deck: &DeckConfig,
    ) -> Result<Option<RoundOutcome>, Rejection> {
        let hand = match states.get(player) {
            Some(state) if player < self.seats() => state.hand(),
            _ => return Err(Rejection::UnknownPlayer(player)),
        };
        self.validate(player, &response.proposal, hand, deck)?;
        let action = Action::from(&response.proposal);

        let outcome = match response.proposal {
            Proposal::Play {
                card,
                target,
                claim,
            } => {
                states[player].remove_from_hand(card)?;
                self.card = Some(card);
                self.hand_over(player, target, claim);
                None
            }
            Proposal::Look => None,
            Proposal::Pass { target, claim } => {
                self.hand_over(player, target, claim);
                None
            }
            Proposal::Guess { guess } => Some(self.resolve_guess(player, guess)?),
        };

        self.history.push(Step {
            player,
            action,
            card: self.card,
            reason: response.reason,
        });
        debug!(
            "round {}: player {} {:?}",
            self.number,
            player,
            self.history.last().map(|s| &s.action)
        );

        Ok(outcome.map(|(loser, resolution)| self.outcome(loser, resolution)))
    }

    /// Ends the round with `player` taking the card. Before anything was played a card from
    /// the forfeiter's hand is drawn at random instead.
    pub fn forfeit<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        cause: ForfeitCause,
        states: &mut [PlayerState],
        rng: &mut R,
    ) -> RoundOutcome {
        warn!("round {}: player {} forfeits, {}", self.number, player, cause);
        if let (None, Some(state)) = (self.card, states.get_mut(player)) {
            if let Some(&card) = state.hand().choose(rng) {
                self.card = state.remove_from_hand(card).ok();
            }
        }
        self.history.push(Step {
            player,
            action: Action::Forfeit {
                cause: cause.clone(),
            },
            card: self.card,
            reason: String::new(),
        });
        self.outcome(player, Resolution::Forfeit { player, cause })
    }

    fn hand_over(&mut self, player: PlayerId, target: PlayerId, claim: Card) {
        self.holder = target;
        self.claim = Some(claim);
        self.claimant = Some(player);
    }

    fn resolve_guess(
        &self,
        guesser: PlayerId,
        guess: bool,
    ) -> Result<(PlayerId, Resolution), Rejection> {
        let (card, claim, claimant) = match (self.card, self.claim, self.claimant) {
            (Some(card), Some(claim), Some(claimant)) => (card, claim, claimant),
            _ => return Err(Rejection::NoCardInPlay),
        };
        let correct = guess_is_correct(card, claim, guess);
        let loser = if correct { claimant } else { guesser };
        Ok((
            loser,
            Resolution::Guess {
                guesser,
                claimant,
                guess,
                correct,
            },
        ))
    }

    fn outcome(&self, loser: PlayerId, resolution: Resolution) -> RoundOutcome {
        RoundOutcome {
            round: self.number,
            loser,
            card: self.card,
            claim: self.claim,
            resolution,
            history: self.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::error::CollaboratorError;
    use crate::game_state::Phase;

    fn deck() -> DeckConfig {
        DeckConfig::new([(Card::Rat, 2), (Card::Bat, 2)])
    }

    fn states() -> Vec<PlayerState> {
        vec![
            PlayerState::new(vec![Card::Rat, Card::Bat]),
            PlayerState::new(vec![Card::Rat]),
            PlayerState::new(vec![Card::Bat]),
        ]
    }

    fn step(
        round: &mut Round,
        player: PlayerId,
        proposal: Proposal,
        states: &mut [PlayerState],
    ) -> Result<Option<RoundOutcome>, Rejection> {
        round.apply(player, Response::new(proposal, "test"), states, &deck())
    }

    #[test]
    fn caught_liar_should_take_the_card() {
        let mut states = states();
        let mut round = Round::new(1, 0, vec![true; 3]);
        let play = Proposal::Play {
            card: Card::Rat,
            target: 1,
            claim: Card::Bat,
        };
        assert_eq!(step(&mut round, 0, play, &mut states), Ok(None));
        assert_eq!(states[0].hand(), &vec![Card::Bat]);

        let outcome = step(&mut round, 1, Proposal::Guess { guess: false }, &mut states)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.loser, 0);
        assert_eq!(outcome.card, Some(Card::Rat));
        assert_eq!(
            outcome.resolution,
            Resolution::Guess {
                guesser: 1,
                claimant: 0,
                guess: false,
                correct: true
            }
        );
        assert_eq!(round.phase(), Phase::Resolved);
    }

    #[test]
    fn last_claimant_should_take_the_card_after_a_confirmed_truth() {
        let mut states = states();
        let mut round = Round::new(1, 0, vec![true; 3]);
        let play = Proposal::Play {
            card: Card::Rat,
            target: 1,
            claim: Card::Bat,
        };
        step(&mut round, 0, play, &mut states).unwrap();
        step(&mut round, 1, Proposal::Look, &mut states).unwrap();
        let pass = Proposal::Pass {
            target: 2,
            claim: Card::Rat,
        };
        step(&mut round, 1, pass, &mut states).unwrap();
        let outcome = step(&mut round, 2, Proposal::Guess { guess: true }, &mut states)
            .unwrap()
            .unwrap();

        assert_eq!(outcome.loser, 1);
        assert_eq!(outcome.claim, Some(Card::Rat));
        assert_eq!(outcome.history.len(), 4);
        assert!(matches!(outcome.history[0].action, Action::Play { .. }));
        assert!(matches!(outcome.history[3].action, Action::Guess { .. }));
    }

    #[test]
    fn wrong_guesser_should_take_the_card() {
        let mut states = states();
        let mut round = Round::new(1, 0, vec![true; 3]);
        let play = Proposal::Play {
            card: Card::Bat,
            target: 2,
            claim: Card::Bat,
        };
        step(&mut round, 0, play, &mut states).unwrap();
        let outcome = step(&mut round, 2, Proposal::Guess { guess: false }, &mut states)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.loser, 2);
    }

    #[test]
    fn rejected_move_should_leave_the_round_untouched() {
        let mut states = states();
        let mut round = Round::new(1, 0, vec![true; 3]);
        let play = Proposal::Play {
            card: Card::Rat,
            target: 1,
            claim: Card::Bat,
        };
        step(&mut round, 0, play.clone(), &mut states).unwrap();
        assert_eq!(
            step(&mut round, 1, play, &mut states),
            Err(Rejection::CardAlreadyInPlay)
        );
        assert_eq!(round.history().len(), 1);
        assert_eq!(states[1].hand(), &vec![Card::Rat]);
    }

    #[test]
    fn move_from_a_missing_seat_should_be_rejected() {
        let mut states = states();
        let mut round = Round::new(1, 0, vec![true; 3]);
        assert_eq!(
            step(&mut round, 9, Proposal::Look, &mut states),
            Err(Rejection::UnknownPlayer(9))
        );
        assert!(round.history().is_empty());
    }

    #[test]
    fn forfeit_should_hand_the_true_card_to_the_forfeiter() {
        let mut states = states();
        let mut round = Round::new(1, 0, vec![true; 3]);
        let play = Proposal::Play {
            card: Card::Rat,
            target: 1,
            claim: Card::Rat,
        };
        step(&mut round, 0, play, &mut states).unwrap();
        step(&mut round, 1, Proposal::Look, &mut states).unwrap();
        let rejection = step(&mut round, 1, Proposal::Guess { guess: true }, &mut states)
            .unwrap_err();
        let outcome = round.forfeit(
            1,
            ForfeitCause::IllegalMove(rejection),
            &mut states,
            &mut ChaCha8Rng::seed_from_u64(1),
        );

        assert_eq!(outcome.loser, 1);
        assert_eq!(outcome.card, Some(Card::Rat));
        assert_eq!(
            outcome.resolution,
            Resolution::Forfeit {
                player: 1,
                cause: ForfeitCause::IllegalMove(Rejection::MustPassAfterLook)
            }
        );
        assert!(round.is_resolved());
        assert!(round.knows(2));
    }

    #[test]
    fn forfeit_before_play_should_draw_from_the_hand() {
        let mut states = states();
        let mut round = Round::new(1, 0, vec![true; 3]);
        let outcome = round.forfeit(
            0,
            ForfeitCause::Collaborator(CollaboratorError::Disconnected),
            &mut states,
            &mut ChaCha8Rng::seed_from_u64(3),
        );
        let card = outcome.card.unwrap();
        assert!(card == Card::Rat || card == Card::Bat);
        assert_eq!(states[0].hand().len(), 1);
        assert_eq!(outcome.history.len(), 1);
    }

    #[test]
    fn forfeit_with_empty_hand_should_have_no_card() {
        let mut states = vec![PlayerState::new(vec![]), PlayerState::new(vec![Card::Rat])];
        let mut round = Round::new(1, 0, vec![true; 2]);
        let outcome = round.forfeit(
            0,
            ForfeitCause::IllegalMove(Rejection::NoCardInPlay),
            &mut states,
            &mut ChaCha8Rng::seed_from_u64(3),
        );
        assert_eq!(outcome.card, None);
    }

    fn any_card() -> impl Strategy<Value = Card> {
        prop::sample::select(Card::iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn prop_guess_penalises_claimant_iff_correct(
            card in any_card(),
            claim in any_card(),
            guess in any::<bool>(),
        ) {
            let deck = DeckConfig::standard();
            let mut states = vec![PlayerState::new(vec![card]), PlayerState::new(vec![card])];
            let mut round = Round::new(1, 0, vec![true; 2]);
            let play = Proposal::Play { card, target: 1, claim };
            round.apply(0, Response::new(play, ""), &mut states, &deck).unwrap();
            let outcome = round
                .apply(1, Response::new(Proposal::Guess { guess }, ""), &mut states, &deck)
                .unwrap()
                .unwrap();

            let correct = guess == (card == claim);
            prop_assert_eq!(outcome.loser, if correct { 0 } else { 1 });
            prop_assert_eq!(outcome.card, Some(card));
        }
    }
}
