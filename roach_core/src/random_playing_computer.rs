use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    card::Card,
    error::CollaboratorError,
    event::{Event, RoundView},
    play::{ActionKind, Proposal, Response},
    player::{Player, PlayerId},
};

/// Picks a random legal move. Lies about half of the time and looks rather than guesses
/// while somebody is left to pass to.
pub struct RandomPlayingComputer {
    name: String,
    rng: ChaCha8Rng,
    bluff_rate: f64,
    look_rate: f64,
}

impl RandomPlayingComputer {
    pub fn new(name: &str, seed: u64) -> Self {
        RandomPlayingComputer {
            name: name.to_string(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            bluff_rate: 0.5,
            look_rate: 0.6,
        }
    }

    pub fn with_rates(mut self, bluff_rate: f64, look_rate: f64) -> Self {
        self.bluff_rate = bluff_rate.clamp(0.0, 1.0);
        self.look_rate = look_rate.clamp(0.0, 1.0);
        self
    }

    fn claim_for(&mut self, view: &RoundView, truth: Option<Card>) -> Card {
        match truth {
            Some(card) if !self.rng.gen_bool(self.bluff_rate) => card,
            _ => view
                .creatures
                .choose(&mut self.rng)
                .copied()
                .or(truth)
                .unwrap_or(Card::Cockroach),
        }
    }
}

impl Player for RandomPlayingComputer {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_game(&mut self, seat: PlayerId, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.rng.set_stream(seat as u64);
    }

    fn notify(&self, _game_log: &[Event], _players: &[String]) {}

    fn obtain_move(&mut self, view: &RoundView) -> Result<Response, CollaboratorError> {
        let target = view.eligible_targets.choose(&mut self.rng).copied();
        let proposal = if view.may(ActionKind::Play) {
            let card = *view
                .hand
                .choose(&mut self.rng)
                .ok_or_else(|| CollaboratorError::Malformed("nothing in hand".to_string()))?;
            Proposal::Play {
                card,
                target: target.unwrap_or(view.me),
                claim: self.claim_for(view, Some(card)),
            }
        } else if view.may(ActionKind::Pass) {
            Proposal::Pass {
                target: target.unwrap_or(view.me),
                claim: self.claim_for(view, view.known_card),
            }
        } else if view.may(ActionKind::Look) && self.rng.gen_bool(self.look_rate) {
            Proposal::Look
        } else {
            Proposal::Guess {
                guess: self.rng.gen_bool(0.5),
            }
        };
        Ok(Response::new(proposal, "random"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::DeckConfig,
        game_state::Round,
        player::PlayerState,
    };

    #[test]
    fn random_computer_should_only_propose_legal_moves() {
        let deck = DeckConfig::standard();
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()];
        let mut computers = (0..4)
            .map(|i| RandomPlayingComputer::new(&names[i], i as u64))
            .collect::<Vec<_>>();

        for seed in 0..50 {
            let mut states = vec![
                PlayerState::new(vec![Card::Rat, Card::Fly]),
                PlayerState::new(vec![Card::Bat]),
                PlayerState::new(vec![Card::Frog]),
                PlayerState::new(vec![Card::Spider]),
            ];
            let mut round = Round::new(seed, seed % 4, vec![true; 4]);
            loop {
                let player = round.holder();
                let view = round.view_for(player, &names, &states, &deck);
                let response = computers[player].obtain_move(&view).unwrap();
                let outcome = round
                    .apply(player, response, &mut states, &deck)
                    .expect("random computer proposed an illegal move");
                if outcome.is_some() {
                    break;
                }
            }
        }
    }

    #[test]
    fn honest_computer_should_claim_the_card_it_plays() {
        let deck = DeckConfig::standard();
        let names = vec!["a".to_string(), "b".to_string()];
        let states = vec![
            PlayerState::new(vec![Card::Scorpion]),
            PlayerState::new(vec![Card::Bat]),
        ];
        let round = Round::new(1, 0, vec![true; 2]);
        let mut computer = RandomPlayingComputer::new("a", 1).with_rates(0.0, 1.0);
        let response = computer
            .obtain_move(&round.view_for(0, &names, &states, &deck))
            .unwrap();
        assert_eq!(
            response.proposal,
            Proposal::Play {
                card: Card::Scorpion,
                target: 1,
                claim: Card::Scorpion
            }
        );
    }
}
