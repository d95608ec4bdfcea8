use itertools::Itertools;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, Deck},
    config::{EndCondition, GameConfig},
    error::SetupError,
    event::{filter_event, Event, EventEntry, EventVisibility},
    game_logic::RoundOutcome,
    game_state::Round,
    play::ForfeitCause,
    player::{Player, PlayerId, PlayerState},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    RoundLimit(usize),
    /// The last round knocked out everyone who was left.
    AllEliminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(PlayerId),
    Losers(Vec<PlayerId>),
    Draw(DrawReason),
}

impl GameResult {
    pub fn losers(&self, seats: usize) -> Vec<PlayerId> {
        match self {
            GameResult::Winner(winner) => (0..seats).filter(|p| p != winner).collect(),
            GameResult::Losers(losers) => losers.clone(),
            GameResult::Draw(_) => vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameReport {
    pub seed: u64,
    pub result: GameResult,
    pub rounds: Vec<RoundOutcome>,
    pub players: Vec<PlayerState>,
}

pub struct GameLobby {
    players: Vec<Box<dyn Player>>,
    config: GameConfig,
}

impl GameLobby {
    pub fn new(config: GameConfig) -> Self {
        GameLobby {
            players: vec![],
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn add_player<C, T>(&mut self, player_constructor: C)
    where
        C: FnOnce() -> T,
        T: Player + 'static,
    {
        let player = player_constructor();
        self.players.push(Box::new(player));
    }

    pub fn add_boxed(&mut self, player: Box<dyn Player>) {
        self.players.push(player);
    }

    pub fn player_names(&self) -> Vec<String> {
        self.players
            .iter()
            .map(|p| p.name().to_string())
            .collect::<Vec<_>>()
    }

    /// Plays one game to the end. Only setup problems are errors; anything a player does
    /// wrong is settled inside the game.
    pub fn play_game(&mut self, seed: u64) -> Result<GameReport, SetupError> {
        self.config.validate(self.players.len())?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut deck = Deck::new(&self.config.deck);
        deck.shuffle(&mut rng);
        let hands = deck.deal(self.players.len(), self.config.remainder)?;
        self.play_dealt(hands, seed, rng)
    }

    /// Plays a game from hands dealt elsewhere, e.g. to replay a known deal.
    pub fn play_hands(
        &mut self,
        hands: Vec<Vec<Card>>,
        seed: u64,
    ) -> Result<GameReport, SetupError> {
        self.config.validate(self.players.len())?;
        if hands.len() != self.players.len() {
            return Err(SetupError::InvalidConfig(format!(
                "{} hands for {} players",
                hands.len(),
                self.players.len()
            )));
        }
        if hands.iter().any(Vec::is_empty) {
            return Err(SetupError::DeckExhausted {
                cards: hands.iter().map(Vec::len).sum(),
                players: hands.len(),
            });
        }
        self.play_dealt(hands, seed, ChaCha8Rng::seed_from_u64(seed))
    }

    fn play_dealt(
        &mut self,
        hands: Vec<Vec<Card>>,
        seed: u64,
        mut rng: ChaCha8Rng,
    ) -> Result<GameReport, SetupError> {
        let seats = self.players.len();
        let threshold = self.config.penalty_threshold;
        let names = self.player_names();
        let mut states = hands.into_iter().map(PlayerState::new).collect_vec();
        for (seat, player) in self.players.iter_mut().enumerate() {
            player.start_game(seat, seed);
        }

        let mut starter = match self.config.first_starter {
            Some(seat) => seat,
            None => rng.gen_range(0..seats),
        };
        let mut game_log: Vec<EventEntry> = vec![];
        let mut rounds: Vec<RoundOutcome> = vec![];
        info!("new game with seed {}: {}", seed, names.join(", "));

        let result = loop {
            if let Some(result) = self.game_result(&states, rounds.len()) {
                break result;
            }

            starter = next_in_game(&states, starter, threshold);
            let was_in_game = states.iter().map(|s| !s.is_eliminated(threshold)).collect_vec();
            let outcome = self.play_round(
                rounds.len() + 1,
                starter,
                &mut states,
                &mut rng,
                &mut game_log,
            );

            if let Some(card) = outcome.card {
                states[outcome.loser].add_to_penalty(card);
            }
            info!(
                "round {}: {} takes the {}",
                outcome.round,
                names[outcome.loser],
                outcome
                    .card
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "blame".to_string())
            );
            self.log_public(
                &mut game_log,
                outcome.round,
                Event::RoundResolved {
                    loser: outcome.loser,
                    card: outcome.card,
                },
            );
            for (seat, state) in states.iter().enumerate() {
                if was_in_game[seat] && state.is_eliminated(threshold) {
                    info!("{} is out: {}", names[seat], state.describe_penalty());
                    self.log_public(&mut game_log, outcome.round, Event::Eliminated(seat));
                }
            }
            self.notify_all(&game_log);

            starter = self
                .config
                .starter_policy
                .next(starter, outcome.loser, seats);
            rounds.push(outcome);
        };

        info!("game over: {:?}", result);
        self.log_public(&mut game_log, rounds.len(), Event::GameOver(result.clone()));
        self.notify_all(&game_log);

        Ok(GameReport {
            seed,
            result,
            rounds,
            players: states,
        })
    }

    fn play_round(
        &mut self,
        number: usize,
        starter: PlayerId,
        states: &mut [PlayerState],
        rng: &mut ChaCha8Rng,
        game_log: &mut Vec<EventEntry>,
    ) -> RoundOutcome {
        let threshold = self.config.penalty_threshold;
        let names = self.player_names();
        let in_game = states.iter().map(|s| !s.is_eliminated(threshold)).collect_vec();
        let mut round = Round::new(number, starter, in_game);
        info!("round {}: {} starts", number, names[starter]);
        self.log_public(game_log, number, Event::RoundStarted { round: number, starter });

        loop {
            debug_assert!(
                round.history().len() <= 2 * round.seats(),
                "round {} is not resolving",
                number
            );
            let player = round.holder();
            let view = round.view_for(player, &names, states, &self.config.deck);
            let applied = match self.players[player].obtain_move(&view) {
                Ok(response) => {
                    debug!("{} says: '{}'", names[player], response.reason);
                    round
                        .apply(player, response, states, &self.config.deck)
                        .map_err(ForfeitCause::IllegalMove)
                }
                Err(e) => Err(ForfeitCause::Collaborator(e)),
            };
            let outcome = match applied {
                Ok(outcome) => outcome,
                Err(cause) => Some(round.forfeit(player, cause, states, rng)),
            };

            // a look changes what earlier steps reveal, a resolution reveals everything
            let visibility = if round.is_resolved() {
                EventVisibility::Public
            } else {
                EventVisibility::Private(round.knowers())
            };
            for entry in game_log.iter_mut().filter(|e| e.round == number) {
                if let Event::Step(_) = entry.event {
                    entry.visibility = visibility.clone();
                }
            }
            if let Some(step) = round.history().last() {
                info!("{}", step.describe(&names));
                game_log.push(EventEntry {
                    round: number,
                    visibility,
                    event: Event::Step(step.clone()),
                });
            }

            match outcome {
                Some(outcome) => return outcome,
                None => self.notify_all(game_log),
            }
        }
    }

    fn game_result(&self, states: &[PlayerState], rounds_played: usize) -> Option<GameResult> {
        let threshold = self.config.penalty_threshold;
        let (in_game, out): (Vec<PlayerId>, Vec<PlayerId>) =
            (0..states.len()).partition(|&p| !states[p].is_eliminated(threshold));

        let result = match self.config.end_condition {
            EndCondition::LastStanding => match in_game.as_slice() {
                [] => Some(GameResult::Draw(DrawReason::AllEliminated)),
                [winner] => Some(GameResult::Winner(*winner)),
                _ => None,
            },
            EndCondition::FirstLoser if out.is_empty() => None,
            EndCondition::FirstLoser => Some(GameResult::Losers(out)),
        };
        result.or_else(|| match self.config.round_limit {
            Some(limit) if rounds_played >= limit => {
                Some(GameResult::Draw(DrawReason::RoundLimit(limit)))
            }
            _ => None,
        })
    }

    fn log_public(&self, game_log: &mut Vec<EventEntry>, round: usize, event: Event) {
        game_log.push(EventEntry {
            round,
            visibility: EventVisibility::Public,
            event,
        });
    }

    fn notify_all(&self, game_log: &[EventEntry]) {
        let names = self.player_names();
        for (i, p) in self.players.iter().enumerate() {
            p.notify(&filter_event(game_log, Some(i)), &names);
        }
    }
}

fn next_in_game(states: &[PlayerState], from: PlayerId, threshold: usize) -> PlayerId {
    (0..states.len())
        .map(|offset| (from + offset) % states.len())
        .find(|&p| !states[p].is_eliminated(threshold))
        .unwrap_or(from)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: Vec<usize>,
    pub losses: Vec<usize>,
    pub draws: usize,
}

impl Tally {
    pub fn new(seats: usize) -> Self {
        Tally {
            wins: vec![0; seats],
            losses: vec![0; seats],
            draws: 0,
        }
    }

    pub fn record(&mut self, result: &GameResult) {
        let seats = self.wins.len();
        let losers = result.losers(seats);
        match result {
            GameResult::Draw(_) => self.draws += 1,
            _ => {
                for p in 0..seats {
                    if losers.contains(&p) {
                        self.losses[p] += 1;
                    } else {
                        self.wins[p] += 1;
                    }
                }
            }
        }
    }
}

impl GameLobby {
    pub fn play_games(
        &mut self,
        games: usize,
        base_seed: u64,
    ) -> Result<(Tally, Vec<GameReport>), SetupError> {
        let mut tally = Tally::new(self.players.len());
        let mut reports = Vec::with_capacity(games);
        for n in 0..games {
            info!("game {} of {}", n + 1, games);
            let report = self.play_game(base_seed.wrapping_add(n as u64))?;
            tally.record(&report.result);
            reports.push(report);
        }
        Ok((tally, reports))
    }
}
