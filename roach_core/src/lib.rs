use config::GameConfig;
use error::SetupError;
use game_lobby::GameLobby;
use game_lobby::Tally;
use player::Player;

pub mod card;
pub mod config;
pub mod error;
pub mod event;
pub mod events;
pub mod game_lobby;
mod game_logic;
pub mod game_state;
pub mod play;
pub mod player;
pub mod random_playing_computer;
pub mod remote_player;

pub use game_logic::{Resolution, RoundOutcome};

pub fn run_games(
    config: GameConfig,
    players: Vec<Box<dyn Player>>,
    games: usize,
    base_seed: u64,
) -> Result<Tally, SetupError> {
    let mut lobby = GameLobby::new(config);
    for player in players {
        lobby.add_boxed(player);
    }
    let (tally, _) = lobby.play_games(games, base_seed)?;
    Ok(tally)
}
