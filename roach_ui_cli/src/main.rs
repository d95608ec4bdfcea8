use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use itertools::Itertools;
use log::{error, info};

use cli_player::CliPlayer;
use roach_core::{
    config::GameConfig, error::SetupError, game_lobby::Tally, player::Player,
    random_playing_computer::RandomPlayingComputer, remote_player::spawn_player, run_games,
};

mod cli_player;

/// Cockroach Poker in the terminal, or many games between computers.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with the game settings; missing keys keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed of the first game; the n-th game uses seed + n.
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, default_value_t = 1)]
    games: usize,

    /// Join the game as a human player with this name.
    #[arg(long)]
    human: Option<String>,

    /// Names of the computer players, separated by commas.
    #[arg(long, value_delimiter = ',', default_values_t = ["Ada".to_string(), "Bob".to_string(), "Cyd".to_string()])]
    computers: Vec<String>,
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig, SetupError> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| {
        SetupError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text)
        .map_err(|e| SetupError::InvalidConfig(format!("{}: {}", path.display(), e)))
}

fn run(args: Args) -> Result<(Vec<String>, Tally), SetupError> {
    let config = load_config(args.config.as_ref())?;
    let seed = args
        .seed
        .or(config.seed)
        .unwrap_or_else(rand::random::<u64>);
    info!("base seed {}", seed);

    let mut players: Vec<Box<dyn Player>> = vec![];
    if let Some(name) = args.human {
        players.push(Box::new(CliPlayer::new(name)));
    }
    for (i, name) in args.computers.iter().enumerate() {
        let computer = RandomPlayingComputer::new(name, seed.wrapping_add(i as u64));
        players.push(Box::new(spawn_player(computer, config.move_timeout())));
    }
    let names = players.iter().map(|p| p.name().to_string()).collect_vec();

    let tally = run_games(config, players, args.games, seed)?;
    Ok((names, tally))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let games = args.games;

    match run(args) {
        Ok((names, tally)) => {
            println!("\nAfter {} games:", games);
            for (seat, name) in names.iter().enumerate() {
                println!(
                    "{:<12} {} won, {} lost",
                    name, tally.wins[seat], tally.losses[seat]
                );
            }
            if tally.draws > 0 {
                println!("{} drawn", tally.draws);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
