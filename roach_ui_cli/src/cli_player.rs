use std::{
    cell::Cell,
    io::{self, BufRead, Write},
    str::FromStr,
};

use itertools::Itertools;

use roach_core::{
    card::Card,
    error::CollaboratorError,
    event::{Event, RoundView},
    game_lobby::GameResult,
    play::{ActionKind, Proposal, Response},
    player::{Player, PlayerId},
};

static RULES: &str = "
*** Cockroach Poker ***
Everybody is dealt a hand of creature cards. The player starting a round gives one card face down
to another player and claims what creature it is; the claim may be a lie. The receiver either
says whether the claim is true or false, or looks at the card and passes it on to somebody who
has not held it yet, with a claim of their own. A right answer sends the card to the one who made
the claim, a wrong answer to the one who answered. The card lands face up in that player's
penalty pile. Whoever collects too many of one creature, or runs out of cards, is out.";

#[derive(Debug, PartialEq)]
enum CliAction {
    Quit,
    Rules,
    Help,
    Action(ActionKind),
    Card(Card),
    Player(PlayerId),
    Answer(bool),
}

#[derive(Debug, PartialEq, Eq)]
struct ParseActionError;

impl CliAction {
    fn info(&self, players: &[String]) -> String {
        match self {
            CliAction::Quit => "quit".to_string(),
            CliAction::Rules => "display rules".to_string(),
            CliAction::Help => "display the table".to_string(),
            CliAction::Action(ActionKind::Play) => "give a card away".to_string(),
            CliAction::Action(ActionKind::Look) => "look at the card and pass it on".to_string(),
            CliAction::Action(ActionKind::Pass) => "pass the card on".to_string(),
            CliAction::Action(ActionKind::Guess) => "judge the claim".to_string(),
            CliAction::Card(c) => c.to_string(),
            CliAction::Player(id) => players
                .get(*id)
                .cloned()
                .unwrap_or_else(|| format!("player {}", id)),
            CliAction::Answer(true) => "the claim is true".to_string(),
            CliAction::Answer(false) => "the claim is a lie".to_string(),
        }
    }

    fn cmd_str(&self) -> String {
        match self {
            CliAction::Quit => "q".to_string(),
            CliAction::Rules => "r".to_string(),
            CliAction::Help => "h".to_string(),
            CliAction::Action(kind) => kind.to_string().to_lowercase(),
            CliAction::Card(c) => c.to_string().to_lowercase(),
            CliAction::Player(id) => id.to_string(),
            CliAction::Answer(true) => "yes".to_string(),
            CliAction::Answer(false) => "no".to_string(),
        }
    }
}

impl FromStr for CliAction {
    type Err = ParseActionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "q" => Ok(CliAction::Quit),
            "r" => Ok(CliAction::Rules),
            "h" => Ok(CliAction::Help),
            "play" => Ok(CliAction::Action(ActionKind::Play)),
            "look" => Ok(CliAction::Action(ActionKind::Look)),
            "pass" => Ok(CliAction::Action(ActionKind::Pass)),
            "guess" => Ok(CliAction::Action(ActionKind::Guess)),
            "yes" | "y" | "true" => Ok(CliAction::Answer(true)),
            "no" | "n" | "false" => Ok(CliAction::Answer(false)),
            other => {
                if let Ok(c) = Card::from_str(other) {
                    Ok(CliAction::Card(c))
                } else if let Ok(p) = usize::from_str(other) {
                    Ok(CliAction::Player(p))
                } else {
                    Err(ParseActionError)
                }
            }
        }
    }
}

pub struct CliPlayer {
    name: String,
    printed: Cell<usize>,
    quit: bool,
}

impl CliPlayer {
    pub fn new(name: String) -> CliPlayer {
        CliPlayer {
            name,
            printed: Cell::new(0),
            quit: false,
        }
    }

    /// Asks until one of `cmds` is entered; `None` once the user quits or stdin is closed.
    fn query_user(&self, mut cmds: Vec<CliAction>, prompt: &str, view: &RoundView) -> Option<CliAction> {
        cmds.extend([CliAction::Help, CliAction::Rules, CliAction::Quit]);
        loop {
            print!("\n{}\n", prompt);
            for cmd in &cmds {
                println!("- [{}]: {}", cmd.cmd_str(), cmd.info(&view.players));
            }
            print!(">");
            io::stdout().flush().ok()?;
            let line = io::stdin().lock().lines().next()?.ok()?;
            match CliAction::from_str(&line) {
                Ok(CliAction::Quit) => return None,
                Ok(CliAction::Rules) => println!("{}", RULES),
                Ok(CliAction::Help) => self.print_table(view),
                Ok(action) if cmds.contains(&action) => return Some(action),
                _ => println!("'{}' is not one of the options", line.trim()),
            }
        }
    }

    fn prompt_action(&self, view: &RoundView) -> Option<ActionKind> {
        if let [only] = view.legal.as_slice() {
            return Some(*only);
        }
        let cmds = view.legal.iter().map(|&k| CliAction::Action(k)).collect_vec();
        match self.query_user(cmds, "What do you do?", view)? {
            CliAction::Action(kind) => Some(kind),
            _ => None,
        }
    }

    fn prompt_card(&self, cards: &[Card], prompt: &str, view: &RoundView) -> Option<Card> {
        let cmds = cards.iter().unique().map(|&c| CliAction::Card(c)).collect_vec();
        match self.query_user(cmds, prompt, view)? {
            CliAction::Card(card) => Some(card),
            _ => None,
        }
    }

    fn prompt_target(&self, view: &RoundView) -> Option<PlayerId> {
        if let [only] = view.eligible_targets.as_slice() {
            return Some(*only);
        }
        let cmds = view
            .eligible_targets
            .iter()
            .map(|&p| CliAction::Player(p))
            .collect_vec();
        match self.query_user(cmds, "Who gets the card?", view)? {
            CliAction::Player(p) => Some(p),
            _ => None,
        }
    }

    fn prompt_guess(&self, view: &RoundView) -> Option<bool> {
        let prompt = format!(
            "{} says it is a {}. Is that true?",
            view.claimant
                .map(|c| CliAction::Player(c).info(&view.players))
                .unwrap_or_default(),
            view.claim.map(|c| c.to_string()).unwrap_or_default()
        );
        let cmds = vec![CliAction::Answer(true), CliAction::Answer(false)];
        match self.query_user(cmds, &prompt, view)? {
            CliAction::Answer(guess) => Some(guess),
            _ => None,
        }
    }

    fn prompt_proposal(&self, view: &RoundView) -> Option<Proposal> {
        let proposal = match self.prompt_action(view)? {
            ActionKind::Play => {
                let card = self.prompt_card(&view.hand, "Which card do you give away?", view)?;
                let target = self.prompt_target(view)?;
                let claim = self.prompt_card(&view.creatures, "What do you claim it is?", view)?;
                Proposal::Play { card, target, claim }
            }
            ActionKind::Look => Proposal::Look,
            ActionKind::Pass => {
                if let Some(card) = view.known_card {
                    println!("The card is a {}.", card);
                }
                let target = self.prompt_target(view)?;
                let claim = self.prompt_card(&view.creatures, "What do you claim it is?", view)?;
                Proposal::Pass { target, claim }
            }
            ActionKind::Guess => Proposal::Guess {
                guess: self.prompt_guess(view)?,
            },
        };
        Some(proposal)
    }

    fn print_table(&self, view: &RoundView) {
        println!("================================================");
        for (seat, name) in view.players.iter().enumerate() {
            let pile = view.penalties[seat]
                .iter()
                .map(|(card, count)| format!("{}x{}", count, card))
                .join(" ");
            println!("{:>2} {:<12} {}", seat, name, pile);
        }
        println!("Your hand: {}", view.hand.iter().sorted().join(", "));
    }

    fn format_event(&self, event: &Event, players: &[String]) -> String {
        let name = |p: PlayerId| CliAction::Player(p).info(players);
        match event {
            Event::RoundStarted { round, starter } => {
                format!("~ Round {}: {} starts", round, name(*starter))
            }
            Event::Step(step) => format!("~ {}", step.describe(players)),
            Event::RoundResolved { loser, card } => format!(
                "~ {} takes the {}",
                name(*loser),
                card.map(|c| c.to_string()).unwrap_or_else(|| "blame".to_string())
            ),
            Event::Eliminated(p) => format!("~ {} is out", name(*p)),
            Event::GameOver(GameResult::Winner(p)) => format!("Winner is {}", name(*p)),
            Event::GameOver(GameResult::Losers(losers)) => format!(
                "Game over, {} lost",
                losers.iter().map(|&p| name(p)).join(", ")
            ),
            Event::GameOver(GameResult::Draw(reason)) => format!("Draw: {:?}", reason),
        }
    }
}

impl Player for CliPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_game(&mut self, seat: PlayerId, _seed: u64) {
        println!("\n*** New game, you sit at seat {} ***", seat);
        self.printed.set(0);
    }

    fn notify(&self, game_log: &[Event], players: &[String]) {
        for event in game_log.iter().skip(self.printed.get()) {
            println!("{}", self.format_event(event, players));
        }
        self.printed.set(game_log.len());
    }

    fn obtain_move(&mut self, view: &RoundView) -> Result<Response, CollaboratorError> {
        if self.quit {
            return Err(CollaboratorError::Disconnected);
        }
        self.print_table(view);
        match self.prompt_proposal(view) {
            Some(proposal) => Ok(Response::new(proposal, "")),
            None => {
                self.quit = true;
                Err(CollaboratorError::Disconnected)
            }
        }
    }
}
