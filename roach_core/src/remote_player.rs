use std::{
    sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    thread,
    time::{Duration, Instant},
};

use log::debug;

use crate::{
    error::CollaboratorError,
    event::{Event, RoundView},
    events::{GameEvent, NotifyEvent, RawResponse},
    play::Response,
    player::{Player, PlayerId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub request: u64,
    pub result: Result<RawResponse, CollaboratorError>,
}

/// A player whose moves arrive over a channel. Waiting is bounded by `timeout`; a late,
/// missing or unreadable reply is reported as an error and never retried.
pub struct RemotePlayer {
    name: String,
    sender: Sender<GameEvent>,
    receiver: Receiver<Reply>,
    timeout: Duration,
    request: u64,
}

impl RemotePlayer {
    pub fn new(
        name: String,
        sender: Sender<GameEvent>,
        receiver: Receiver<Reply>,
        timeout: Duration,
    ) -> Self {
        RemotePlayer {
            name,
            sender,
            receiver,
            timeout,
            request: 0,
        }
    }
}

impl Player for RemotePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_game(&mut self, seat: PlayerId, seed: u64) {
        if self.sender.send(GameEvent::StartGame { seat, seed }).is_err() {
            debug!("{} is no longer listening", self.name);
        }
    }

    fn notify(&self, game_log: &[Event], players: &[String]) {
        let event = GameEvent::Notify(NotifyEvent {
            players: players.to_vec(),
            game_log: game_log.to_vec(),
        });
        if self.sender.send(event).is_err() {
            debug!("{} is no longer listening", self.name);
        }
    }

    fn obtain_move(&mut self, view: &RoundView) -> Result<Response, CollaboratorError> {
        self.request += 1;
        let request = self.request;
        self.sender
            .send(GameEvent::ObtainMove {
                request,
                view: view.clone(),
            })
            .map_err(|_| CollaboratorError::Disconnected)?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let reply = self.receiver.recv_timeout(left).map_err(|e| match e {
                RecvTimeoutError::Timeout => CollaboratorError::Timeout(self.timeout),
                RecvTimeoutError::Disconnected => CollaboratorError::Disconnected,
            })?;
            if reply.request == request {
                return reply.result?.into_response(view);
            }
            debug!(
                "{} answered request {} too late, waiting for {}",
                self.name, reply.request, request
            );
        }
    }
}

/// Runs `player` on its own thread behind a [`RemotePlayer`] that waits at most `timeout`
/// for each move.
pub fn spawn_player<P>(mut player: P, timeout: Duration) -> RemotePlayer
where
    P: Player + Send + 'static,
{
    let name = player.name().to_string();
    let (event_tx, event_rx) = channel::<GameEvent>();
    let (reply_tx, reply_rx) = channel::<Reply>();

    thread::spawn(move || {
        for event in event_rx {
            match event {
                GameEvent::StartGame { seat, seed } => player.start_game(seat, seed),
                GameEvent::Notify(n) => player.notify(&n.game_log, &n.players),
                GameEvent::ObtainMove { request, view } => {
                    let result = player.obtain_move(&view).map(|r| RawResponse::from(&r));
                    if reply_tx.send(Reply { request, result }).is_err() {
                        break;
                    }
                }
            }
        }
    });

    RemotePlayer::new(name, event_tx, reply_rx, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::{Card, DeckConfig},
        game_state::Round,
        play::Proposal,
        player::PlayerState,
        random_playing_computer::RandomPlayingComputer,
    };

    #[test]
    fn spawned_player_should_answer_through_the_channel() {
        let mut remote = spawn_player(RandomPlayingComputer::new("a", 3), Duration::from_secs(5));
        assert_eq!(remote.name(), "a");

        let response = remote.obtain_move(&opening_view()).unwrap();
        assert!(matches!(
            response.proposal,
            Proposal::Play {
                card: Card::Rat,
                target: 1,
                ..
            }
        ));
    }

    #[test]
    fn silent_player_should_time_out() {
        let (sender, _requests) = channel();
        let (_replies, receiver) = channel();
        let mut remote = RemotePlayer::new(
            "mute".to_string(),
            sender,
            receiver,
            Duration::from_millis(20),
        );
        assert_eq!(
            remote.obtain_move(&opening_view()),
            Err(CollaboratorError::Timeout(Duration::from_millis(20)))
        );
    }

    #[test]
    fn vanished_player_should_be_disconnected() {
        let (sender, requests) = channel();
        let (_replies, receiver) = channel();
        drop(requests);
        let mut remote = RemotePlayer::new(
            "gone".to_string(),
            sender,
            receiver,
            Duration::from_millis(20),
        );
        assert_eq!(
            remote.obtain_move(&opening_view()),
            Err(CollaboratorError::Disconnected)
        );
    }

    #[test]
    fn reply_to_an_older_request_should_be_ignored() {
        let (sender, _requests) = channel();
        let (replies, receiver) = channel();
        let mut remote = RemotePlayer::new(
            "slow".to_string(),
            sender,
            receiver,
            Duration::from_millis(20),
        );
        replies
            .send(Reply {
                request: 0,
                result: RawResponse::from_json(r#"{"action": "GUESS", "guess": true}"#),
            })
            .unwrap();
        assert!(matches!(
            remote.obtain_move(&opening_view()),
            Err(CollaboratorError::Timeout(_))
        ));
    }

    #[test]
    fn late_answer_should_not_be_taken_for_the_next_move() {
        let mut remote = spawn_player(Dawdler { calls: 0 }, Duration::from_millis(100));

        assert_eq!(
            remote.obtain_move(&opening_view()),
            Err(CollaboratorError::Timeout(Duration::from_millis(100)))
        );
        let response = remote.obtain_move(&opening_view()).unwrap();
        assert_eq!(response.proposal, Proposal::Guess { guess: true });
        assert_eq!(response.reason, "second");
    }

    #[test]
    fn unreadable_reply_should_be_malformed() {
        let (sender, _requests) = channel();
        let (replies, receiver) = channel();
        let mut remote = RemotePlayer::new(
            "chatty".to_string(),
            sender,
            receiver,
            Duration::from_secs(1),
        );
        let reply_thread = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            replies
                .send(Reply {
                    request: 1,
                    result: RawResponse::from_json("I'd rather not say"),
                })
                .unwrap();
        });
        assert!(matches!(
            remote.obtain_move(&opening_view()),
            Err(CollaboratorError::Malformed(_))
        ));
        reply_thread.join().unwrap();
    }

    // Infra ----------------------------------------------------------------

    fn opening_view() -> RoundView {
        let names = vec!["a".to_string(), "b".to_string()];
        let states = vec![
            PlayerState::new(vec![Card::Rat]),
            PlayerState::new(vec![Card::Bat]),
        ];
        Round::new(1, 0, vec![true; 2]).view_for(0, &names, &states, &DeckConfig::standard())
    }

    /// Overruns the timeout on its first move only.
    struct Dawdler {
        calls: usize,
    }

    impl Player for Dawdler {
        fn name(&self) -> &str {
            "dawdler"
        }

        fn notify(&self, _game_log: &[Event], _players: &[String]) {}

        fn obtain_move(&mut self, _view: &RoundView) -> Result<Response, CollaboratorError> {
            self.calls += 1;
            if self.calls == 1 {
                thread::sleep(Duration::from_millis(150));
                let play = Proposal::Play {
                    card: Card::Rat,
                    target: 1,
                    claim: Card::Bat,
                };
                return Ok(Response::new(play, "first"));
            }
            Ok(Response::new(Proposal::Guess { guess: true }, "second"))
        }
    }
}
