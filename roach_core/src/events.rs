use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    card::Card,
    error::CollaboratorError,
    event::{Event, RoundView},
    play::{ActionKind, Proposal, Response},
    player::PlayerId,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum GameEvent {
    StartGame { seat: PlayerId, seed: u64 },
    Notify(NotifyEvent),
    /// `request` is echoed in the reply so late answers can be told apart.
    ObtainMove { request: u64, view: RoundView },
}

#[derive(Default, Debug, Clone, Deserialize, Serialize)]
pub struct NotifyEvent {
    pub players: Vec<String>,
    pub game_log: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawTarget {
    Seat(PlayerId),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawGuess {
    Flag(bool),
    Text(String),
}

/// A move as an external agent writes it, with every field optional. Nothing in here is
/// trusted until [`RawResponse::into_response`] has checked it.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<RawTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guess: Option<RawGuess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn malformed(message: String) -> CollaboratorError {
    CollaboratorError::Malformed(message)
}

impl RawResponse {
    /// Parses the first `{` to the last `}` of `text`, ignoring any chatter around it.
    pub fn from_json(text: &str) -> Result<Self, CollaboratorError> {
        let object = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => return Err(malformed("no JSON object found".to_string())),
        };
        serde_json::from_str(object).map_err(|e| malformed(e.to_string()))
    }

    /// Turns the raw fields into a typed move for the seat described by `view`. When the
    /// action is left out it is inferred only if a single action is legal.
    pub fn into_response(self, view: &RoundView) -> Result<Response, CollaboratorError> {
        let kind = match &self.action {
            Some(action) => parse_kind(action)?,
            None => match view.legal.as_slice() {
                [only] => *only,
                _ => return Err(malformed("missing key 'action'".to_string())),
            },
        };
        let proposal = match kind {
            ActionKind::Play => Proposal::Play {
                card: parse_card("card", self.card.as_deref())?,
                target: resolve_target(self.target.as_ref(), view)?,
                claim: parse_card("claim", self.claim.as_deref())?,
            },
            ActionKind::Look => Proposal::Look,
            ActionKind::Pass => Proposal::Pass {
                target: resolve_target(self.target.as_ref(), view)?,
                claim: parse_card("claim", self.claim.as_deref())?,
            },
            ActionKind::Guess => Proposal::Guess {
                guess: parse_guess(self.guess.as_ref())?,
            },
        };
        Ok(Response {
            proposal,
            reason: self.reason.unwrap_or_default(),
        })
    }
}

impl From<&Response> for RawResponse {
    fn from(response: &Response) -> Self {
        let mut raw = RawResponse {
            action: Some(response.proposal.kind().to_string()),
            reason: Some(response.reason.clone()),
            ..Default::default()
        };
        match response.proposal {
            Proposal::Play {
                card,
                target,
                claim,
            } => {
                raw.card = Some(card.to_string());
                raw.target = Some(RawTarget::Seat(target));
                raw.claim = Some(claim.to_string());
            }
            Proposal::Look => {}
            Proposal::Pass { target, claim } => {
                raw.target = Some(RawTarget::Seat(target));
                raw.claim = Some(claim.to_string());
            }
            Proposal::Guess { guess } => raw.guess = Some(RawGuess::Flag(guess)),
        }
        raw
    }
}

fn parse_kind(action: &str) -> Result<ActionKind, CollaboratorError> {
    match action.trim().to_uppercase().as_str() {
        "PLAY" => Ok(ActionKind::Play),
        "LOOK" => Ok(ActionKind::Look),
        "PASS" => Ok(ActionKind::Pass),
        "GUESS" => Ok(ActionKind::Guess),
        other => Err(malformed(format!("unknown action '{}'", other))),
    }
}

fn parse_card(key: &str, value: Option<&str>) -> Result<Card, CollaboratorError> {
    let value = value.ok_or_else(|| malformed(format!("missing key '{}'", key)))?;
    Card::from_str(value.trim()).map_err(|_| malformed(format!("'{}' is not a creature", value)))
}

/// Seats are taken as given and left to the validator; names have to match exactly.
fn resolve_target(target: Option<&RawTarget>, view: &RoundView) -> Result<PlayerId, CollaboratorError> {
    match target {
        Some(RawTarget::Seat(seat)) => Ok(*seat),
        Some(RawTarget::Name(name)) => view
            .players
            .iter()
            .position(|p| p == name.trim())
            .ok_or_else(|| malformed(format!("no player named '{}'", name))),
        None => Err(malformed("missing key 'target'".to_string())),
    }
}

fn parse_guess(guess: Option<&RawGuess>) -> Result<bool, CollaboratorError> {
    match guess {
        Some(RawGuess::Flag(flag)) => Ok(*flag),
        Some(RawGuess::Text(text)) => match text.trim().to_uppercase().as_str() {
            "TRUE" => Ok(true),
            "FALSE" => Ok(false),
            _ => Err(malformed("guess must be either TRUE or FALSE".to_string())),
        },
        None => Err(malformed("missing key 'guess'".to_string())),
    }
}
