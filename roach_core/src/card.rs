use std::collections::BTreeMap;

use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::SetupError;

#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Card {
    Bat,
    Cockroach,
    Fly,
    Frog,
    Rat,
    Scorpion,
    Spider,
    Stinkbug,
}

/// How many copies of each creature the deck holds. Creatures with no entry are not part of the
/// game and cannot be claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckConfig {
    counts: BTreeMap<Card, usize>,
}

impl DeckConfig {
    pub fn new<I>(type_counts: I) -> Self
    where
        I: IntoIterator<Item = (Card, usize)>,
    {
        DeckConfig {
            counts: type_counts
                .into_iter()
                .filter(|&(_, count)| count > 0)
                .collect(),
        }
    }

    pub fn standard() -> Self {
        DeckConfig::new(Card::iter().map(|c| (c, 8)))
    }

    pub fn creatures(&self) -> Vec<Card> {
        self.counts.keys().copied().collect()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.counts.contains_key(&card)
    }

    pub fn count(&self, card: Card) -> usize {
        self.counts.get(&card).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn describe(&self) -> String {
        self.counts
            .iter()
            .map(|(card, count)| format!("{}x {}", count, card))
            .join(", ")
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        DeckConfig::standard()
    }
}

/// What to do with the cards left over when the deck does not split evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remainder {
    Reject,
    /// The first seats get one extra card each.
    #[default]
    Spread,
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(config: &DeckConfig) -> Self {
        Deck {
            cards: config
                .counts
                .iter()
                .flat_map(|(&card, &count)| std::iter::repeat(card).take(count))
                .collect(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn deal(self, player_count: usize, remainder: Remainder) -> Result<Vec<Vec<Card>>, SetupError> {
        if player_count < 2 {
            return Err(SetupError::PlayerCountInvalid(player_count));
        }
        let total = self.cards.len();
        if total < player_count {
            return Err(SetupError::DeckExhausted {
                cards: total,
                players: player_count,
            });
        }
        let (per_player, extra) = (total / player_count, total % player_count);
        if extra != 0 && remainder == Remainder::Reject {
            return Err(SetupError::DeckExhausted {
                cards: total,
                players: player_count,
            });
        }

        let mut cards = self.cards.into_iter();
        let hands = (0..player_count)
            .map(|seat| {
                let size = match remainder {
                    Remainder::Spread if seat < extra => per_player + 1,
                    _ => per_player,
                };
                cards.by_ref().take(size).collect_vec()
            })
            .collect_vec();
        Ok(hands)
    }
}
