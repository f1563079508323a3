use rand::{Rng, seq::SliceRandom};
use word_api::WordEntry;

/// A word paired with its one-based position in the full listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub word: WordEntry,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    MissingEnglish,
    MissingChinese,
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformed::MissingEnglish => write!(f, "word is missing its English text"),
            Malformed::MissingChinese => write!(f, "word is missing its translation"),
        }
    }
}

impl Card {
    pub fn check(&self) -> Result<(), Malformed> {
        if self.word.english.trim().is_empty() {
            return Err(Malformed::MissingEnglish);
        }
        if self.word.chinese.trim().is_empty() {
            return Err(Malformed::MissingChinese);
        }
        Ok(())
    }

    /// Full translation, shown as a tooltip on every card.
    pub fn tooltip(&self) -> &str {
        &self.word.chinese
    }

    /// Optional fields of the detail dialog that are present, labelled.
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        let word = &self.word;
        [
            ("Phonetic", word.phonetic.as_deref()),
            ("Definition", word.definition.as_deref()),
            ("Example", word.example.as_deref()),
            ("Difficulty", word.difficulty.as_deref()),
            ("Category", word.category.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|value| (label, value))
        })
        .collect()
    }
}

/// Cards of the current page, in display order.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
    original: Vec<Card>,
    selected: Option<u32>,
    shuffled: bool,
}

impl Deck {
    /// Replaces the deck with a freshly loaded page and snapshots its order.
    pub fn replace(&mut self, items: Vec<WordEntry>, start_index: u32) {
        self.cards = items
            .into_iter()
            .zip(start_index..)
            .map(|(word, index)| Card { word, index })
            .collect();
        self.original = self.cards.clone();
        self.selected = None;
        self.shuffled = false;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn words(&self) -> impl Iterator<Item = &WordEntry> {
        self.cards.iter().map(|card| &card.word)
    }

    pub fn get(&self, index: u32) -> Option<&Card> {
        self.cards.iter().find(|card| card.index == index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Returns `false` when there are fewer than two cards to shuffle.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.cards.len() < 2 {
            return false;
        }
        self.cards.shuffle(rng);
        self.shuffled = true;
        true
    }

    /// Puts the cards back in the order of the last page load.
    pub fn restore(&mut self) -> bool {
        if !self.shuffled {
            return false;
        }
        self.cards = self.original.clone();
        self.shuffled = false;
        true
    }

    /// Exclusive selection; selecting the selected card clears it.
    pub fn select(&mut self, index: u32) -> Option<u32> {
        self.selected = match self.selected {
            Some(current) if current == index => None,
            _ if self.get(index).is_some() => Some(index),
            current => current,
        };
        self.selected
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}
