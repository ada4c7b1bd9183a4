use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Display index of a card on the board, row-major from zero.
pub type CardId = usize;

/// What a renderer should draw for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardFace {
    Hidden,
    Revealed,
    Matched,
    Mismatched,
}

impl CardFace {
    pub fn is_face_up(self) -> bool {
        !matches!(self, CardFace::Hidden)
    }
}

/// One card of a dealt board.
///
/// `matched` and `mismatched` are only ever set while the card is revealed, and concealing the
/// card clears both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    symbol: Symbol,
    revealed: bool,
    matched: bool,
    mismatched: bool,
}

impl Card {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            revealed: false,
            matched: false,
            mismatched: false,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub fn is_mismatched(&self) -> bool {
        self.mismatched
    }

    pub fn face(&self) -> CardFace {
        match (self.revealed, self.matched, self.mismatched) {
            (false, _, _) => CardFace::Hidden,
            (true, true, _) => CardFace::Matched,
            (true, false, true) => CardFace::Mismatched,
            (true, false, false) => CardFace::Revealed,
        }
    }

    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    pub fn conceal(&mut self) {
        self.revealed = false;
        self.matched = false;
        self.mismatched = false;
    }

    pub fn flip(&mut self) {
        if self.revealed {
            self.conceal();
        } else {
            self.reveal();
        }
    }

    /// Returns `false` (and changes nothing) while the card is face-down.
    pub fn mark_matched(&mut self) -> bool {
        if !self.revealed {
            return false;
        }
        self.matched = true;
        true
    }

    /// Returns `false` (and changes nothing) while the card is face-down.
    pub fn mark_mismatched(&mut self) -> bool {
        if !self.revealed {
            return false;
        }
        self.mismatched = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog() -> Card {
        Card::new(Symbol::from("🐶"))
    }

    #[test]
    fn new_card_is_hidden() {
        let card = dog();
        assert_eq!(card.face(), CardFace::Hidden);
        assert!(!card.is_revealed());
        assert_eq!(card.symbol().as_str(), "🐶");
    }

    #[test]
    fn marks_are_ignored_while_concealed() {
        let mut card = dog();
        assert!(!card.mark_matched());
        assert!(!card.mark_mismatched());
        assert!(!card.is_matched());
        assert!(!card.is_mismatched());
    }

    #[test]
    fn conceal_clears_outcome_flags() {
        let mut card = dog();
        card.reveal();
        assert!(card.mark_matched());
        assert!(card.mark_mismatched());
        assert_eq!(card.face(), CardFace::Matched);

        card.conceal();
        assert_eq!(card.face(), CardFace::Hidden);
        assert!(!card.is_matched());
        assert!(!card.is_mismatched());
    }

    #[test]
    fn flip_toggles_and_clears() {
        let mut card = dog();
        card.flip();
        assert!(card.is_revealed());
        card.mark_mismatched();
        assert_eq!(card.face(), CardFace::Mismatched);

        card.flip();
        assert!(!card.is_revealed());
        assert!(!card.is_mismatched());
    }
}
