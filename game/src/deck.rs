use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::card::Card;
use crate::error::ConfigError;
use crate::symbol::{Symbol, distinct};

/// Picks `pair_count` distinct symbols without replacement.
pub fn pick_symbols<R: Rng + ?Sized>(
    alphabet: &[Symbol],
    pair_count: usize,
    rng: &mut R,
) -> Result<Vec<Symbol>, ConfigError> {
    let unique = distinct(alphabet);
    if unique.len() < pair_count {
        return Err(ConfigError::InsufficientAlphabet {
            required: pair_count,
            available: unique.len(),
        });
    }
    Ok(unique.choose_multiple(rng, pair_count).cloned().collect())
}

/// Duplicates every symbol and shuffles the pairs with Fisher-Yates.
pub fn shuffled_pairs<R: Rng + ?Sized>(symbols: &[Symbol], rng: &mut R) -> Vec<Symbol> {
    let mut layout: Vec<Symbol> = symbols
        .iter()
        .flat_map(|symbol| [symbol.clone(), symbol.clone()])
        .collect();
    layout.shuffle(rng);
    layout
}

/// Deals a fresh face-down board of `pair_count * 2` cards.
pub fn deal<R: Rng + ?Sized>(
    alphabet: &[Symbol],
    pair_count: usize,
    rng: &mut R,
) -> Result<Vec<Card>, ConfigError> {
    if pair_count == 0 {
        return Err(ConfigError::EmptyBoard);
    }
    let symbols = pick_symbols(alphabet, pair_count, rng)?;
    Ok(shuffled_pairs(&symbols, rng)
        .into_iter()
        .map(Card::new)
        .collect())
}

/// Checks that a fixed layout is non-empty and pairs every symbol exactly twice.
pub fn validate_layout(layout: &[Symbol]) -> Result<(), ConfigError> {
    if layout.is_empty() {
        return Err(ConfigError::EmptyBoard);
    }
    if layout.len() % 2 != 0 {
        return Err(ConfigError::OddBoardSize(layout.len()));
    }
    for symbol in distinct(layout) {
        let count = layout.iter().filter(|s| **s == symbol).count();
        if count != 2 {
            return Err(ConfigError::UnpairedLayout {
                symbol: symbol.to_string(),
                count,
            });
        }
    }
    Ok(())
}
