//! Cards for the Da Vinci Code deck.
//!
//! Two colors (black and white), each with ranks 0-11 plus one joker,
//! for 26 cards total. A card's `revealed` flag is set once and never
//! cleared. The text token format (`B7≤`, `W_≤`, ...) is the wire
//! encoding clients use to describe a hand ordering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminator character closing every card token.
pub const TOKEN_END: char = '≤';

/// Card color (the two symmetric suits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    fn marker(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    fn from_marker(c: char) -> Option<Color> {
        match c {
            'B' => Some(Color::Black),
            'W' => Some(Color::White),
            _ => None,
        }
    }
}

/// Errors from decoding a token-encoded hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown color marker '{0}'")]
    UnknownColor(char),
    #[error("unterminated or malformed token")]
    MalformedToken,
    #[error("invalid card value '{0}'")]
    InvalidValue(String),
}

/// A single card. Identity within a game is unique: no two cards share
/// the same (color, rank) pair, so value equality on the face is enough
/// to match card instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    color: Color,
    /// `None` marks the joker of this color.
    rank: Option<u8>,
    revealed: bool,
}

impl Card {
    /// A ranked card. Rank must be 0-11.
    pub fn ranked(color: Color, rank: u8) -> Self {
        assert!(rank <= 11, "rank must be 0-11");
        Self {
            color,
            rank: Some(rank),
            revealed: false,
        }
    }

    /// The joker of the given color.
    pub fn joker(color: Color) -> Self {
        Self {
            color,
            rank: None,
            revealed: false,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn rank(&self) -> Option<u8> {
        self.rank
    }

    pub fn is_joker(&self) -> bool {
        self.rank.is_none()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Flip the card face up. One-way; there is no un-reveal.
    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    /// Sort key for the hand-ordering invariant: ascending rank, black
    /// before white on ties. Jokers have no key and sit anywhere.
    pub fn sort_key(&self) -> Option<(u8, u8)> {
        self.rank.map(|r| (r, self.color as u8))
    }

    /// The card's face, independent of revealed state.
    pub fn face(&self) -> (Color, Option<u8>) {
        (self.color, self.rank)
    }

    /// Wire token: color marker + rank digits (or `_` for the joker) +
    /// the `≤` terminator.
    pub fn token(&self) -> String {
        match self.rank {
            Some(r) => format!("{}{}{}", self.color.marker(), r, TOKEN_END),
            None => format!("{}_{}", self.color.marker(), TOKEN_END),
        }
    }
}

/// Decode a concatenated token stream into card faces, in order.
///
/// Rejects unknown color markers, unterminated tokens, and values that
/// are neither `_` nor a rank in 0-11. An empty string decodes to an
/// empty sequence.
pub fn decode_tokens(s: &str) -> Result<Vec<(Color, Option<u8>)>, DecodeError> {
    let mut faces = Vec::new();
    let mut chars = s.trim().chars().peekable();
    while let Some(marker) = chars.next() {
        let color = Color::from_marker(marker).ok_or(DecodeError::UnknownColor(marker))?;
        let mut value = String::new();
        loop {
            match chars.next() {
                Some(TOKEN_END) => break,
                Some(c) => value.push(c),
                None => return Err(DecodeError::MalformedToken),
            }
        }
        let rank = if value == "_" {
            None
        } else {
            let r: u8 = value
                .parse()
                .map_err(|_| DecodeError::InvalidValue(value.clone()))?;
            if r > 11 {
                return Err(DecodeError::InvalidValue(value));
            }
            Some(r)
        };
        faces.push((color, rank));
    }
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sort_key_orders_black_before_white() {
        let b7 = Card::ranked(Color::Black, 7);
        let w7 = Card::ranked(Color::White, 7);
        assert!(b7.sort_key() < w7.sort_key());

        let w3 = Card::ranked(Color::White, 3);
        assert!(w3.sort_key() < b7.sort_key());
    }

    #[test]
    fn test_joker_has_no_sort_key() {
        assert_eq!(Card::joker(Color::Black).sort_key(), None);
    }

    #[test]
    fn test_reveal_is_one_way() {
        let mut c = Card::ranked(Color::Black, 0);
        assert!(!c.is_revealed());
        c.reveal();
        c.reveal();
        assert!(c.is_revealed());
    }

    #[test]
    fn test_token_round_trip() {
        let cards = [
            Card::ranked(Color::Black, 7),
            Card::ranked(Color::White, 11),
            Card::joker(Color::White),
        ];
        let encoded: String = cards.iter().map(|c| c.token()).collect();
        assert_eq!(encoded, "B7≤W11≤W_≤");

        let faces = decode_tokens(&encoded).unwrap();
        assert_eq!(
            faces,
            vec![
                (Color::Black, Some(7)),
                (Color::White, Some(11)),
                (Color::White, None),
            ]
        );
    }

    #[test]
    fn test_decode_rejects_unknown_color() {
        assert_eq!(
            decode_tokens("X7≤"),
            Err(DecodeError::UnknownColor('X'))
        );
    }

    #[test]
    fn test_decode_rejects_unterminated_token() {
        assert_eq!(decode_tokens("B7"), Err(DecodeError::MalformedToken));
    }

    #[test]
    fn test_decode_rejects_out_of_range_rank() {
        assert_eq!(
            decode_tokens("B12≤"),
            Err(DecodeError::InvalidValue("12".to_string()))
        );
    }
}
