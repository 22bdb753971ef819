//! Note-ordering maintainer.
//!
//! Free-text note cards must sit above content cards in every column.
//! [`plan_note_moves`] computes the minimal move sequence for one
//! column and the anchor card id after which the reconciler inserts
//! content cards, so new and moved items always land below the notes.
//!
//! The plan is pure; executing the moves is the reconciler's job, and
//! the moves are order-dependent (each one is anchored on the previous
//! note's final position), so they must be applied in sequence.

use crate::types::Card;

/// One move: place `card_id` immediately after `after` (or at the top
/// of the column when `after` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMove {
    pub card_id: String,
    pub after: Option<String>,
}

/// The move sequence for one column plus the resulting content anchor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotePlan {
    pub moves: Vec<NoteMove>,
    /// Bottom-most note card after the moves apply; `None` means the
    /// column has no notes and content inserts at the top.
    pub anchor: Option<String>,
}

/// Single left-to-right scan. A note card encountered after at least
/// one content card is out of place and moves to just below the last
/// note seen so far; both sub-sequences keep their relative order.
pub fn plan_note_moves(cards: &[Card]) -> NotePlan {
    let mut moves = Vec::new();
    let mut last_note: Option<String> = None;
    let mut seen_content = false;

    for card in cards {
        if card.is_note() {
            if seen_content {
                moves.push(NoteMove {
                    card_id: card.id.clone(),
                    after: last_note.clone(),
                });
            }
            last_note = Some(card.id.clone());
        } else {
            seen_content = true;
        }
    }

    NotePlan {
        moves,
        anchor: last_note,
    }
}
