//! Content-id → card index.
//!
//! Maps each tracked item to the one live card that references it. The
//! reconciler consults this to decide add vs. move vs. delete; its add
//! path is only reachable when the index reports an item unplaced, so
//! the index's at-most-one-card invariant is what prevents duplicate
//! cards. Callers must have verified connection completeness first.

use std::collections::HashMap;

use crate::types::Card;

/// Where a content card currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedCard {
    pub card_id: String,
    /// `None` for cards in the pending bucket.
    pub column_id: Option<String>,
}

/// Lookup table from tracked-item id to its live card.
#[derive(Debug, Default)]
pub struct CardIndex {
    by_content: HashMap<String, IndexedCard>,
}

impl CardIndex {
    /// Index the content cards of one column (or of the pending bucket
    /// when `column_id` is `None`). Note cards and archived cards are
    /// skipped: only live content cards participate in reconciliation.
    pub fn from_cards<'a>(
        cards: impl IntoIterator<Item = &'a Card>,
        column_id: Option<&str>,
    ) -> Self {
        let mut by_content = HashMap::new();
        for card in cards {
            if card.is_archived {
                continue;
            }
            let Some(content) = &card.content else {
                continue;
            };
            let entry = IndexedCard {
                card_id: card.id.clone(),
                column_id: column_id.map(str::to_string),
            };
            if let Some(existing) = by_content.insert(content.id().to_string(), entry) {
                // Two live cards for one item violates the board's own
                // invariant. Keep the first card so we never mint a third.
                tracing::warn!(
                    content_id = content.id(),
                    kept_card = %existing.card_id,
                    dropped_card = %card.id,
                    "duplicate live card for tracked item; keeping first"
                );
                by_content.insert(content.id().to_string(), existing);
            }
        }
        Self { by_content }
    }

    /// Union disjoint per-column indexes plus the pending bucket.
    /// Overlaps are the same invariant violation as within one column:
    /// warn and keep the earlier entry.
    pub fn merge(parts: impl IntoIterator<Item = CardIndex>) -> Self {
        let mut merged: HashMap<String, IndexedCard> = HashMap::new();
        for part in parts {
            for (content_id, card) in part.by_content {
                if let Some(existing) = merged.get(&content_id) {
                    tracing::warn!(
                        content_id = %content_id,
                        kept_card = %existing.card_id,
                        dropped_card = %card.card_id,
                        "tracked item indexed in two places; keeping first"
                    );
                    continue;
                }
                merged.insert(content_id, card);
            }
        }
        Self { by_content: merged }
    }

    pub fn get(&self, content_id: &str) -> Option<&IndexedCard> {
        self.by_content.get(content_id)
    }

    pub fn len(&self) -> usize {
        self.by_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_content.is_empty()
    }
}
