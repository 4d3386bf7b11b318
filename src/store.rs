//! In-memory quote storage using DashMap.

use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{QuoteInput, StoredQuote};

/// Append-only storage for accepted quotes.
///
/// Implementations must be safe to share across request tasks and must never
/// hand out the same id twice.
pub trait QuoteStore: Send + Sync {
    /// Stores a new record under a freshly generated id and returns it.
    fn put(&self, xml: String, raw_input: QuoteInput) -> Result<StoredQuote, AppError>;

    fn get(&self, id: &str) -> Option<StoredQuote>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime quote store. No eviction, no capacity bound.
#[derive(Clone, Default)]
pub struct MemoryQuoteStore {
    quotes: Arc<DashMap<String, StoredQuote>>,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuoteStore for MemoryQuoteStore {
    fn put(&self, xml: String, raw_input: QuoteInput) -> Result<StoredQuote, AppError> {
        loop {
            let id = Uuid::new_v4().to_string();
            // The vacant-entry insert holds the shard lock, so two callers can never claim one id.
            match self.quotes.entry(id) {
                Entry::Occupied(existing) => {
                    warn!("Quote id collision on {}, regenerating", existing.key());
                }
                Entry::Vacant(slot) => {
                    let record = StoredQuote::new(slot.key().clone(), xml, raw_input);
                    slot.insert(record.clone());
                    debug!("Stored quote {}", record.id);
                    return Ok(record);
                }
            }
        }
    }

    fn get(&self, id: &str) -> Option<StoredQuote> {
        self.quotes.get(id).map(|entry| entry.value().clone())
    }

    fn len(&self) -> usize {
        self.quotes.len()
    }
}
