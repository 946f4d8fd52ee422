//! Journal state containers — app-owned, SDK-provided update logic.

use super::Headline;
use crate::shared::JournalId;
use std::collections::VecDeque;

/// Backend page size for the journal history listing.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Most recent journal headlines, newest (highest id) first.
///
/// The app owns instances of this type and folds headline updates into it.
#[derive(Debug, Clone)]
pub struct HeadlineList {
    headlines: VecDeque<Headline>,
    max_size: usize,
}

impl HeadlineList {
    pub fn new(max_size: usize) -> Self {
        Self {
            headlines: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Apply a streamed headline: replace the entry with the same id, or
    /// insert in id order, evicting the oldest if at capacity.
    pub fn upsert(&mut self, headline: Headline) {
        if let Some(existing) = self.headlines.iter_mut().find(|h| h.id == headline.id) {
            *existing = headline;
            return;
        }
        let position = self
            .headlines
            .iter()
            .position(|h| h.id < headline.id)
            .unwrap_or(self.headlines.len());
        if position >= self.max_size {
            return;
        }
        self.headlines.insert(position, headline);
        self.headlines.truncate(self.max_size);
    }

    /// Replace all headlines (e.g. from a history page).
    pub fn replace(&mut self, headlines: Vec<Headline>) {
        self.headlines.clear();
        for headline in headlines {
            self.upsert(headline);
        }
    }

    pub fn get(&self, id: JournalId) -> Option<&Headline> {
        self.headlines.iter().find(|h| h.id == id)
    }

    pub fn headlines(&self) -> &VecDeque<Headline> {
        &self.headlines
    }

    pub fn latest(&self) -> Option<&Headline> {
        self.headlines.front()
    }

    /// Headlines still running.
    pub fn pending(&self) -> impl Iterator<Item = &Headline> {
        self.headlines.iter().filter(|h| !h.is_finished())
    }

    pub fn clear(&mut self) {
        self.headlines.clear();
    }

    pub fn len(&self) -> usize {
        self.headlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headlines.is_empty()
    }
}

impl Default for HeadlineList {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
