use word_api::WordEntry;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStart {
    /// Empty query: hide the overlay.
    Close,
    /// Query shorter than the minimum: show a hint, do not search.
    Prompt,
    Request(SearchTicket),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchView {
    Results(Vec<WordEntry>),
    Empty,
    Error(String),
}

impl From<Result<Vec<WordEntry>, ApiError>> for SearchView {
    fn from(result: Result<Vec<WordEntry>, ApiError>) -> Self {
        match result {
            Ok(results) if results.is_empty() => SearchView::Empty,
            Ok(results) => SearchView::Results(results),
            Err(e) => SearchView::Error(format!("Search failed: {e}")),
        }
    }
}

/// Decides whether a query hits the network and drops responses that were
/// overtaken by a newer query.
#[derive(Debug, Clone)]
pub struct SearchGate {
    min_len: usize,
    generation: u64,
}

impl SearchGate {
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len,
            generation: 0,
        }
    }

    pub fn begin(&mut self, raw: &str) -> SearchStart {
        self.generation += 1;
        let query = raw.trim();
        if query.is_empty() {
            SearchStart::Close
        } else if query.chars().count() < self.min_len {
            SearchStart::Prompt
        } else {
            tracing::debug!(query, generation = self.generation, "searching");
            SearchStart::Request(SearchTicket {
                generation: self.generation,
                query: query.to_owned(),
            })
        }
    }

    /// Hint shown while the query is too short.
    pub fn prompt(&self) -> String {
        match self.min_len {
            1 => "Type at least one character".to_owned(),
            n => format!("Type at least {n} characters"),
        }
    }

    /// Invalidates any pending response, e.g. when the overlay closes.
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    pub fn accepts(&self, ticket: &SearchTicket) -> bool {
        ticket.generation == self.generation
    }
}
