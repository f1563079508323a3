use word_api::{LegacyWordPage, WordEntry, WordPage};

use crate::config::ClientConfig;

/// One page of words as returned by the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub items: Vec<WordEntry>,
    /// Word count across all pages. Zero when the server only reported a
    /// page count (legacy listing).
    pub total: u64,
    pub reported_pages: Option<u32>,
    /// One-based display index of the first item, when the server supplies it.
    pub start_index: Option<u32>,
}

impl From<WordPage> for PageResult {
    fn from(page: WordPage) -> Self {
        Self {
            items: page.items,
            total: page.total,
            reported_pages: None,
            start_index: None,
        }
    }
}

impl From<LegacyWordPage> for PageResult {
    fn from(page: LegacyWordPage) -> Self {
        Self {
            items: page.words,
            total: 0,
            reported_pages: Some(page.total_pages),
            start_index: Some(page.start_index),
        }
    }
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    total.div_ceil(page_size).clamp(1, u64::from(u32::MAX)) as u32
}

/// Replaces a missing, non-positive or non-numeric page size with the
/// fallback and caps it at the server maximum.
pub fn normalize_page_size(raw: Option<&str>, fallback: u32, max: u32) -> u32 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(size) if size > 0 => size.min(i64::from(max)) as u32,
        _ => fallback,
    }
}

/// Page number from the `page` query parameter; anything unparsable or
/// below one means the first page.
pub fn parse_page_param(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

pub fn page_query(page: u32, page_size: u32) -> String {
    format!("?page={page}&pageSize={page_size}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    First,
    Prev,
    Next,
    Last,
    Goto(u32),
}

/// Handle for one in-flight page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total: u64,
    pub items: Vec<WordEntry>,
    pub start_index: u32,
    /// The requested page was outside `[1, total_pages]`; `page` holds the
    /// clamped value and the caller should fetch it.
    pub clamped: bool,
}

#[derive(Debug, Clone)]
pub struct Pager {
    current: u32,
    page_size: u32,
    total_pages: u32,
    total: u64,
    loading: bool,
    generation: u64,
    fallback_size: u32,
    max_size: u32,
}

impl Pager {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            current: 1,
            page_size: config.default_page_size,
            total_pages: 1,
            total: 0,
            loading: false,
            generation: 0,
            fallback_size: config.default_page_size,
            max_size: config.max_page_size,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    pub fn normalize(&self, raw_page_size: Option<&str>) -> u32 {
        normalize_page_size(raw_page_size, self.fallback_size, self.max_size)
    }

    /// Starts a load unless one is already in flight.
    pub fn begin_load(&mut self, page: u32, raw_page_size: Option<&str>) -> Option<LoadTicket> {
        if self.loading {
            tracing::debug!(page, "page load already in flight, dropping request");
            return None;
        }
        Some(self.issue(page, raw_page_size))
    }

    /// Starts a load even if another one is in flight; the older response
    /// will be discarded. Used to follow browser history.
    pub fn supersede(&mut self, page: u32, raw_page_size: Option<&str>) -> LoadTicket {
        self.issue(page, raw_page_size)
    }

    fn issue(&mut self, page: u32, raw_page_size: Option<&str>) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        let page_size = self.normalize(raw_page_size);
        tracing::debug!(page, page_size, generation = self.generation, "loading page");
        LoadTicket {
            generation: self.generation,
            page: page.max(1),
            page_size,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Applies a fetched page. Returns `None` for a stale ticket.
    pub fn complete(&mut self, ticket: &LoadTicket, result: PageResult) -> Option<LoadedPage> {
        if !self.is_current(ticket) {
            tracing::debug!(page = ticket.page, "discarding stale page response");
            return None;
        }
        self.loading = false;

        let total_pages = result
            .reported_pages
            .map(|pages| pages.max(1))
            .unwrap_or_else(|| total_pages(result.total, ticket.page_size));
        let page = ticket.page.clamp(1, total_pages);

        self.current = page;
        self.page_size = ticket.page_size;
        self.total_pages = total_pages;
        self.total = if result.total > 0 {
            result.total
        } else {
            u64::from(total_pages) * u64::from(ticket.page_size)
        };

        let start_index = result
            .start_index
            .filter(|start| *start > 0)
            .unwrap_or_else(|| (page - 1) * ticket.page_size + 1);

        Some(LoadedPage {
            page,
            page_size: ticket.page_size,
            total_pages,
            total: self.total,
            items: result.items,
            start_index,
            clamped: page != ticket.page,
        })
    }

    /// Releases the in-flight guard after a failed request. Returns `false`
    /// for a stale ticket.
    pub fn fail(&mut self, ticket: &LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        true
    }

    /// Target page of a navigation, or `None` when it would not move or
    /// would leave `[1, total_pages]`.
    pub fn target(&self, nav: Nav) -> Option<u32> {
        let target = match nav {
            Nav::First => 1,
            Nav::Prev => self.current.checked_sub(1)?,
            Nav::Next => self.current.checked_add(1)?,
            Nav::Last => self.total_pages,
            Nav::Goto(page) => page,
        };
        (target >= 1 && target <= self.total_pages && target != self.current).then_some(target)
    }

    /// Parses the go-to input into a target page.
    pub fn goto_target(&self, input: &str) -> Option<u32> {
        let page = input.trim().parse::<u32>().ok()?;
        self.target(Nav::Goto(page))
    }
}
