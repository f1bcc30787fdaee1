// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// Fixed set of rows-per-page options offered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [Self; 4] = [Self::Ten, Self::Twenty, Self::Fifty, Self::Hundred];

    pub const fn rows(self) -> u64 {
        match self {
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "10" => Some(Self::Ten),
            "20" => Some(Self::Twenty),
            "50" => Some(Self::Fifty),
            "100" => Some(Self::Hundred),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ten => "10",
            Self::Twenty => "20",
            Self::Fifty => "50",
            Self::Hundred => "100",
        }
    }

    /// Next option in display order, wrapping after 100.
    pub fn cycled(self) -> Self {
        let position = Self::ALL
            .iter()
            .position(|size| *size == self)
            .unwrap_or(0);
        Self::ALL[(position + 1) % Self::ALL.len()]
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::Ten
    }
}

/// Current page window over the catalog. Pages are 1-based; the window only
/// decides which row range to request, the store supplies the total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    page: u64,
    page_size: PageSize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl PageWindow {
    pub fn new(page_size: PageSize) -> Self {
        Self { page: 1, page_size }
    }

    pub const fn page(self) -> u64 {
        self.page
    }

    pub const fn page_size(self) -> PageSize {
        self.page_size
    }

    pub const fn limit(self) -> u64 {
        self.page_size.rows()
    }

    pub const fn offset(self) -> u64 {
        (self.page - 1) * self.page_size.rows()
    }

    pub fn total_pages(self, total_count: u64) -> u64 {
        total_count.div_ceil(self.page_size.rows())
    }

    pub const fn can_prev(self) -> bool {
        self.page > 1
    }

    pub fn can_next(self, total_count: u64) -> bool {
        self.page < self.total_pages(total_count)
    }

    /// Changing the window size invalidates the old offset, so the page
    /// resets to 1. Returns whether anything changed.
    pub fn set_page_size(&mut self, page_size: PageSize) -> bool {
        if self.page_size == page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn next(&mut self, total_count: u64) -> bool {
        if !self.can_next(total_count) {
            return false;
        }
        self.page += 1;
        true
    }

    /// 1-based display number for the row at `index` within the current page.
    pub const fn display_row_number(self, index: usize) -> u64 {
        self.offset() + index as u64 + 1
    }

    /// Inclusive bounds of the "Showing X to Y of Z" footer. Empty result
    /// sets show 0 to 0.
    pub fn shown_range(self, total_count: u64) -> (u64, u64) {
        if total_count == 0 {
            return (0, 0);
        }
        let first = self.offset() + 1;
        let last = (self.offset() + self.limit()).min(total_count);
        (first, last)
    }
}
