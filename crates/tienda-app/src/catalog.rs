// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Per-row context menu. At most one row's menu is open; opening a second
/// row closes the first implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMenu {
    #[default]
    Closed,
    Open(ProductId),
}

impl RowMenu {
    /// Triggering the already-open row closes it; any other row opens there.
    pub fn toggle(&mut self, id: ProductId) {
        *self = match *self {
            Self::Open(open_id) if open_id == id => Self::Closed,
            _ => Self::Open(id),
        };
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub const fn open_row(self) -> Option<ProductId> {
        match self {
            Self::Open(id) => Some(id),
            Self::Closed => None,
        }
    }
}

/// Which view the catalog tab is showing. `Missing` is a terminal not-found
/// view; fetch failure and a zero-row read land there identically and only a
/// manual go-back leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CatalogMode {
    #[default]
    Listing,
    Loading(ProductId),
    Editing(ProductId),
    Missing(ProductId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCommand {
    RequestEdit(ProductId),
    RecordLoaded(ProductId),
    RecordUnavailable(ProductId),
    SaveSucceeded,
    SaveFailed,
    CancelEdit,
    GoBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    EditRequested(ProductId),
    EditStarted(ProductId),
    NotFoundShown(ProductId),
    ReturnedToListing { refetch: bool },
    SaveRejected,
}

impl CatalogMode {
    /// Applies one transition. Commands that do not apply in the current
    /// mode are ignored; stale load results for a different id are dropped.
    pub fn dispatch(&mut self, command: CatalogCommand) -> Vec<CatalogEvent> {
        match (command, *self) {
            (CatalogCommand::RequestEdit(id), Self::Listing) => {
                *self = Self::Loading(id);
                vec![CatalogEvent::EditRequested(id)]
            }
            (CatalogCommand::RecordLoaded(id), Self::Loading(pending)) if id == pending => {
                *self = Self::Editing(id);
                vec![CatalogEvent::EditStarted(id)]
            }
            (CatalogCommand::RecordUnavailable(id), Self::Loading(pending)) if id == pending => {
                *self = Self::Missing(id);
                vec![CatalogEvent::NotFoundShown(id)]
            }
            (CatalogCommand::SaveSucceeded, Self::Editing(_)) => {
                *self = Self::Listing;
                vec![CatalogEvent::ReturnedToListing { refetch: true }]
            }
            (CatalogCommand::SaveFailed, Self::Editing(_)) => {
                vec![CatalogEvent::SaveRejected]
            }
            (CatalogCommand::CancelEdit, Self::Editing(_) | Self::Loading(_)) => {
                *self = Self::Listing;
                vec![CatalogEvent::ReturnedToListing { refetch: false }]
            }
            (CatalogCommand::GoBack, Self::Missing(_)) => {
                *self = Self::Listing;
                vec![CatalogEvent::ReturnedToListing { refetch: false }]
            }
            _ => Vec::new(),
        }
    }

    pub const fn editing_row(self) -> Option<ProductId> {
        match self {
            Self::Editing(id) => Some(id),
            _ => None,
        }
    }

    pub const fn is_listing(self) -> bool {
        matches!(self, Self::Listing)
    }
}
