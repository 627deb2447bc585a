//! Current-directory state machine: `Idle -> Loading -> {Loaded, Error}`.

use std::cmp::Ordering;

use panel_host::{normalize_path, parent_path, DirectoryListing, FileEntry};
use tracing::{debug, info};

use crate::client::ScopedClient;
use crate::error::FileManagerError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Lifecycle of the current directory listing.
pub enum ListingState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The listing reflects the latest request.
    Loaded,
    /// The latest request failed.
    Error(FileManagerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Handle for one issued list request.
///
/// Only the ticket of the most recent request may apply its response.
pub struct ListingTicket {
    generation: u64,
    /// Domain the request is scoped to.
    pub domain: String,
    /// Directory the request lists.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What happened to a completed list request.
pub enum ListingOutcome {
    /// The response replaced the listing.
    Applied,
    /// A newer request was issued meanwhile; the response was discarded.
    Stale,
    /// The directory is gone; navigation moved to `parent`, which should be loaded next.
    Retargeted {
        /// Path that was not found.
        missing: String,
        /// New current path.
        parent: String,
    },
    /// The request failed.
    Failed(FileManagerError),
}

#[derive(Debug, Clone, Default)]
/// Holds the current directory and its latest listing.
pub struct DirectoryListingController {
    state: ListingState,
    domain: String,
    current_path: String,
    listing: Option<DirectoryListing>,
    generation: u64,
    show_hidden: bool,
}

impl DirectoryListingController {
    /// Returns the lifecycle state.
    pub fn state(&self) -> &ListingState {
        &self.state
    }

    /// Returns the domain requests are scoped to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the normalized current directory.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Returns the last applied listing, if it is still current.
    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.listing.as_ref()
    }

    /// Returns whether hidden entries are visible.
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    /// Shows or hides dotfiles and backend-hidden entries.
    pub fn set_show_hidden(&mut self, show_hidden: bool) {
        self.show_hidden = show_hidden;
    }

    /// Entries to display: folders first, then case-insensitive name order.
    pub fn visible_entries(&self) -> Vec<&FileEntry> {
        let Some(listing) = &self.listing else {
            return Vec::new();
        };
        let mut entries: Vec<&FileEntry> = listing
            .entries
            .iter()
            .filter(|entry| self.show_hidden || !entry.is_hidden)
            .collect();
        entries.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
        });
        entries
    }

    /// Switches domain and resets to its root, discarding the listing.
    pub fn set_domain(&mut self, domain: &str) {
        self.domain = domain.to_string();
        self.navigate("");
    }

    /// Moves to `path` (normalized), discarding the listing. Does not issue a request.
    ///
    /// Requests still in flight become stale.
    pub fn navigate(&mut self, path: &str) {
        self.generation += 1;
        self.current_path = normalize_path(path);
        self.listing = None;
        self.state = ListingState::Idle;
    }

    /// Issues a new request generation for the current directory.
    pub fn begin(&mut self) -> ListingTicket {
        self.generation += 1;
        self.state = ListingState::Loading;
        debug!(
            generation = self.generation,
            domain = %self.domain,
            path = %self.current_path,
            "listing requested"
        );
        ListingTicket {
            generation: self.generation,
            domain: self.domain.clone(),
            path: self.current_path.clone(),
        }
    }

    /// Applies the response of `ticket`.
    ///
    /// Responses of superseded generations are discarded. A not-found response re-targets
    /// navigation to the parent directory, or fails when already at the root.
    pub fn complete(
        &mut self,
        ticket: ListingTicket,
        result: Result<DirectoryListing, FileManagerError>,
    ) -> ListingOutcome {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                path = %ticket.path,
                "discarding stale listing response"
            );
            return ListingOutcome::Stale;
        }

        match result {
            Ok(listing) => {
                self.listing = Some(listing);
                self.state = ListingState::Loaded;
                ListingOutcome::Applied
            }
            Err(FileManagerError::NotFound(_)) if !ticket.path.is_empty() => {
                let parent = parent_path(&ticket.path);
                info!(missing = %ticket.path, parent = %parent, "directory gone, moving up");
                self.navigate(&parent);
                ListingOutcome::Retargeted {
                    missing: ticket.path,
                    parent,
                }
            }
            Err(err) => {
                self.listing = None;
                self.state = ListingState::Error(err.clone());
                ListingOutcome::Failed(err)
            }
        }
    }

    /// Requests and applies a listing of the current directory.
    pub async fn load(&mut self, client: &ScopedClient) -> ListingOutcome {
        let ticket = self.begin();
        let result = client.list_directory(&ticket.domain, &ticket.path).await;
        self.complete(ticket, result)
    }
}
