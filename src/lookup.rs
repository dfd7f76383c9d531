use crate::clipboard::Clipboard;
use crate::error::{LookupError, TmdbError};
use crate::size::ImageSize;
use crate::surface::{MovieCard, Panel, Surface};
use crate::tmdb::{image_url, MovieSearch, SearchPage};
use std::time::Instant;
use tracing::{debug, error, info, warn};

const DISPLAY_SIZE: ImageSize = ImageSize::W500;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupState {
    pub poster_path: Option<String>,
    pub selected_size: ImageSize,
}

impl LookupState {
    pub fn thumbnail_link(&self, image_base: &str) -> Option<String> {
        let path = self.poster_path.as_deref()?;
        Some(image_url(image_base, self.selected_size.token(), path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub ticket: Ticket,
    pub query: String,
}

pub type LookupOutcome = Result<SearchPage, TmdbError>;

pub struct LookupController<C: Clipboard> {
    image_base: String,
    state: LookupState,
    surface: Surface,
    clipboard: C,
    latest_ticket: u64,
}

impl<C: Clipboard> LookupController<C> {
    pub fn new(image_base: impl Into<String>, clipboard: C) -> Self {
        Self {
            image_base: image_base.into(),
            state: LookupState::default(),
            surface: Surface::default(),
            clipboard,
            latest_ticket: 0,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Validates the query and resets the visible state. Returns `None` for a
    /// blank query, in which case nothing changes.
    pub fn begin(&mut self, query: &str) -> Option<PendingLookup> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.surface.panel = Panel::Hidden;
        self.surface.loading = true;
        self.surface.link_selected = false;
        self.surface.thumbnail_link.clear();
        self.state.poster_path = None;

        self.latest_ticket += 1;
        let ticket = Ticket(self.latest_ticket);
        info!("Lookup #{} for '{}'", ticket.id(), query);

        Some(PendingLookup {
            ticket,
            query: query.to_string(),
        })
    }

    /// Applies a finished lookup. Responses for anything but the most recent
    /// ticket are dropped so a slow request cannot overwrite a newer one.
    pub fn finish(&mut self, ticket: Ticket, outcome: LookupOutcome) -> bool {
        if ticket.id() != self.latest_ticket {
            debug!(
                "Discarding lookup #{} (superseded by #{})",
                ticket.id(),
                self.latest_ticket
            );
            return false;
        }

        let applied = match outcome {
            Ok(page) => self.show_page(page),
            Err(err) => {
                match &err {
                    TmdbError::Api { .. } => warn!("Lookup #{} failed: {}", ticket.id(), err),
                    _ => error!("Error fetching movie data: {}", err),
                }
                Err(LookupError::from(err))
            }
        };

        if let Err(err) = applied {
            self.surface.panel = Panel::Error(err.to_string());
        }
        self.surface.loading = false;
        true
    }

    pub async fn submit<S: MovieSearch>(&mut self, search: &S, query: &str) {
        let Some(pending) = self.begin(query) else {
            return;
        };
        let outcome = search.search_movie(&pending.query).await;
        self.finish(pending.ticket, outcome);
    }

    fn show_page(&mut self, page: SearchPage) -> Result<(), LookupError> {
        let movie = page.results.into_iter().next().ok_or(LookupError::NotFound)?;
        let Some(poster_path) = movie.poster().map(str::to_owned) else {
            info!("'{}' has no poster", movie.title);
            return Err(LookupError::NoPoster { title: movie.title });
        };

        let card = MovieCard {
            title: movie.display_title(),
            description: movie.overview.clone().unwrap_or_default(),
            poster_src: image_url(&self.image_base, DISPLAY_SIZE.token(), &poster_path),
            poster_alt: format!("Poster for {}", movie.title),
        };
        info!("Found {}", card.title);

        self.state.poster_path = Some(poster_path);
        self.select(ImageSize::default());
        self.surface.panel = Panel::Result(card);
        Ok(())
    }

    pub fn select_size(&mut self, token: &str) -> bool {
        match ImageSize::from_token(token) {
            Some(size) => {
                self.select(size);
                true
            }
            None => {
                debug!("Ignoring unknown size token '{}'", token);
                false
            }
        }
    }

    pub fn select(&mut self, size: ImageSize) {
        self.state.selected_size = size;
        self.surface.active_size = size;
        if let Some(link) = self.state.thumbnail_link(&self.image_base) {
            self.surface.thumbnail_link = link;
        }
    }

    pub fn copy_link(&mut self, now: Instant) {
        self.surface.link_selected = true;
        if let Err(e) = self.clipboard.set_text(&self.surface.thumbnail_link) {
            warn!("Copy failed: {:#}", e);
        }
        self.surface.flash_copy_label(now);
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.surface.expire_copy_label(now)
    }
}
