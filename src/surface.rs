use crate::size::ImageSize;
use std::time::{Duration, Instant};

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieCard {
    pub title: String,
    pub description: String,
    pub poster_src: String,
    pub poster_alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Hidden,
    Error(String),
    Result(MovieCard),
}

#[derive(Debug, Clone)]
pub struct Surface {
    pub loading: bool,
    pub panel: Panel,
    pub active_size: ImageSize,
    pub thumbnail_link: String,
    pub link_selected: bool,
    copy_label: &'static str,
    copy_label_until: Option<Instant>,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            loading: false,
            panel: Panel::Hidden,
            active_size: ImageSize::default(),
            thumbnail_link: String::new(),
            link_selected: false,
            copy_label: COPY_LABEL,
            copy_label_until: None,
        }
    }
}

impl Surface {
    pub fn error(&self) -> Option<&str> {
        match &self.panel {
            Panel::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&MovieCard> {
        match &self.panel {
            Panel::Result(card) => Some(card),
            _ => None,
        }
    }

    pub fn copy_label(&self) -> &str {
        self.copy_label
    }

    pub(crate) fn flash_copy_label(&mut self, now: Instant) {
        self.copy_label = COPIED_LABEL;
        self.copy_label_until = Some(now + COPY_FEEDBACK);
    }

    /// Restores the copy label once its feedback window has passed.
    /// Returns true when the label changed.
    pub fn expire_copy_label(&mut self, now: Instant) -> bool {
        match self.copy_label_until {
            Some(until) if now >= until => {
                self.copy_label = COPY_LABEL;
                self.copy_label_until = None;
                true
            }
            _ => false,
        }
    }
}
