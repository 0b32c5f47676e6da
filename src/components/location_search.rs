//! Search-as-you-type location picker.
//!
//! Typing schedules a debounced geocoder lookup, the results can be walked with the
//! arrow keys and one of them is committed with Enter or a click. Only a commit
//! produces a [`Place`]; the typed text alone never does.
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info_span};

use super::debounce::Debouncer;
use crate::{
    model::{Place, nominatim_api_model::NominatimSuggestion},
    services::Geocoder,
};

/// Quiet period after the last keystroke before suggestions are fetched
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);
/// How long suggestions stay visible after focus is lost, so a click on one still lands
pub const BLUR_HIDE_DELAY: Duration = Duration::from_millis(150);
pub const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub debounce: Duration,
    pub blur_delay: Duration,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            debounce: DEBOUNCE_DELAY,
            blur_delay: BLUR_HIDE_DELAY,
            limit: SUGGESTION_LIMIT,
        }
    }
}

/// Shared between the widget and its fetch tasks. The last fetch to finish wins.
#[derive(Debug, Default)]
struct SuggestionList {
    suggestions: Vec<NominatimSuggestion>,
    /// `None` when nothing is highlighted
    selected_index: Option<usize>,
}

impl SuggestionList {
    fn clear(&mut self) {
        self.suggestions.clear();
        self.selected_index = None;
    }
}

fn lock(list: &Mutex<SuggestionList>) -> MutexGuard<'_, SuggestionList> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}

pub type OnSelect = Box<dyn FnMut(Place) + Send>;

pub struct LocationSearch {
    label: String,
    query: String,
    list: Arc<Mutex<SuggestionList>>,
    geocoder: Arc<dyn Geocoder>,
    on_select: OnSelect,
    fetch_timer: Debouncer,
    blur_timer: Debouncer,
    limit: usize,
    /// Ticks whenever a background task changed the suggestions
    changes: Arc<watch::Sender<()>>,
}

impl LocationSearch {
    pub fn new(
        label: impl Into<String>,
        geocoder: Arc<dyn Geocoder>,
        options: SearchOptions,
        on_select: OnSelect,
    ) -> Self {
        LocationSearch {
            label: label.into(),
            query: String::new(),
            list: Arc::default(),
            geocoder,
            on_select,
            fetch_timer: Debouncer::new(options.debounce),
            blur_timer: Debouncer::new(options.blur_delay),
            limit: options.limit,
            changes: Arc::new(watch::channel(()).0),
        }
    }

    /// Notified when suggestions arrive or get hidden in the background
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.changes.subscribe()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Snapshot of the current suggestions in relevance order
    pub fn suggestions(&self) -> Vec<NominatimSuggestion> {
        lock(&self.list).suggestions.clone()
    }

    pub fn selected_index(&self) -> Option<usize> {
        lock(&self.list).selected_index
    }

    /// Replaces the typed text.
    ///
    /// Blank text clears the suggestions right away, anything else (re)starts the
    /// debounce timer. A fetch that is already running is left alone.
    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();

        let query = text.trim().to_string();
        if query.is_empty() {
            self.fetch_timer.cancel();
            lock(&self.list).clear();
            return;
        }

        let list = self.list.clone();
        let geocoder = self.geocoder.clone();
        let changes = self.changes.clone();
        let limit = self.limit;

        self.fetch_timer.schedule(
            async move {
                match geocoder.search(&query, limit).await {
                    Ok(mut suggestions) => {
                        suggestions.truncate(limit);
                        debug!("showing {} suggestions", suggestions.len());

                        {
                            let mut list = lock(&list);
                            list.suggestions = suggestions;
                            list.selected_index = None;
                        }
                        changes.send_replace(());
                    }
                    // stale suggestions stay visible
                    Err(e) => error!("error fetching suggestions: {e}"),
                }
            }
            .instrument(info_span!("Fetching suggestions")),
        );
    }

    /// Returns whether the key was consumed
    pub fn handle_key(&mut self, key: Key) -> bool {
        let mut list = lock(&self.list);
        if list.suggestions.is_empty() {
            return false;
        }

        let last = list.suggestions.len() - 1;

        match key {
            Key::ArrowDown => {
                list.selected_index = Some(list.selected_index.map_or(0, |i| (i + 1).min(last)));
                true
            }
            Key::ArrowUp => {
                list.selected_index = Some(list.selected_index.map_or(0, |i| i.saturating_sub(1)));
                true
            }
            Key::Enter => match list.selected_index {
                Some(index) => {
                    drop(list);
                    self.commit(index)
                }
                None => false,
            },
            Key::Other => false,
        }
    }

    /// Pointer selection of the suggestion at `index`
    pub fn click(&mut self, index: usize) -> bool {
        self.commit(index)
    }

    /// Hides the suggestions after the blur delay
    pub fn blur(&mut self) {
        let list = self.list.clone();
        let changes = self.changes.clone();
        self.blur_timer.schedule(async move {
            lock(&list).clear();
            changes.send_replace(());
        });
    }

    pub fn focus(&mut self) {
        self.blur_timer.cancel();
    }

    fn commit(&mut self, index: usize) -> bool {
        let place = {
            let mut list = lock(&self.list);
            let Some(suggestion) = list.suggestions.get(index) else {
                return false;
            };
            let place = Place::from(suggestion);
            list.clear();
            place
        };

        self.fetch_timer.cancel();
        self.query = place.display_name.clone();

        debug!("selected {}", place.display_name);
        (self.on_select)(place);

        true
    }

    /// Text rendition: the label and query, then one line per suggestion with the
    /// highlighted one marked
    pub fn render_lines(&self) -> Vec<String> {
        let list = lock(&self.list);

        let mut lines = vec![format!("{}: {}", self.label, self.query)];
        lines.extend(list.suggestions.iter().enumerate().map(|(i, s)| {
            let marker = if list.selected_index == Some(i) { '>' } else { ' ' };
            format!("{marker} {}. {}", i + 1, s.display_name)
        }));

        lines
    }
}

impl std::fmt::Debug for LocationSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSearch")
            .field("label", &self.label)
            .field("query", &self.query)
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}
