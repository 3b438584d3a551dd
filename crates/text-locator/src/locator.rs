//! Request orchestration: open once, probe every item on every page, release

use shared_types::{Highlight, LocatorResult, Position, SearchItem};
use tracing::{debug, error, info, warn};

use crate::backend::{DocumentBackend, DocumentSource, TextDocument, TextPage};
use crate::config::LocatorConfig;
use crate::error::LocatorError;
use crate::normalize::normalize;
use crate::position::PageFrame;
use crate::probe::{PageProbe, ProbeState};

/// Entry point owning a backend and the request configuration
pub struct Locator<B> {
    backend: B,
    config: LocatorConfig,
}

impl<B: DocumentBackend> Locator<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, LocatorConfig::default())
    }

    pub fn with_config(backend: B, config: LocatorConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Open the document for one request
    pub fn open(&self, source: &DocumentSource) -> Result<B::Document, LocatorError> {
        self.backend
            .open(source)
            .map_err(LocatorError::DocumentOpen)
    }

    /// Locate every item in the document at `source`.
    ///
    /// Never fails: an unusable document or an item with empty text yields
    /// a result carrying `error` with no highlights and a page count of
    /// zero. The document is dropped before returning, on every path
    /// including unwinding.
    pub fn locate(&self, source: &DocumentSource, items: &[SearchItem]) -> LocatorResult {
        if let Err(e) = validate_items(items) {
            error!("{}", e);
            return LocatorResult::open_failed(e.to_string());
        }

        info!(
            "Locating {} items in {} with {} backend",
            items.len(),
            source.describe(),
            self.backend.name()
        );

        let document = match self.open(source) {
            Ok(document) => document,
            Err(e) => {
                error!("{}", e);
                return LocatorResult::open_failed(e.to_string());
            }
        };

        locate_all(&document, items, &self.config)
    }
}

fn validate_items(items: &[SearchItem]) -> Result<(), LocatorError> {
    for item in items {
        item.validate()?;
    }
    Ok(())
}

/// Pages loaded for the current request, at most once each
struct PageCache<'d, D: TextDocument> {
    document: &'d D,
    slots: Vec<Option<Option<(D::Page, PageFrame)>>>,
}

impl<'d, D: TextDocument> PageCache<'d, D> {
    fn new(document: &'d D) -> Self {
        let slots = std::iter::repeat_with(|| None)
            .take(document.page_count())
            .collect();
        Self { document, slots }
    }

    /// `None` when the page could not be loaded or has unusable dimensions
    fn get(&mut self, number: u32) -> Option<&(D::Page, PageFrame)> {
        let index = number.checked_sub(1)? as usize;
        let document = self.document;
        self.slots
            .get_mut(index)?
            .get_or_insert_with(|| load_page(document, number))
            .as_ref()
    }
}

fn load_page<D: TextDocument>(document: &D, number: u32) -> Option<(D::Page, PageFrame)> {
    let page = match document.page(number) {
        Ok(page) => page,
        Err(e) => {
            warn!("Skipping page {}: {}", number, e);
            return None;
        }
    };
    let (width, height) = page.dimensions();
    match PageFrame::new(number, width, height) {
        Ok(frame) => Some((page, frame)),
        Err(e) => {
            warn!("Skipping page {}: {}", number, e);
            None
        }
    }
}

/// Probe every item on every page of an open document.
///
/// Items are processed in input order and pages 1..N in order. Positions
/// for an item accumulate across pages; an item with none lands in
/// `not_found` with its literal text.
pub fn locate_all<D: TextDocument>(
    document: &D,
    items: &[SearchItem],
    config: &LocatorConfig,
) -> LocatorResult {
    let page_count = document.page_count();
    let mut pages = PageCache::new(document);
    let mut result = LocatorResult::new(page_count);

    for item in items {
        let normalized = normalize(&item.text);
        debug!("Searching for '{}' (normalized: '{}')", item.text, normalized);

        let mut positions: Vec<Position> = Vec::new();
        for number in 1..=page_count as u32 {
            let Some((page, frame)) = pages.get(number) else {
                continue;
            };

            let state = PageProbe::new(page, &item.text, &normalized, config.enable_fallback).run();
            match &state {
                ProbeState::Matched { tier, rects } => {
                    debug!("Found {} matches on page {} ({:?})", rects.len(), number, tier);
                }
                ProbeState::Unmatched {
                    split_suspected: true,
                } => {
                    warn!(
                        "'{}' is on page {} after normalization but no single span contains it",
                        item.text, number
                    );
                }
                _ => {}
            }

            positions.extend(
                state
                    .into_rects()
                    .iter()
                    .filter_map(|rect| frame.normalize(rect)),
            );
        }

        if positions.is_empty() {
            info!("NOT FOUND: '{}'", item.text);
            result.not_found.push(item.text.clone());
        } else {
            debug!("Total positions for '{}': {}", item.text, positions.len());
            result.highlights.push(Highlight::new(item, positions));
        }
    }

    info!(
        "Result: {} highlights, {} not found, {} pages",
        result.highlights.len(),
        result.not_found.len(),
        page_count
    );
    result
}
