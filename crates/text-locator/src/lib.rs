//! Document text locator
//!
//! Finds every visual occurrence of literal search strings in a PDF and
//! reports them as page-relative rectangles for highlight overlays.
//!
//! Matching runs in two tiers per page:
//! - direct: the backend's exact search for the literal text
//! - fallback: normalized page-level check, then per-span containment
//!
//! The fallback deliberately tests one span at a time. A target that is
//! physically split across spans passes the page-level check and still
//! ends up in `notFound`.
//!
//! ```no_run
//! use shared_types::SearchItem;
//! use text_locator::{DocumentSource, Locator, LopdfBackend};
//!
//! let locator = Locator::new(LopdfBackend::new());
//! let items = vec![SearchItem::new("1", "pii", "090-1234-5678")];
//! let result = locator.locate(&DocumentSource::path("contract.pdf"), &items);
//! println!("{} highlights", result.highlights.len());
//! ```

pub mod backend;
pub mod config;
pub mod direct;
pub mod error;
pub mod fallback;
pub mod layout;
pub mod locator;
pub mod lopdf_backend;
pub mod normalize;
pub mod position;
pub mod probe;

pub use backend::{DocumentBackend, DocumentSource, TextDocument, TextPage};
pub use config::LocatorConfig;
pub use error::{BackendError, LocatorError};
pub use layout::{PageLayout, Rect, TextBlock, TextChar, TextLine, TextSpan};
pub use locator::{locate_all, Locator};
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use normalize::normalize;
pub use position::{to_normalized, PageFrame, COORDINATE_DECIMALS};
pub use probe::{MatchTier, PageProbe, ProbeState};
