//! callnotes transcript summaries
//!
//! Loading summaries from Chroma and rendering the inspect/search reports

mod inspect;
mod record;
mod search;
mod source;

pub use inspect::{write_inspect_report, PREVIEW_CHARS};
pub use record::SummaryRecord;
pub use search::{find_matches, write_search_report, SearchQuery, SummaryMatch};
pub use source::{ChromaSummaries, CollectionStats, SummarySource};

/// Width of the `=` rule under report headers
pub(crate) const RULE_WIDTH: usize = 80;

/// Width of the `-` rule around summary previews
pub(crate) const PREVIEW_RULE_WIDTH: usize = 76;
