//! Ranked free-text search over nomenclature descriptions.
//!
//! Three modes share one deterministic ordering (score, then shorter
//! description, then code):
//!
//! | Mode | Match | Score |
//! |------|-------|-------|
//! | `exact` | case-insensitive substring | query length / description length |
//! | `prefix` | query token starts a description token | matched tokens / query tokens |
//! | `fuzzy` | Levenshtein within 0, 1 or 2 edits by token length | mean token similarity |

mod error;
mod index;

pub use error::{Result, SearchError};
pub use index::{
    DEFAULT_LIMIT, Highlight, SearchCatalog, SearchHit, SearchIndex, SearchMode, SearchOptions,
};
