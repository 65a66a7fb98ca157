// Local keyword ranking: stopword filtering and word-frequency counting.
// Pure functions only; no network or disk access happens here.

pub mod ranker;
pub mod stopwords;

pub use ranker::{KeywordRanker, RankedKeyword};
pub use stopwords::StopwordSet;
