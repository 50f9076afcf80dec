//! Local implementations for lawpipe: the reqwest-backed e-Gov gateway plus the pure
//! post-processing steps (normalization, article extraction, analysis, term lookup).

pub mod analyze;
pub mod articles;
pub mod egov;
pub mod normalize;
pub mod terms;

pub use analyze::Analyzer;
pub use articles::{extract_articles, extract_articles_from_payload};
pub use egov::EgovGateway;
pub use normalize::Normalizer;
