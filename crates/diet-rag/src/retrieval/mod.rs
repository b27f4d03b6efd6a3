//! Candidate selection on top of the vector index

pub mod mmr;

pub use mmr::{cosine_similarity, mmr_select};
