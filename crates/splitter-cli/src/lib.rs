//! Command-line front-end for the audio splitter

pub mod job;
pub mod output;
