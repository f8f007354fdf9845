// Tamis: content moderation gate for marketplace submissions
//
// This is the library root. Each module corresponds to one part of the
// gate: profanity detection on text, remote image classification, and the
// pipeline that combines both into a verdict.

pub mod classifier;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod profanity;
