// Profanity scanner: applies the compiled matcher to submitted text.
//
// Scans are pure reads over the shared matcher, so any number can run at
// once. Multi-input scans fan out over rayon's pool and always run every
// input to completion before answering.

use std::borrow::Cow;
use std::sync::Arc;

use rayon::prelude::*;
use unicode_normalization::{is_nfkc_quick, IsNormalized, UnicodeNormalization};

use super::compiler::CompiledMatcher;

/// Scans text for abusive content using an injected [`CompiledMatcher`].
#[derive(Clone)]
pub struct ProfanityScanner {
    matcher: Arc<CompiledMatcher>,
}

impl ProfanityScanner {
    pub fn new(matcher: CompiledMatcher) -> Self {
        Self {
            matcher: Arc::new(matcher),
        }
    }

    pub fn from_shared(matcher: Arc<CompiledMatcher>) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &CompiledMatcher {
        &self.matcher
    }

    /// True iff the normalized text contains an abusive word anywhere.
    pub fn contains_abusive_content(&self, text: &str) -> bool {
        self.matcher.is_match(&normalize(text))
    }

    /// The first abusive span in the normalized text, if any.
    pub fn find_abusive(&self, text: &str) -> Option<String> {
        let normalized = normalize(text);
        self.matcher.find(&normalized).map(str::to_string)
    }

    /// Scan every input concurrently, returning one result per input in input order.
    pub fn scan_each<S>(&self, texts: &[S]) -> Vec<bool>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|t| self.contains_abusive_content(t.as_ref()))
            .collect()
    }

    /// True iff any input contains abusive content.
    ///
    /// Every input is scanned; there is no early exit on the first hit.
    pub fn scan_all<S>(&self, texts: &[S]) -> bool
    where
        S: AsRef<str> + Sync,
    {
        self.scan_each(texts).into_iter().any(|hit| hit)
    }
}

/// NFKC-normalize so compatibility forms (full-width letters, ligatures)
/// fold to the plain letters the word lists are written in.
fn normalize(text: &str) -> Cow<'_, str> {
    match is_nfkc_quick(text.chars()) {
        IsNormalized::Yes => Cow::Borrowed(text),
        _ => Cow::Owned(text.nfkc().collect()),
    }
}
