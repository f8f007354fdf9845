// Pattern compiler: turns word lists into one obfuscation-tolerant matcher.
//
// Every letter of every word becomes a character class holding the letter
// and its look-alikes (Latin/Cyrillic homoglyphs, leetspeak digits and
// symbols). Classes are chained with optional separator noise so "f.u-c k"
// still matches. All words are joined into a single alternation, fenced by
// non-letter context so banned words inside longer clean words don't match.

use std::path::PathBuf;

use regex::{Regex, RegexBuilder};
use tracing::info;

use super::wordlist::{self, LoadError, WordList};

/// Separator noise tolerated between consecutive letters: spaces, dots, hyphens.
pub const SEPARATOR: &str = r"[ .\-]*";

/// Default ceiling for the compiled program size. Large corpora with
/// per-letter classes blow past the regex crate's 10 MiB default.
pub const DEFAULT_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Look-alike characters accepted in place of `c`.
///
/// Lookup is case-insensitive; the compiled matcher is case-insensitive too,
/// so upper-case forms don't need their own entries.
pub fn substitutions(c: char) -> &'static [char] {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'a' | 'а' => &['a', 'а', '@'],
        'o' | 'о' => &['o', 'о', '0'],
        'e' | 'е' => &['e', 'е', 'ё', '3', 'з'],
        'i' => &['i', '1', '!'],
        'w' | 'ш' => &['w', 'ш'],
        't' | 'т' => &['t', 'т', 'm'],
        'y' | 'у' => &['y', 'у'],
        'p' | 'р' => &['p', 'р'],
        's' => &['s', '5', '$'],
        'h' | 'н' => &['h', 'н'],
        'k' | 'к' => &['k', 'к'],
        'l' => &['l', '1', '!'],
        'x' | 'х' => &['x', 'х', '×', '*'],
        'c' | 'с' => &['c', 'с', '('],
        'b' | 'в' => &['b', 'в', '8'],
        'n' | 'п' => &['n', 'п'],
        'm' => &['m', 'т', 'м'],
        'з' | '3' => &['з', '3'],
        'м' => &['м', 'm'],
        'u' | 'и' => &['u', 'и'],
        _ => &[],
    }
}

/// Character class for one letter: the letter itself plus its substitutions.
fn char_class(c: char) -> String {
    let mut members: Vec<char> = vec![c];
    for &sub in substitutions(c) {
        if !members.contains(&sub) {
            members.push(sub);
        }
    }

    let mut class = String::from("[");
    for m in members {
        class.push_str(&regex::escape(m.encode_utf8(&mut [0u8; 4])));
    }
    class.push(']');
    class
}

/// Pattern for a single word: per-letter classes joined by optional separators.
pub fn word_pattern(word: &str) -> String {
    word.chars()
        .map(char_class)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Full pattern source for a set of words.
///
/// Group 1 captures the abusive span itself, without the boundary characters.
pub fn build_pattern(words: &[&str]) -> String {
    let alternation = words
        .iter()
        .map(|w| word_pattern(w))
        .collect::<Vec<_>>()
        .join("|");

    format!(r"(?:^|\P{{L}})({alternation})(?:$|\P{{L}})")
}

/// The compiled, immutable matcher shared by every scan.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    regex: Regex,
    word_count: usize,
}

impl CompiledMatcher {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The first abusive span in `text`, boundaries excluded.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Number of distinct words compiled into the matcher.
    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

/// Builds a [`CompiledMatcher`] from word lists.
pub struct PatternCompiler {
    size_limit: usize,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl PatternCompiler {
    pub fn with_size_limit(size_limit: usize) -> Self {
        Self { size_limit }
    }

    /// Compile every word of every list into one matcher.
    pub fn compile(&self, lists: &[WordList]) -> Result<CompiledMatcher, LoadError> {
        let words = wordlist::merge(lists);
        if words.is_empty() {
            return Err(LoadError::Empty { lists: lists.len() });
        }

        let pattern = build_pattern(&words);
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(self.size_limit)
            .dfa_size_limit(self.size_limit)
            .build()?;

        info!(
            lists = lists.len(),
            words = words.len(),
            pattern_bytes = pattern.len(),
            "Compiled profanity matcher"
        );

        Ok(CompiledMatcher {
            regex,
            word_count: words.len(),
        })
    }

    /// Read the word list files and compile them. Fails if any file is unreadable.
    pub fn compile_files(&self, paths: &[PathBuf]) -> Result<CompiledMatcher, LoadError> {
        let lists = wordlist::load_all(paths)?;
        self.compile(&lists)
    }
}
