// Profanity detection: word lists compiled into one obfuscation-tolerant
// matcher, then applied to free-text fields.
//
// The matcher is built once at startup and injected into the scanner, so
// there is no way to scan with an uncompiled matcher.

pub mod compiler;
pub mod scanner;
pub mod wordlist;

pub use compiler::{CompiledMatcher, PatternCompiler};
pub use scanner::ProfanityScanner;
pub use wordlist::{LoadError, WordList};
