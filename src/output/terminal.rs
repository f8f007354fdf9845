// Colored terminal output for the CLI.
//
// main.rs decides what to run; this module decides how results look.

use colored::Colorize;

use crate::classifier::{ErrorKind, Outcome};
use crate::pipeline::{RejectReason, Verdict};

use super::truncate_chars;

/// Display per-field profanity results.
pub fn display_text_results(texts: &[String], hits: &[bool]) {
    println!("\n{}", "=== Profanity scan ===".bold());
    for (text, hit) in texts.iter().zip(hits) {
        let status = if *hit {
            "ABUSIVE".red().bold()
        } else {
            "clean".green()
        };
        println!("  {:<8} {}", status, truncate_chars(text, 60).dimmed());
    }
    println!();
}

/// Display classifier outcomes, one line per image, in input order.
pub fn display_image_outcomes(names: &[String], outcomes: &[Outcome]) {
    println!("\n{}", "=== Image classification ===".bold());
    for (name, outcome) in names.iter().zip(outcomes) {
        match outcome {
            Ok(resp) if resp.is_safe => println!(
                "  {:<8} {} (confidence {:.2})",
                "safe".green(),
                name,
                resp.confidence
            ),
            Ok(resp) => println!(
                "  {:<8} {} (confidence {:.2})",
                "UNSAFE".red().bold(),
                name,
                resp.confidence
            ),
            Err(e) => println!(
                "  {:<8} {} [{}] {}",
                "ERROR".yellow().bold(),
                name,
                kind_label(e.kind()),
                e
            ),
        }
    }
    println!();
}

/// Display the overall verdict for a submission.
pub fn display_verdict(verdict: &Verdict) {
    match verdict {
        Verdict::Accepted => println!("{}", "Accepted.".green().bold()),
        Verdict::Rejected(r) => {
            let reason = match r.reason {
                RejectReason::ProfanityDetected => r.reason.as_str().red(),
                RejectReason::UnsafeImage => r.reason.as_str().red(),
                RejectReason::ClassificationError => r.reason.as_str().yellow(),
            };
            println!("{} {}", "Rejected:".bold(), reason.bold());
            println!("  field:   {}", r.field);
            println!("  message: {}", r.message);
        }
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Transport => "transport",
        ErrorKind::Protocol => "protocol",
        ErrorKind::Application => "worker",
        ErrorKind::Timeout => "timeout",
    }
}
