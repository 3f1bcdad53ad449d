// src/segment.rs
//! Segment splitting and the small text fixes applied right before posting.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal token the segmented rewrite prompt asks the model to emit between projects.
pub const PROJECT_BREAK: &str = "===PROJECT_BREAK===";

/// Split on `PROJECT_BREAK`, trim each piece, drop empties. Pure and order-preserving.
pub fn split(text: &str) -> Vec<String> {
    text.split(PROJECT_BREAK)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

static RE_TICKER_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(\$\w+)\*\*").expect("ticker regex"));

/// `**$TICK**` → ` $TICK ` so cashtags survive as standalone tokens.
pub fn clean_tickers(content: &str) -> String {
    RE_TICKER_EMPHASIS.replace_all(content, " $1 ").into_owned()
}

/// Final per-segment fixup: drop leftover `**`, pad `(` with a space.
pub fn finalize_segment(segment: &str) -> String {
    segment.replace("**", "").replace('(', "( ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_empty_pieces() {
        assert_eq!(split("===PROJECT_BREAK===   ===PROJECT_BREAK===a"), vec!["a"]);
    }

    #[test]
    fn split_preserves_order_and_trims() {
        let out = split(" intro \n===PROJECT_BREAK===\n one \n===PROJECT_BREAK===two");
        assert_eq!(out, vec!["intro", "one", "two"]);
    }

    #[test]
    fn split_without_token_is_single_piece() {
        assert_eq!(split("  just text "), vec!["just text"]);
        assert!(split("   ").is_empty());
    }

    #[test]
    fn split_is_restartable() {
        let input = "a\n===PROJECT_BREAK===\n\n===PROJECT_BREAK=== b ===PROJECT_BREAK===c";
        let first = split(input);
        let rejoined = first.join(PROJECT_BREAK);
        assert_eq!(split(&rejoined), first);
        assert_eq!(split(input), first);
    }

    #[test]
    fn tickers_keep_dollar_sign() {
        assert_eq!(clean_tickers("Watch **$BTC** now"), "Watch  $BTC  now");
        assert_eq!(clean_tickers("**bold** stays"), "**bold** stays");
    }

    #[test]
    fn finalize_strips_bold_and_pads_parens() {
        assert_eq!(finalize_segment("**Solana** (SOL) up"), "Solana ( SOL) up");
    }
}
