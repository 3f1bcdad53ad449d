// src/rewrite/prompts.rs
use crate::segment::PROJECT_BREAK;

/// Which system prompt to send with the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// One self-contained post.
    Single,
    /// One intro block plus one block per project, separated by `PROJECT_BREAK`.
    Segmented,
}

impl PromptVariant {
    pub fn system_prompt(self) -> String {
        match self {
            PromptVariant::Single => SINGLE_PROMPT.to_string(),
            PromptVariant::Segmented => SEGMENTED_PROMPT.replace("{BREAK}", PROJECT_BREAK),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PromptVariant::Single => "single",
            PromptVariant::Segmented => "segmented",
        }
    }
}

const SINGLE_PROMPT: &str = "Act as a professional crypto analyst and X growth expert. Turn the raw crypto market insights below into one highly engaging post. The tone should be authoritative, insightful and engaging, balancing professionalism and hype:
- Open with the most exciting trend of the day in an eye-catching way.
- Explain why each token/project is trending, referencing the catalysts given (institutional moves, ETF approvals, on-chain activity, influencer sentiment).
- End with a line crediting @finowl_finance as the data provider.

Rules:
1. Only use the tokens provided. Do not add any extra ones.
2. Only use the reasons provided. Do not invent new trends.
3. Output a single block of text, no separators.
4. Use an authoritative yet engaging tone.

Now write the post using exactly the information below.";

const SEGMENTED_PROMPT: &str = "Act as a professional crypto analyst and X growth expert. Turn the raw crypto market insights below into a thread of short, engaging posts.

Structure:
- First block: a one-line introduction of the day's most exciting trend.
- Then one block per token/project: why it is trending, referencing only the catalysts given.
- Put the exact line {BREAK} between blocks, on its own line. Never use it anywhere else.

Rules:
1. Only use the tokens provided. Do not add any extra ones.
2. Only use the reasons provided. Do not invent new trends or reasons.
3. Each block must stand on its own and fit in a single post.
4. Write tickers as **$TICKER**.
5. Use an authoritative yet engaging tone.

Now write the blocks using exactly the information below.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segmented_prompt_names_the_break_token() {
        let p = PromptVariant::Segmented.system_prompt();
        assert!(p.contains(PROJECT_BREAK));
        assert!(!p.contains("{BREAK}"));
    }

    #[test]
    fn single_prompt_forbids_invention() {
        let p = PromptVariant::Single.system_prompt();
        assert!(p.contains("Do not add any extra ones"));
        assert!(!p.contains(PROJECT_BREAK));
    }
}
