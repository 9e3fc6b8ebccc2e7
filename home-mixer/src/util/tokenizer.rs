//! A small rule-based tweet tokenizer used by the muted-keyword filter.
//! Splits on URLs, emoticons (case preserved), mentions, hashtags, numbers,
//! words, and punctuation, in that priority order, falling back to one
//! character at a time for anything else.

use regex::Regex;
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?P<url>https?://\S+)",
            r"|(?P<emoticon>[:;=8][oO\-]?[D\)\]\(/\\OpP3])",
            r"|(?P<mention>@[\w_]+)",
            r"|(?P<hashtag>#[\w_]+)",
            r"|(?P<number>\d+[\d,.]*\d*|\d+)",
            r"|(?P<word>[a-zA-Z][a-zA-Z'\-_]*[a-zA-Z]|[a-zA-Z])",
            r"|(?P<punct>[!?.,;:]+)",
            r"|(?P<other>\S)",
        ))
        .expect("tokenizer pattern is a valid regex")
    })
}

/// Splits `text` into tokens. Emoticons keep their original case regardless
/// of `lowercase`; every other token is lowercased when `lowercase` is set.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    let re = token_regex();
    re.captures_iter(text)
        .filter_map(|caps| {
            if let Some(m) = caps.name("emoticon") {
                return Some(m.as_str().to_string());
            }
            let m = caps
                .name("url")
                .or_else(|| caps.name("mention"))
                .or_else(|| caps.name("hashtag"))
                .or_else(|| caps.name("number"))
                .or_else(|| caps.name("word"))
                .or_else(|| caps.name("punct"))
                .or_else(|| caps.name("other"))?;
            let token = m.as_str();
            Some(if lowercase { token.to_lowercase() } else { token.to_string() })
        })
        .collect()
}

/// A viewer's muted keywords, pre-tokenized once so every candidate's text
/// is only tokenized a single time per filter call.
#[derive(Debug, Clone, Default)]
pub struct UserMutes {
    muted_token_sequences: Vec<Vec<String>>,
}

impl UserMutes {
    pub fn new(muted_keywords: &[String]) -> Self {
        Self {
            muted_token_sequences: muted_keywords
                .iter()
                .map(|keyword| tokenize(keyword, true))
                .filter(|tokens| !tokens.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.muted_token_sequences.is_empty()
    }

    /// Whether any muted keyword's token sequence appears as a contiguous
    /// subsequence of `tweet_tokens`.
    pub fn matches(&self, tweet_tokens: &[String]) -> bool {
        self.muted_token_sequences
            .iter()
            .any(|muted| is_contiguous_subsequence(muted, tweet_tokens))
    }
}

fn is_contiguous_subsequence(needle: &[String], haystack: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_mentions_hashtags_and_words() {
        let tokens = tokenize("Hello @world #rust 123", true);
        assert_eq!(tokens, vec!["hello", "@world", "#rust", "123"]);
    }

    #[test]
    fn emoticons_keep_their_case() {
        let tokens = tokenize(":D hi", true);
        assert_eq!(tokens[0], ":D");
        assert_eq!(tokens[1], "hi");
    }

    #[test]
    fn muted_phrase_matches_as_contiguous_subsequence() {
        let mutes = UserMutes::new(&["breaking news".to_string()]);
        assert!(mutes.matches(&tokenize("this is breaking news today", true)));
        assert!(!mutes.matches(&tokenize("breaking today news", true)));
    }

    #[test]
    fn empty_mutes_matches_nothing() {
        let mutes = UserMutes::new(&[]);
        assert!(mutes.is_empty());
        assert!(!mutes.matches(&tokenize("anything at all", true)));
    }
}
