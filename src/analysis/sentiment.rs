//! Keyword-based polarity scoring of a news corpus against a market question.
//! Deliberately simple: fixed word lists, substring keyword hits, per-item
//! polarity normalized by token count so a long article cannot dominate.

use crate::types::{NewsItem, SentimentResult};

const MAX_KEYWORDS: usize = 6;

const POSITIVE_WORDS: &[&str] = &[
    "beat", "boost", "bull", "optimistic", "surge", "record", "growth", "win",
    "approval", "progress", "rally", "deal", "advance", "upside",
];

const NEGATIVE_WORDS: &[&str] = &[
    "miss", "fall", "bear", "pessimistic", "decline", "loss", "crisis", "delay",
    "blocked", "risk", "downside", "collapse", "concern", "warning",
];

const STOP_WORDS: &[&str] = &[
    "will", "would", "should", "could", "with", "about", "that", "this", "they",
    "them", "from", "what", "when", "where", "which", "while", "into", "over",
    "under", "have", "has", "had", "are", "were", "who", "whom", "their",
    "there", "been", "after", "before",
];

/// Lowercase, split on non-alphanumerics, drop short tokens and stop words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() > 3 && !STOP_WORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

/// Signed word-list polarity of a text, normalized to [-1, 1] by token count.
pub fn analyze_text(text: &str) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }

    let mut score = 0i32;
    for token in &tokens {
        if POSITIVE_WORDS.contains(&token.as_str()) {
            score += 1;
        }
        if NEGATIVE_WORDS.contains(&token.as_str()) {
            score -= 1;
        }
    }
    f64::from(score) / tokens.len() as f64
}

/// Topic keywords for a market: tokenized question, deduped preserving
/// first-seen order, capped at 6.
pub fn build_keywords(question: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokenize(question) {
        if !keywords.contains(&token) {
            keywords.push(token);
            if keywords.len() == MAX_KEYWORDS {
                break;
            }
        }
    }
    keywords
}

/// Score a news corpus against one market. An item counts as a mention when
/// any topic keyword appears as a substring of its combined text; the final
/// score is the mean polarity over mentioning items only.
pub fn score_market(question: &str, items: &[NewsItem]) -> SentimentResult {
    let keywords = build_keywords(question);

    let mut mentions = 0u32;
    let mut total = 0.0f64;

    for item in items {
        let text = item_text(item);
        let lower = text.to_lowercase();
        if keywords.iter().any(|k| lower.contains(k.as_str())) {
            mentions += 1;
            total += analyze_text(&text);
        }
    }

    let score = if mentions > 0 { total / f64::from(mentions) } else { 0.0 };
    SentimentResult {
        mentions,
        score,
        keywords,
    }
}

fn item_text(item: &NewsItem) -> String {
    [&item.title, &item.summary, &item.body]
        .iter()
        .filter_map(|part| part.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: &str) -> NewsItem {
        NewsItem {
            title: Some(title.to_string()),
            summary: Some(summary.to_string()),
            ..NewsItem::default()
        }
    }

    #[test]
    fn tokenize_drops_short_and_stop_words() {
        let tokens = tokenize("Will the Fed cut rates before March? rally!");
        // "will" is a stop word, "the"/"cut"/"fed" too short, "before" stopped.
        assert_eq!(tokens, vec!["rates", "march", "rally"]);
    }

    #[test]
    fn empty_corpus_scores_zero() {
        let result = score_market("Will bitcoin reach 100k?", &[]);
        assert_eq!(result.mentions, 0);
        assert_eq!(result.score, 0.0);
        assert!(result.keywords.contains(&"bitcoin".to_string()));
    }

    #[test]
    fn polarity_is_normalized_by_token_count() {
        // 10 qualifying tokens, 3 positive, 0 negative: +0.3.
        let text = "bitcoin surge rally boost holders watching closely during volatile trading";
        assert_eq!(tokenize(text).len(), 10);
        assert!((analyze_text(text) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn only_mentioning_items_contribute() {
        let items = vec![
            item("Bitcoin rally continues", "surge boost bitcoin holders today"),
            item("Weather tomorrow", "sunny skies expected everywhere"),
        ];

        let result = score_market("Will bitcoin reach 100k?", &items);
        assert_eq!(result.mentions, 1);
        assert!(result.score > 0.0);
    }

    #[test]
    fn mixed_polarity_cancels() {
        let result = analyze_text("surge collapse");
        assert_eq!(result, 0.0);
    }

    #[test]
    fn keywords_dedupe_and_cap_at_six() {
        let keywords = build_keywords(
            "bitcoin bitcoin ethereum solana cardano polkadot avalanche chainlink",
        );
        assert_eq!(keywords.len(), 6);
        assert_eq!(keywords[0], "bitcoin");
        assert_eq!(keywords[1], "ethereum");
    }

    #[test]
    fn keyword_hit_is_a_substring_match() {
        let items = vec![item("Pre-election polling tightens", "")];
        let result = score_market("Who wins the election?", &items);
        assert_eq!(result.mentions, 1);
    }
}
