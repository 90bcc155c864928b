//! Pure normalization from raw upstream JSON to strict internal types.
//! Gamma and the data API are loosely shaped — numbers arrive as strings,
//! arrays arrive JSON-stringified, and trade records use several field names
//! for the same concept. All of that tolerance lives here, as data, so the
//! rest of the engine only sees `Market` and `Trade`.

use serde_json::Value;

use crate::types::{Market, Trade};

/// Field probes for raw trade records, evaluated first-match-wins.
const TRADE_PRICE_FIELDS: &[&str] = &["price", "rate", "pricePerShare"];
const TRADE_SIZE_FIELDS: &[&str] = &["size", "amount", "quantity"];
const TRADE_ADDRESS_FIELDS: &[&str] = &["taker", "maker", "buyer", "trader", "user"];

const VOLUME_24H_FIELDS: &[&str] = &["volume24h", "volume24hr"];

/// Number that may be a JSON number or a numeric string.
pub fn num(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        .filter(|n| n.is_finite())
}

fn probe_num(v: &Value, fields: &[&str]) -> f64 {
    fields
        .iter()
        .find_map(|f| v.get(f).and_then(num))
        .unwrap_or(0.0)
}

fn probe_str(v: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|f| v.get(f).and_then(|x| x.as_str()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// String array that may arrive as a real array or as a JSON-stringified one
/// (`"[\"Yes\", \"No\"]"` — Gamma serves both shapes).
fn str_array(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|x| x.as_str().map(|s| s.to_string()))
            .collect(),
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn market_id(v: &Value) -> String {
    match v.get("id") {
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        Some(Value::Number(n)) => return n.to_string(),
        _ => {}
    }
    v.get("conditionId")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string()
}

fn question(v: &Value) -> String {
    v.get("question")
        .and_then(|q| q.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| v.get("title").and_then(|t| t.as_str()).filter(|s| !s.is_empty()))
        .unwrap_or("Untitled market")
        .to_string()
}

/// Lowercased category/subcategory/tags, deduped preserving first-seen order.
fn tags(v: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        let tag = tag.to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    };

    if let Some(c) = v.get("category").and_then(|c| c.as_str()) {
        push(c);
    }
    if let Some(c) = v.get("subcategory").and_then(|c| c.as_str()) {
        push(c);
    }
    if let Some(list) = v.get("tags").and_then(|t| t.as_array()) {
        for tag in list {
            match tag {
                Value::String(s) => push(s),
                Value::Object(_) => {
                    if let Some(name) = tag
                        .get("name")
                        .and_then(|n| n.as_str())
                        .or_else(|| tag.get("slug").and_then(|s| s.as_str()))
                    {
                        push(name);
                    }
                }
                _ => {}
            }
        }
    }
    out
}

/// Token id for an outcome label: positional match over outcomes→clobTokenIds,
/// then the `tokens` array by `outcome`/`name`.
fn token_for_outcome(v: &Value, outcomes: &[String], token_ids: &[String], desired: &str) -> Option<String> {
    if let Some(idx) = outcomes.iter().position(|o| o.eq_ignore_ascii_case(desired)) {
        if let Some(id) = token_ids.get(idx).filter(|id| !id.is_empty()) {
            return Some(id.clone());
        }
    }

    let tokens = v.get("tokens").and_then(|t| t.as_array())?;
    tokens
        .iter()
        .find(|t| {
            ["outcome", "name"].iter().any(|f| {
                t.get(f)
                    .and_then(|x| x.as_str())
                    .is_some_and(|s| s.eq_ignore_ascii_case(desired))
            })
        })
        .and_then(|t| t.get("token_id"))
        .and_then(|id| id.as_str())
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

fn all_token_ids(v: &Value) -> Vec<String> {
    let ids = str_array(v.get("clobTokenIds"));
    if !ids.is_empty() {
        return ids;
    }
    v.get("tokens")
        .and_then(|t| t.as_array())
        .map(|tokens| {
            tokens
                .iter()
                .map(|t| {
                    t.get("token_id")
                        .and_then(|id| id.as_str())
                        .unwrap_or("")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn outcome_price(outcomes: &[String], prices: &[String], desired: &str) -> f64 {
    outcomes
        .iter()
        .position(|o| o.eq_ignore_ascii_case(desired))
        .and_then(|idx| prices.get(idx))
        .and_then(|p| p.parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

/// Turn one raw Gamma record into a canonical `Market`.
pub fn parse_market(v: &Value) -> Market {
    let outcomes = str_array(v.get("outcomes"));
    let token_ids = all_token_ids(v);
    let prices = str_array(v.get("outcomePrices"));

    let yes_token_id = token_for_outcome(v, &outcomes, &token_ids, "Yes")
        .or_else(|| token_ids.first().filter(|id| !id.is_empty()).cloned());
    let no_token_id = token_for_outcome(v, &outcomes, &token_ids, "No")
        .or_else(|| token_ids.get(1).filter(|id| !id.is_empty()).cloned());

    Market {
        id: market_id(v),
        question: question(v),
        tags: tags(v),
        liquidity: v.get("liquidity").and_then(num).unwrap_or(0.0).max(0.0),
        volume_24h: probe_num(v, VOLUME_24H_FIELDS).max(0.0),
        yes_token_id,
        no_token_id,
        yes_price: outcome_price(&outcomes, &prices, "Yes"),
        no_price: outcome_price(&outcomes, &prices, "No"),
    }
}

/// Reduce raw trade records to `(address, usd)` rows, dropping anonymous or
/// zero-notional trades.
pub fn parse_trades(raw: &[Value]) -> Vec<Trade> {
    raw.iter()
        .filter_map(|t| {
            let price = probe_num(t, TRADE_PRICE_FIELDS);
            let size = probe_num(t, TRADE_SIZE_FIELDS);
            let usd = price * size;
            let address = probe_str(t, TRADE_ADDRESS_FIELDS)?;
            (usd > 0.0).then_some(Trade { address, usd })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_stringified_arrays() {
        let raw = json!({
            "conditionId": "0xabc",
            "question": "Will it happen?",
            "outcomes": "[\"Yes\", \"No\"]",
            "clobTokenIds": "[\"tok-yes\", \"tok-no\"]",
            "outcomePrices": "[\"0.62\", \"0.38\"]",
            "liquidity": "12000.5",
            "volume24hr": 3000.0,
        });

        let m = parse_market(&raw);
        assert_eq!(m.id, "0xabc");
        assert_eq!(m.yes_token_id.as_deref(), Some("tok-yes"));
        assert_eq!(m.no_token_id.as_deref(), Some("tok-no"));
        assert!((m.yes_price - 0.62).abs() < 1e-9);
        assert!((m.no_price - 0.38).abs() < 1e-9);
        assert!((m.liquidity - 12000.5).abs() < 1e-9);
        assert!((m.volume_24h - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn numeric_id_wins_over_condition_id() {
        let raw = json!({ "id": 12345, "conditionId": "0xdef" });
        assert_eq!(parse_market(&raw).id, "12345");
    }

    #[test]
    fn falls_back_to_tokens_array_and_title() {
        let raw = json!({
            "title": "Backup title",
            "tokens": [
                { "token_id": "t1", "outcome": "YES" },
                { "token_id": "t2", "name": "no" },
            ],
        });

        let m = parse_market(&raw);
        assert_eq!(m.question, "Backup title");
        assert_eq!(m.yes_token_id.as_deref(), Some("t1"));
        assert_eq!(m.no_token_id.as_deref(), Some("t2"));
    }

    #[test]
    fn unlabeled_outcomes_use_positional_tokens() {
        let raw = json!({
            "outcomes": ["Trump", "Biden"],
            "clobTokenIds": ["t-a", "t-b"],
        });

        let m = parse_market(&raw);
        assert_eq!(m.yes_token_id.as_deref(), Some("t-a"));
        assert_eq!(m.no_token_id.as_deref(), Some("t-b"));
        // No yes/no outcome labels, so no outcome prices either.
        assert_eq!(m.yes_price, 0.0);
    }

    #[test]
    fn tags_merge_and_dedupe_lowercased() {
        let raw = json!({
            "category": "Politics",
            "subcategory": "Elections",
            "tags": ["politics", { "name": "Congress" }, { "slug": "senate" }, 3],
        });

        assert_eq!(
            parse_market(&raw).tags,
            vec!["politics", "elections", "congress", "senate"]
        );
    }

    #[test]
    fn missing_everything_is_a_safe_default() {
        let m = parse_market(&json!({}));
        assert_eq!(m.id, "");
        assert_eq!(m.question, "Untitled market");
        assert!(m.tags.is_empty());
        assert!(m.yes_token_id.is_none());
        assert_eq!(m.liquidity, 0.0);
    }

    #[test]
    fn trade_probes_take_first_matching_field() {
        let raw = vec![
            json!({ "rate": "0.5", "amount": 200, "buyer": "0xbuyer" }),
            json!({ "price": 0.4, "size": 100, "taker": "0xtaker", "user": "ignored" }),
            // No address — dropped.
            json!({ "price": 0.4, "size": 100 }),
            // Zero notional — dropped.
            json!({ "price": 0, "size": 100, "trader": "0xzero" }),
        ];

        let trades = parse_trades(&raw);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].address, "0xbuyer");
        assert!((trades[0].usd - 100.0).abs() < 1e-9);
        assert_eq!(trades[1].address, "0xtaker");
        assert!((trades[1].usd - 40.0).abs() < 1e-9);
    }
}
