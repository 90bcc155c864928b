use crate::config::RECENT_PRICE_WINDOW;
use crate::types::PricePoint;

#[derive(Debug, Clone, Default)]
pub struct PriceChange {
    /// Last-two-sample delta: the most recent observed hourly move, not a
    /// windowed average.
    pub change_pct: f64,
    /// Prices of up to the last 24 points, in original order.
    pub recent: Vec<f64>,
}

pub fn compute_change(history: &[PricePoint]) -> PriceChange {
    if history.len() < 2 {
        return PriceChange::default();
    }

    let last = history[history.len() - 1].price;
    let prev = history[history.len() - 2].price;
    let change_pct = if prev > 0.0 { (last - prev) / prev } else { 0.0 };

    let start = history.len().saturating_sub(RECENT_PRICE_WINDOW);
    let recent = history[start..].iter().map(|p| p.price).collect();

    PriceChange { change_pct, recent }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(ts: i64, price: f64) -> PricePoint {
        PricePoint { ts, price }
    }

    #[test]
    fn short_history_has_no_change() {
        assert_eq!(compute_change(&[]).change_pct, 0.0);
        assert!(compute_change(&[]).recent.is_empty());

        let one = compute_change(&[pt(0, 0.5)]);
        assert_eq!(one.change_pct, 0.0);
        assert!(one.recent.is_empty());
    }

    #[test]
    fn change_is_the_last_two_sample_delta() {
        let change = compute_change(&[pt(0, 100.0), pt(1, 110.0)]);
        assert!((change.change_pct - 0.10).abs() < 1e-9);
        assert_eq!(change.recent, vec![100.0, 110.0]);
    }

    #[test]
    fn zero_previous_price_yields_zero_change() {
        let change = compute_change(&[pt(0, 0.0), pt(1, 0.4)]);
        assert_eq!(change.change_pct, 0.0);
    }

    #[test]
    fn recent_window_is_capped_at_24_points() {
        let history: Vec<PricePoint> = (0..30).map(|i| pt(i, i as f64)).collect();
        let change = compute_change(&history);
        assert_eq!(change.recent.len(), 24);
        assert_eq!(change.recent[0], 6.0);
        assert_eq!(*change.recent.last().unwrap(), 29.0);
    }
}
