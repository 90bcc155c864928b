use std::future::Future;

use futures_util::stream::{self, StreamExt};

/// Apply an async transform to every item with at most `limit` futures in
/// flight, returning results in input order.
///
/// A finished slot immediately admits the next unclaimed item, so one slow
/// item never starves the rest of the batch. Results are collected tagged
/// with their input index and reassembled afterwards — completion order does
/// not matter.
///
/// The mapper does not catch transform failures; call sites that want a
/// fail-soft batch wrap their transform to return a fallback value (every
/// current call site does).
pub async fn map_bounded<T, R, F, Fut>(items: Vec<T>, limit: usize, transform: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let limit = limit.max(1);

    let mut indexed: Vec<(usize, R)> = stream::iter(items.into_iter().enumerate())
        .map(|(idx, item)| {
            let fut = transform(item);
            async move { (idx, fut.await) }
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    indexed.sort_unstable_by_key(|&(idx, _)| idx);
    indexed.into_iter().map(|(_, value)| value).collect()
}
