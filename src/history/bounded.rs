//! Bounded-concurrency map over a slice.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run `f` over every item with at most `width` calls in flight.
///
/// `width` workers (clamped to `1..=items.len()`) each pull the next index
/// from a shared counter until the slice is exhausted. Results are placed by
/// index, so the output lines up with `items` whatever order the calls
/// finish in. Workers are polled on the current task; nothing is spawned, so
/// neither `T` nor the futures need to be `Send` or `'static`.
pub async fn bounded_map<'a, T, R, F, Fut>(items: &'a [T], width: usize, f: F) -> Vec<R>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = R>,
{
    if items.is_empty() {
        return Vec::new();
    }

    let width = width.clamp(1, items.len());
    let next = AtomicUsize::new(0);
    let next = &next;
    let f = &f;

    let workers = (0..width).map(move |_| async move {
        let mut done = Vec::new();
        loop {
            let index = next.fetch_add(1, Ordering::Relaxed);
            let Some(item) = items.get(index) else {
                break;
            };
            done.push((index, f(item).await));
        }
        done
    });
    let batches = futures::future::join_all(workers).await;

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    for (index, result) in batches.into_iter().flatten() {
        slots[index] = Some(result);
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn preserves_input_order() {
        let items: Vec<u64> = (0..20).collect();
        // Later items finish first.
        let out = bounded_map(&items, 4, |n| async move {
            tokio::time::sleep(Duration::from_millis(20 - *n)).await;
            n * 10
        })
        .await;
        assert_eq!(out, items.iter().map(|n| n * 10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn never_exceeds_width() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let (in_flight, peak) = (&in_flight, &peak);
        let items: Vec<u32> = (0..25).collect();

        bounded_map(&items, 3, move |_| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_width_still_runs() {
        let items = vec!["a", "b"];
        let out = bounded_map(&items, 0, |s| async move { s.to_uppercase() }).await;
        assert_eq!(out, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn empty_input() {
        let items: Vec<i32> = Vec::new();
        let out: Vec<i32> = bounded_map(&items, 8, |n| async move { *n }).await;
        assert!(out.is_empty());
    }
}
