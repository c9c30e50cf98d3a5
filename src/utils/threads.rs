use futures::StreamExt;
use futures::stream;
use std::future::Future;

/// 以最多 `max_parallels` 的并发度执行一组future，结果顺序与输入顺序一致
pub async fn do_parallel_with_limit<F, T>(futures: Vec<F>, max_parallels: usize) -> Vec<T>
where
    F: Future<Output = T>,
{
    stream::iter(futures)
        .buffered(max_parallels.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::do_parallel_with_limit;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let futures: Vec<_> = (0..5u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis(25 - i * 5)).await;
                i
            })
            .collect();

        let results = do_parallel_with_limit(futures, 3).await;
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..8)
            .map(|_| {
                let running = running.clone();
                let peak = peak.clone();
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        do_parallel_with_limit(futures, 2).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_limit_still_runs() {
        let futures: Vec<_> = (0..3).map(|i| async move { i * 2 }).collect();
        assert_eq!(do_parallel_with_limit(futures, 0).await, vec![0, 2, 4]);
    }
}
