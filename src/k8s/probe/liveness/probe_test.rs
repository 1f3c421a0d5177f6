#[cfg(test)]
mod tests {
    use crate::liveness::{Config, Deadline, Error, Outcome, Probe, Prober, Service};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::time::sleep;

    // Scheduling slack allowed on top of a probe timeout.
    const SLACK: Duration = Duration::from_millis(250);

    /// Answers immediately and counts how many times it was asked.
    struct Fixed {
        answer: bool,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(answer: bool) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Service for Fixed {
        async fn is_alive(&self, _deadline: &Deadline) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    /// Sleeps before answering, ignoring the deadline.
    struct Slow {
        delay: Duration,
        answer: bool,
        calls: AtomicUsize,
    }

    impl Slow {
        fn new(delay: Duration, answer: bool) -> Arc<Self> {
            Arc::new(Self {
                delay,
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Service for Slow {
        async fn is_alive(&self, _deadline: &Deadline) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            sleep(self.delay).await;
            self.answer
        }
    }

    /// Never answers.
    struct Stuck;

    #[async_trait]
    impl Service for Stuck {
        async fn is_alive(&self, _deadline: &Deadline) -> bool {
            std::future::pending::<bool>().await
        }
    }

    /// Hangs on the first question with `false`, answers `true` right away afterwards.
    struct HangsOnce {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Service for HangsOnce {
        async fn is_alive(&self, _deadline: &Deadline) -> bool {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                sleep(self.delay).await;
                return false;
            }
            true
        }
    }

    /// Keeps the deadlines it was handed.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Deadline>>,
    }

    #[async_trait]
    impl Service for Recorder {
        async fn is_alive(&self, deadline: &Deadline) -> bool {
            self.seen.lock().push(deadline.clone());
            !deadline.is_expired()
        }
    }

    fn svc<S: Service + 'static>(service: &Arc<S>) -> Arc<dyn Service> {
        service.clone()
    }

    #[tokio::test]
    async fn test_unwatched_probe_times_out() {
        let timeout = Duration::from_millis(50);
        let probe = Probe::new(timeout);

        let started = Instant::now();
        let outcome = probe.check().await;
        let elapsed = started.elapsed();

        assert_eq!(outcome, Outcome::TimedOut);
        assert!(elapsed >= timeout, "returned too early: {:?}", elapsed);
        assert!(elapsed < timeout + SLACK, "blocked too long: {:?}", elapsed);
        assert!(!probe.is_alive().await);
    }

    #[tokio::test]
    async fn test_stuck_responder_never_blocks_caller() {
        let timeout = Duration::from_millis(50);
        let probe = Probe::new(timeout);
        probe.watch(vec![Arc::new(Stuck) as Arc<dyn Service>]).unwrap();

        for _ in 0..3 {
            let started = Instant::now();
            assert!(!probe.is_alive().await);
            assert!(started.elapsed() < timeout + SLACK);
        }
    }

    #[tokio::test]
    async fn test_two_healthy_targets_are_alive() {
        let probe = Probe::new(Duration::from_millis(500));
        let (a, b) = (Fixed::new(true), Fixed::new(true));
        probe.watch(vec![svc(&a), svc(&b)]).unwrap();

        assert_eq!(probe.check().await, Outcome::Alive);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_one_unhealthy_target_fails_the_probe() {
        let probe = Probe::new(Duration::from_millis(500));
        let (healthy, sick) = (Fixed::new(true), Fixed::new(false));
        probe.watch(vec![svc(&healthy), svc(&sick)]).unwrap();

        assert_eq!(probe.check().await, Outcome::Unhealthy);
        assert!(!probe.is_alive().await);
    }

    #[tokio::test]
    async fn test_conjunction_ignores_order_and_asks_everyone() {
        for sick_first in [true, false] {
            let probe = Probe::new(Duration::from_millis(500));
            let (healthy, sick) = (Fixed::new(true), Fixed::new(false));
            let order: Vec<Arc<dyn Service>> = if sick_first {
                vec![svc(&sick), svc(&healthy)]
            } else {
                vec![svc(&healthy), svc(&sick)]
            };
            probe.watch(order).unwrap();

            assert_eq!(probe.check().await, Outcome::Unhealthy);
            // A failed target does not stop the others from being asked.
            assert_eq!(healthy.calls(), 1);
            assert_eq!(sick.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_no_targets_is_alive() {
        let probe = Probe::new(Duration::from_millis(500));
        probe.watch(Vec::new()).unwrap();
        assert!(probe.is_alive().await);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_independent() {
        let probe = Probe::new(Duration::from_millis(500));
        let target = Fixed::new(true);
        probe.watch(vec![svc(&target)]).unwrap();

        for _ in 0..10 {
            assert!(probe.is_alive().await);
        }
        assert_eq!(target.calls(), 10);
    }

    #[tokio::test]
    async fn test_concurrent_callers_all_get_answers() {
        let timeout = Duration::from_millis(500);
        let probe = Arc::new(Probe::new(timeout));
        probe.watch(vec![svc(&Fixed::new(true))]).unwrap();

        let mut handles = vec![];
        for _ in 0..32 {
            let probe = probe.clone();
            handles.push(tokio::spawn(async move {
                let started = Instant::now();
                let is_alive = probe.is_alive().await;
                (is_alive, started.elapsed())
            }));
        }

        for handle in handles {
            let (is_alive, elapsed) = handle.await.unwrap();
            assert!(is_alive);
            assert!(elapsed < timeout + SLACK);
        }
    }

    #[tokio::test]
    async fn test_slow_target_loses_the_race() {
        let probe = Probe::new(Duration::from_millis(50));
        probe
            .watch(vec![svc(&Slow::new(Duration::from_millis(200), true))])
            .unwrap();

        assert_eq!(probe.check().await, Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_second_watch_is_rejected() {
        let probe = Probe::new(Duration::from_millis(500));
        let first = Fixed::new(true);
        let second = Fixed::new(false);

        probe.watch(vec![svc(&first)]).unwrap();
        assert_eq!(
            probe.watch(vec![svc(&second)]),
            Err(Error::AlreadyWatching)
        );

        assert!(probe.is_alive().await);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_late_answer_is_not_inherited() {
        let delay = Duration::from_millis(300);
        let probe = Probe::new(Duration::from_millis(100));
        let target = Arc::new(HangsOnce {
            delay,
            calls: AtomicUsize::new(0),
        });
        probe.watch(vec![svc(&target)]).unwrap();

        assert_eq!(probe.check().await, Outcome::TimedOut);

        // Let the stale evaluation finish and send its `false` into the void.
        sleep(delay).await;

        assert_eq!(probe.check().await, Outcome::Alive);
        assert_eq!(target.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abandoned_query_is_skipped() {
        let probe = Probe::new(Duration::from_millis(50));
        let slow = Slow::new(Duration::from_millis(300), true);
        probe.watch(vec![svc(&slow)]).unwrap();

        // The first query occupies the responder, the second one expires in the queue.
        assert_eq!(probe.check().await, Outcome::TimedOut);
        assert_eq!(probe.check().await, Outcome::TimedOut);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_services_receive_the_query_deadline() {
        let timeout = Duration::from_millis(500);
        let probe = Probe::new(timeout);
        let recorder = Arc::new(Recorder::default());
        probe.watch(vec![svc(&recorder)]).unwrap();

        assert!(probe.is_alive().await);

        let seen = recorder.seen.lock().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].remaining() <= timeout);
        // The deadline expires as soon as the caller stops waiting.
        assert!(seen[0].is_expired());
    }

    #[tokio::test]
    async fn test_too_short_timeout_is_raised() {
        let probe = Probe::new(Duration::ZERO);
        assert_eq!(probe.timeout(), Duration::from_millis(10));

        let probe = Probe::new(Duration::from_millis(1));
        assert_eq!(probe.timeout(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_too_long_timeout_is_capped() {
        let cfg: Config = serde_yaml::from_str("timeout: 500000000000years
").unwrap();
        let probe = Probe::from_config(&cfg);
        assert_eq!(probe.timeout(), Duration::from_secs(60 * 60));

        probe.watch(vec![svc(&Fixed::new(true))]).unwrap();
        assert_eq!(probe.check().await, Outcome::Alive);

        let probe = Probe::new(Duration::MAX);
        assert_eq!(probe.timeout(), Duration::from_secs(60 * 60));
    }

    #[tokio::test]
    async fn test_dropping_probe_stops_responder() {
        let probe = Probe::new(Duration::from_millis(500));
        let target = Fixed::new(true);
        probe.watch(vec![svc(&target)]).unwrap();
        assert!(probe.is_alive().await);
        assert_eq!(Arc::strong_count(&target), 2);

        drop(probe);
        // The responder owns the only other handle and releases it on exit.
        for _ in 0..50 {
            if Arc::strong_count(&target) == 1 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(Arc::strong_count(&target), 1);
    }

    #[tokio::test]
    async fn test_probe_can_watch_another_probe() {
        let inner = Arc::new(Probe::new(Duration::from_millis(200)));
        let leaf = Fixed::new(true);
        inner.watch(vec![svc(&leaf)]).unwrap();

        let outer = Arc::new(Probe::new(Duration::from_millis(500))) as Arc<dyn Prober>;
        outer
            .watch(vec![svc(&inner), svc(&Fixed::new(true))])
            .unwrap();

        assert!(outer.is_alive().await);
        assert_eq!(outer.check().await, Outcome::Alive);
        assert_eq!(leaf.calls(), 2);
    }

    #[tokio::test]
    async fn test_inner_probe_timeout_surfaces_as_unhealthy() {
        let inner = Arc::new(Probe::new(Duration::from_millis(50)));
        inner.watch(vec![Arc::new(Stuck) as Arc<dyn Service>]).unwrap();

        let outer = Probe::new(Duration::from_millis(500));
        outer.watch(vec![inner as Arc<dyn Service>]).unwrap();

        assert_eq!(outer.check().await, Outcome::Unhealthy);
    }
}
