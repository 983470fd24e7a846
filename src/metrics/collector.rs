//! Metrics collection using Prometheus
//!
//! Every metric is registered on a private registry owned by the collector so
//! several managers (one per test, for instance) can coexist in one process.

use crate::manager::ManagerStats;
use crate::types::ArenaType;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the arena engine
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,
    service_metrics: ServiceMetrics,
    queue_metrics: QueueMetrics,
    arena_metrics: ArenaMetrics,
    rating_metrics: RatingMetrics,
    tournament_metrics: TournamentMetrics,
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Housekeeping passes run
    pub housekeeping_runs_total: IntCounter,
}

/// Matchmaking queue metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Queue requests by arena type and outcome (queued, matched, rejected)
    pub queue_requests_total: IntCounterVec,

    /// Players currently waiting, by arena type
    pub players_waiting: IntGaugeVec,

    /// Players that left a queue voluntarily
    pub queue_leaves_total: IntCounter,
}

/// Arena lifecycle and combat metrics
#[derive(Clone)]
pub struct ArenaMetrics {
    /// Arenas currently registered and not ended
    pub active_arenas: IntGauge,

    /// Arenas formed by type
    pub arenas_formed_total: IntCounterVec,

    /// Arenas ended by type and reason (victory, undecided, overdue)
    pub arenas_ended_total: IntCounterVec,

    /// Ended arenas removed from the registry
    pub arenas_cleaned_total: IntCounter,

    /// Kills by arena type
    pub kills_total: IntCounterVec,

    /// Attacks rejected, by error kind
    pub attacks_rejected_total: IntCounterVec,

    /// Forfeits via leave
    pub forfeits_total: IntCounter,
}

/// Rating metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Individual rating records changed by a decided match
    pub rating_updates_total: IntCounter,

    /// Distribution of ratings after an update
    pub rating_distribution: Histogram,

    /// Season resets performed
    pub season_resets_total: IntCounter,
}

/// Tournament metrics
#[derive(Clone)]
pub struct TournamentMetrics {
    pub tournaments_created_total: IntCounter,
    pub tournaments_started_total: IntCounter,
    pub tournaments_completed_total: IntCounter,
    pub matches_reported_total: IntCounter,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Manager operation durations
    pub operation_duration: HistogramVec,

    /// Rating calculation time
    pub rating_calculation_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector on a caller-supplied registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let queue_metrics = QueueMetrics::new(&registry)?;
        let arena_metrics = ArenaMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;
        let tournament_metrics = TournamentMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            queue_metrics,
            arena_metrics,
            rating_metrics,
            tournament_metrics,
            performance_metrics,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    pub fn arena(&self) -> &ArenaMetrics {
        &self.arena_metrics
    }

    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    pub fn tournament(&self) -> &TournamentMetrics {
        &self.tournament_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Refresh the point-in-time gauges from a manager snapshot
    pub fn update_from_manager_stats(&self, stats: &ManagerStats) {
        self.arena_metrics.active_arenas.set(stats.live_arenas as i64);
        for (arena_type, waiting) in &stats.queue_sizes {
            self.queue_metrics
                .players_waiting
                .with_label_values(&[arena_type.as_label()])
                .set(*waiting as i64);
        }
    }

    /// Record a queue request; `outcome` is queued, matched or rejected
    pub fn record_queue_request(&self, arena_type: ArenaType, outcome: &str) {
        self.queue_metrics
            .queue_requests_total
            .with_label_values(&[arena_type.as_label(), outcome])
            .inc();
    }

    pub fn record_queue_leave(&self) {
        self.queue_metrics.queue_leaves_total.inc();
    }

    pub fn record_arena_formed(&self, arena_type: ArenaType) {
        self.arena_metrics
            .arenas_formed_total
            .with_label_values(&[arena_type.as_label()])
            .inc();
        self.arena_metrics.active_arenas.inc();
    }

    /// Record an arena reaching `ended`; `reason` is victory, undecided or overdue
    pub fn record_arena_ended(&self, arena_type: ArenaType, reason: &str) {
        self.arena_metrics
            .arenas_ended_total
            .with_label_values(&[arena_type.as_label(), reason])
            .inc();
        self.arena_metrics.active_arenas.dec();
    }

    pub fn record_arenas_cleaned(&self, count: usize) {
        self.arena_metrics.arenas_cleaned_total.inc_by(count as u64);
    }

    pub fn record_kill(&self, arena_type: ArenaType) {
        self.arena_metrics
            .kills_total
            .with_label_values(&[arena_type.as_label()])
            .inc();
    }

    pub fn record_attack_rejected(&self, kind: &str) {
        self.arena_metrics
            .attacks_rejected_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn record_forfeit(&self) {
        self.arena_metrics.forfeits_total.inc();
    }

    /// Record one applied rating update and how long the whole batch took
    pub fn record_rating_updates(&self, new_ratings: &[i32], duration: Duration) {
        self.rating_metrics
            .rating_updates_total
            .inc_by(new_ratings.len() as u64);
        for rating in new_ratings {
            self.rating_metrics
                .rating_distribution
                .observe(f64::from(*rating));
        }
        self.performance_metrics
            .rating_calculation_duration
            .observe(duration.as_secs_f64());
    }

    pub fn record_season_reset(&self) {
        self.rating_metrics.season_resets_total.inc();
    }

    pub fn record_tournament_created(&self) {
        self.tournament_metrics.tournaments_created_total.inc();
    }

    pub fn record_tournament_started(&self) {
        self.tournament_metrics.tournaments_started_total.inc();
    }

    pub fn record_tournament_match(&self, completed: bool) {
        self.tournament_metrics.matches_reported_total.inc();
        if completed {
            self.tournament_metrics.tournaments_completed_total.inc();
        }
    }

    pub fn record_housekeeping(&self) {
        self.service_metrics.housekeeping_runs_total.inc();
    }

    /// Record a manager operation duration
    pub fn record_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    pub fn update_uptime(&self, seconds: u64) {
        self.service_metrics.uptime_seconds.set(seconds as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds = IntGauge::new("pvp_arena_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "pvp_arena_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let housekeeping_runs_total = IntCounter::new(
            "pvp_arena_housekeeping_runs_total",
            "Housekeeping passes run",
        )?;
        registry.register(Box::new(housekeeping_runs_total.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            housekeeping_runs_total,
        })
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let queue_requests_total = IntCounterVec::new(
            Opts::new("pvp_arena_queue_requests_total", "Queue requests processed"),
            &["arena_type", "outcome"],
        )?;
        registry.register(Box::new(queue_requests_total.clone()))?;

        let players_waiting = IntGaugeVec::new(
            Opts::new("pvp_arena_players_waiting", "Players currently waiting in queue"),
            &["arena_type"],
        )?;
        registry.register(Box::new(players_waiting.clone()))?;

        let queue_leaves_total =
            IntCounter::new("pvp_arena_queue_leaves_total", "Players that left a queue")?;
        registry.register(Box::new(queue_leaves_total.clone()))?;

        Ok(Self {
            queue_requests_total,
            players_waiting,
            queue_leaves_total,
        })
    }
}

impl ArenaMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let active_arenas = IntGauge::new("pvp_arena_active_arenas", "Arenas not yet ended")?;
        registry.register(Box::new(active_arenas.clone()))?;

        let arenas_formed_total = IntCounterVec::new(
            Opts::new("pvp_arena_arenas_formed_total", "Arenas formed"),
            &["arena_type"],
        )?;
        registry.register(Box::new(arenas_formed_total.clone()))?;

        let arenas_ended_total = IntCounterVec::new(
            Opts::new("pvp_arena_arenas_ended_total", "Arenas ended"),
            &["arena_type", "reason"],
        )?;
        registry.register(Box::new(arenas_ended_total.clone()))?;

        let arenas_cleaned_total = IntCounter::new(
            "pvp_arena_arenas_cleaned_total",
            "Ended arenas removed from the registry",
        )?;
        registry.register(Box::new(arenas_cleaned_total.clone()))?;

        let kills_total = IntCounterVec::new(
            Opts::new("pvp_arena_kills_total", "Kills landed"),
            &["arena_type"],
        )?;
        registry.register(Box::new(kills_total.clone()))?;

        let attacks_rejected_total = IntCounterVec::new(
            Opts::new("pvp_arena_attacks_rejected_total", "Attacks rejected"),
            &["kind"],
        )?;
        registry.register(Box::new(attacks_rejected_total.clone()))?;

        let forfeits_total = IntCounter::new("pvp_arena_forfeits_total", "Arena forfeits")?;
        registry.register(Box::new(forfeits_total.clone()))?;

        Ok(Self {
            active_arenas,
            arenas_formed_total,
            arenas_ended_total,
            arenas_cleaned_total,
            kills_total,
            attacks_rejected_total,
            forfeits_total,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rating_updates_total = IntCounter::new(
            "pvp_arena_rating_updates_total",
            "Rating records changed by decided matches",
        )?;
        registry.register(Box::new(rating_updates_total.clone()))?;

        let rating_distribution = Histogram::with_opts(
            HistogramOpts::new("pvp_arena_rating_distribution", "Player rating distribution")
                .buckets(vec![
                    500.0, 1000.0, 1300.0, 1600.0, 2000.0, 2500.0, 3000.0,
                ]),
        )?;
        registry.register(Box::new(rating_distribution.clone()))?;

        let season_resets_total =
            IntCounter::new("pvp_arena_season_resets_total", "Season resets performed")?;
        registry.register(Box::new(season_resets_total.clone()))?;

        Ok(Self {
            rating_updates_total,
            rating_distribution,
            season_resets_total,
        })
    }
}

impl TournamentMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let tournaments_created_total =
            IntCounter::new("pvp_arena_tournaments_created_total", "Tournaments created")?;
        registry.register(Box::new(tournaments_created_total.clone()))?;

        let tournaments_started_total =
            IntCounter::new("pvp_arena_tournaments_started_total", "Tournaments started")?;
        registry.register(Box::new(tournaments_started_total.clone()))?;

        let tournaments_completed_total = IntCounter::new(
            "pvp_arena_tournaments_completed_total",
            "Tournaments completed",
        )?;
        registry.register(Box::new(tournaments_completed_total.clone()))?;

        let matches_reported_total = IntCounter::new(
            "pvp_arena_tournament_matches_reported_total",
            "Tournament match results reported",
        )?;
        registry.register(Box::new(matches_reported_total.clone()))?;

        Ok(Self {
            tournaments_created_total,
            tournaments_started_total,
            tournaments_completed_total,
            matches_reported_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "pvp_arena_operation_duration_seconds",
                "Manager operation duration",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05, 0.1]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let rating_calculation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "pvp_arena_rating_calculation_duration_seconds",
                "Rating calculation time",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01]),
        )?;
        registry.register(Box::new(rating_calculation_duration.clone()))?;

        Ok(Self {
            operation_duration,
            rating_calculation_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Encoder;

    fn render(collector: &MetricsCollector) -> String {
        let mut buffer = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&collector.registry().gather(), &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let _service = collector.service();
        let _queue = collector.queue();
        let _arena = collector.arena();
        let _rating = collector.rating();
        let _tournament = collector.tournament();
        let _performance = collector.performance();
    }

    #[test]
    fn test_independent_registries() {
        let first = MetricsCollector::new().unwrap();
        let second = MetricsCollector::new().unwrap();
        first.record_arena_formed(ArenaType::Duel);
        assert_eq!(first.arena().active_arenas.get(), 1);
        assert_eq!(second.arena().active_arenas.get(), 0);
    }

    #[test]
    fn test_arena_lifecycle_counters() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_queue_request(ArenaType::Duel, "queued");
        collector.record_queue_request(ArenaType::Duel, "matched");
        collector.record_arena_formed(ArenaType::Duel);
        collector.record_kill(ArenaType::Duel);
        collector.record_arena_ended(ArenaType::Duel, "victory");

        assert_eq!(collector.arena().active_arenas.get(), 0);
        assert_eq!(
            collector
                .queue()
                .queue_requests_total
                .with_label_values(&["duel", "matched"])
                .get(),
            1
        );

        let text = render(&collector);
        assert!(text.contains("pvp_arena_arenas_ended_total"));
        assert!(text.contains("pvp_arena_kills_total"));
    }

    #[test]
    fn test_rating_updates_recorded() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_rating_updates(&[1016, 984], Duration::from_micros(20));
        assert_eq!(collector.rating().rating_updates_total.get(), 2);
        assert_eq!(collector.rating().rating_distribution.get_sample_count(), 2);
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().unwrap();
        let timer = collector.start_timer();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
        assert!(timer.stop() >= Duration::from_millis(10));
    }
}
