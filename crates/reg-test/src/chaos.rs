//! Chaos injection for mesh calls
//!
//! Decides, per outbound call, whether it is delivered and how late:
//! - Offline peers (refused immediately)
//! - Hanging peers (never answer)
//! - Random failures at a seeded rate
//! - Latency with jitter

use std::collections::HashSet;
use std::time::Duration;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Jitter distribution type
#[derive(Clone, Debug, PartialEq)]
pub enum JitterDistribution {
    /// No jitter
    None,
    /// Uniform distribution
    Uniform { min_ms: u32, max_ms: u32 },
    /// Pareto distribution (heavy tail)
    Pareto { scale_ms: f64, shape: f64 },
}

impl JitterDistribution {
    /// Sample a jitter value
    pub fn sample(&self, rng: &mut StdRng) -> Duration {
        match self {
            JitterDistribution::None => Duration::ZERO,
            JitterDistribution::Uniform { min_ms, max_ms } => {
                if max_ms <= min_ms {
                    return Duration::from_millis(*min_ms as u64);
                }
                let dist = Uniform::new(*min_ms, *max_ms);
                Duration::from_millis(dist.sample(rng) as u64)
            }
            JitterDistribution::Pareto { scale_ms, shape } => {
                let u: f64 = rng.gen_range(f64::EPSILON..1.0);
                let value = scale_ms / u.powf(1.0 / shape);
                Duration::from_millis(value.min(1000.0) as u64) // Cap at 1 second
            }
        }
    }
}

/// Mesh chaos configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ChaosConfig {
    /// Base latency added to every delivered call
    pub base_latency: Duration,
    pub jitter: JitterDistribution,
    /// Probability that a call fails outright (0.0 - 1.0)
    pub failure_rate: f64,
    /// Instances that refuse every call
    pub offline: HashSet<String>,
    /// Instances that accept calls and never answer
    pub hanging: HashSet<String>,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig::clean()
    }
}

impl ChaosConfig {
    /// Instant, lossless delivery
    pub fn clean() -> Self {
        ChaosConfig {
            base_latency: Duration::ZERO,
            jitter: JitterDistribution::None,
            failure_rate: 0.0,
            offline: HashSet::new(),
            hanging: HashSet::new(),
        }
    }

    /// LAN-like latency, no failures
    pub fn good() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(2),
            jitter: JitterDistribution::Uniform { min_ms: 0, max_ms: 5 },
            ..ChaosConfig::clean()
        }
    }

    /// Slow, lossy network
    pub fn poor() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(100),
            jitter: JitterDistribution::Pareto {
                scale_ms: 50.0,
                shape: 1.5,
            },
            failure_rate: 0.1,
            ..ChaosConfig::clean()
        }
    }

    pub fn with_offline(mut self, instance: impl Into<String>) -> Self {
        self.offline.insert(instance.into());
        self
    }

    pub fn with_hanging(mut self, instance: impl Into<String>) -> Self {
        self.hanging.insert(instance.into());
        self
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }
}

/// Why a call was not delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    Offline,
    Dropped,
}

/// Fate of one call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Deliver { latency: Duration },
    Fail(Fault),
    Hang,
}

/// Chaos statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChaosStats {
    pub calls: u64,
    pub delivered: u64,
    pub offline: u64,
    pub dropped: u64,
    pub hung: u64,
    pub total_latency_ms: u64,
}

impl ChaosStats {
    pub fn failure_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            (self.offline + self.dropped + self.hung) as f64 / self.calls as f64
        }
    }
}

/// Seeded chaos decisions
#[derive(Debug)]
pub struct ChaosState {
    config: ChaosConfig,
    rng: StdRng,
    stats: ChaosStats,
}

impl ChaosState {
    pub fn new(config: ChaosConfig, seed: u64) -> Self {
        ChaosState {
            config,
            rng: StdRng::seed_from_u64(seed),
            stats: ChaosStats::default(),
        }
    }

    /// Decide the fate of one call to `instance`
    pub fn decide(&mut self, instance: &str) -> Verdict {
        self.stats.calls += 1;

        if self.config.offline.contains(instance) {
            self.stats.offline += 1;
            return Verdict::Fail(Fault::Offline);
        }
        if self.config.hanging.contains(instance) {
            self.stats.hung += 1;
            return Verdict::Hang;
        }
        if self.config.failure_rate > 0.0 && self.rng.gen::<f64>() < self.config.failure_rate {
            self.stats.dropped += 1;
            return Verdict::Fail(Fault::Dropped);
        }

        let latency = self.config.base_latency + self.config.jitter.sample(&mut self.rng);
        self.stats.delivered += 1;
        self.stats.total_latency_ms += latency.as_millis() as u64;
        Verdict::Deliver { latency }
    }

    pub fn config_mut(&mut self) -> &mut ChaosConfig {
        &mut self.config
    }

    /// Get current statistics
    pub fn stats(&self) -> &ChaosStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = ChaosStats::default();
    }
}
