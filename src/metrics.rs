//! Metrics snapshots and export for keyed pools

use std::collections::HashMap;

/// Point-in-time counters of one pool
///
/// # Examples
///
/// ```
/// use esox_keyedpool::{PoolConfiguration, PoolHooks, PoolRegistry};
///
/// let mut registry = PoolRegistry::new();
/// let mut pool = registry
///     .get_or_create_pool("orbs", PoolHooks::new(|| 0u32), PoolConfiguration::default())
///     .unwrap();
///
/// let _orb = pool.acquire();
/// let metrics = pool.metrics();
/// assert_eq!(metrics.outstanding, 1);
/// assert_eq!(metrics.total_created, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Pool key
    pub pool: String,

    /// Resources currently handed out
    pub outstanding: usize,

    /// Resources in the free list
    pub idle: usize,

    /// Free-list capacity
    pub capacity: usize,

    /// Total acquisitions
    pub total_taken: u64,

    /// Resources constructed by the factory
    pub total_created: u64,

    /// Resources disposed, including failed disposals
    pub total_destroyed: u64,

    /// Disposals whose hook reported an error
    pub destroy_failures: u64,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("pool".to_string(), self.pool.clone());
        metrics.insert("outstanding".to_string(), self.outstanding.to_string());
        metrics.insert("idle".to_string(), self.idle.to_string());
        metrics.insert("capacity".to_string(), self.capacity.to_string());
        metrics.insert("total_taken".to_string(), self.total_taken.to_string());
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("total_destroyed".to_string(), self.total_destroyed.to_string());
        metrics.insert("destroy_failures".to_string(), self.destroy_failures.to_string());
        metrics
    }
}

/// Snapshot of every pool in a registry
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegistryMetrics {
    /// Per-pool snapshots, sorted by key
    pub pools: Vec<PoolMetrics>,

    /// Resources tracked by the registry, idle or outstanding
    pub tracked_resources: usize,

    pub shutting_down: bool,
}

impl RegistryMetrics {
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn total_outstanding(&self) -> usize {
        self.pools.iter().map(|p| p.outstanding).sum()
    }

    pub fn total_idle(&self) -> usize {
        self.pools.iter().map(|p| p.idle).sum()
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export registry-wide values as a flat map
    pub fn export(metrics: &RegistryMetrics) -> HashMap<String, String> {
        let mut out = HashMap::new();
        out.insert("pools".to_string(), metrics.pool_count().to_string());
        out.insert("tracked_resources".to_string(), metrics.tracked_resources.to_string());
        out.insert("outstanding".to_string(), metrics.total_outstanding().to_string());
        out.insert("idle".to_string(), metrics.total_idle().to_string());
        out.insert("shutting_down".to_string(), metrics.shutting_down.to_string());
        out
    }

    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_keyedpool::{MetricsExporter, PoolConfiguration, PoolHooks, PoolRegistry};
    /// use std::collections::HashMap;
    ///
    /// let mut registry = PoolRegistry::new();
    /// registry.get_or_create_pool("sparks", PoolHooks::new(|| 0u8), PoolConfiguration::default());
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("scene".to_string(), "arena".to_string());
    ///
    /// let output = MetricsExporter::export_prometheus(&registry.metrics(), Some(&tags));
    /// assert!(output.contains("keyedpool_pools{scene=\"arena\"} 1"));
    /// assert!(output.contains("pool=\"sparks\""));
    /// ```
    pub fn export_prometheus(
        metrics: &RegistryMetrics,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let base = Self::format_labels(None, tags);

        output.push_str("# HELP keyedpool_pools Registered pools\n");
        output.push_str("# TYPE keyedpool_pools gauge\n");
        output.push_str(&format!("keyedpool_pools{{{}}} {}\n", base, metrics.pool_count()));

        let gauges: [(&str, &str, fn(&PoolMetrics) -> String); 2] = [
            ("keyedpool_resources_outstanding", "Resources currently handed out", |p| p.outstanding.to_string()),
            ("keyedpool_resources_idle", "Resources in the free list", |p| p.idle.to_string()),
        ];
        let counters: [(&str, &str, fn(&PoolMetrics) -> String); 4] = [
            ("keyedpool_resources_taken_total", "Total acquisitions", |p| p.total_taken.to_string()),
            ("keyedpool_resources_created_total", "Resources constructed", |p| p.total_created.to_string()),
            ("keyedpool_resources_destroyed_total", "Resources disposed", |p| p.total_destroyed.to_string()),
            ("keyedpool_destroy_failures_total", "Failed disposals", |p| p.destroy_failures.to_string()),
        ];

        for (kind, series) in [("gauge", &gauges[..]), ("counter", &counters[..])] {
            for (name, help, value) in series {
                output.push_str(&format!("# HELP {} {}\n", name, help));
                output.push_str(&format!("# TYPE {} {}\n", name, kind));
                for pool in &metrics.pools {
                    let labels = Self::format_labels(Some(&pool.pool), tags);
                    output.push_str(&format!("{}{{{}}} {}\n", name, labels, value(pool)));
                }
            }
        }

        output
    }

    fn format_labels(pool: Option<&str>, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = Vec::new();
        if let Some(pool) = pool {
            labels.push(format!("pool=\"{}\"", pool));
        }

        if let Some(tags) = tags {
            let mut sorted: Vec<_> = tags.iter().collect();
            sorted.sort();
            for (key, value) in sorted {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}
