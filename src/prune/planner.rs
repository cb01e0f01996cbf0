use super::probe::{CacheEntry, CacheIndex};
use super::request::PruneRequest;
use super::size::format_size;
use crate::error::Result;
use crate::logging::Logger;

/// What the remover should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictionPlan {
    /// Remove these entries in order, leaving `final_bytes` behind
    Evict {
        entries: Vec<CacheEntry>,
        final_bytes: u64,
    },
    /// Eviction cannot reach the target; remove the cache root wholesale
    WipeAll { total_bytes: u64 },
}

impl EvictionPlan {
    fn nothing(final_bytes: u64) -> Self {
        EvictionPlan::Evict {
            entries: Vec::new(),
            final_bytes,
        }
    }

    /// True when the run has nothing to remove.
    pub fn is_empty(&self) -> bool {
        matches!(self, EvictionPlan::Evict { entries, .. } if entries.is_empty())
    }

    /// Size the cache is projected to have after the plan is applied.
    pub fn final_bytes(&self) -> u64 {
        match self {
            EvictionPlan::Evict { final_bytes, .. } => *final_bytes,
            EvictionPlan::WipeAll { .. } => 0,
        }
    }

    /// Bytes the plan expects to reclaim.
    pub fn planned_bytes(&self) -> u64 {
        match self {
            EvictionPlan::Evict { entries, .. } => entries
                .iter()
                .fold(0u64, |sum, entry| sum.saturating_add(entry.size())),
            EvictionPlan::WipeAll { total_bytes } => *total_bytes,
        }
    }
}

/// Chooses which entries to evict, oldest first
#[derive(Debug, Clone)]
pub struct Planner {
    log: Logger,
}

impl Planner {
    pub fn new(log: Logger) -> Self {
        Self { log }
    }

    /// Compute the eviction plan for `index` under `request`.
    ///
    /// Eviction starts when the cache size meets or exceeds the quota and
    /// stops once the remaining size is at or below
    /// `quota_bytes * target_ratio`. Entries are taken in ascending atime
    /// order, ties broken by ascending path.
    ///
    /// # Errors
    ///
    /// Returns [`PruneError::InvalidInput`](crate::error::PruneError) when
    /// the target ratio is outside (0, 1).
    pub fn plan(&self, index: &CacheIndex, request: &PruneRequest) -> Result<EvictionPlan> {
        request.validate()?;

        let total = index.total_bytes();
        if index.is_empty() {
            return Ok(EvictionPlan::nothing(0));
        }
        if total < request.quota_bytes() {
            return Ok(EvictionPlan::nothing(total));
        }

        let floor = request.floor();
        if floor <= 0.0 {
            // A zero floor means the whole cache goes; remove the root wholesale.
            self.log.debug(format!(
                "Target size is {floor}; planning a wipe of the cache root"
            ));
            return Ok(EvictionPlan::WipeAll { total_bytes: total });
        }

        let mut remaining = total;
        let mut entries = Vec::new();

        for entry in index.oldest_first() {
            if (remaining as f64) <= floor {
                break;
            }
            remaining = remaining.saturating_sub(entry.size());
            entries.push(entry.clone());
        }

        self.log.debug(format!(
            "Planned {} of {} entries for eviction, {} -> {}",
            entries.len(),
            index.len(),
            format_size(total),
            format_size(remaining)
        ));

        Ok(EvictionPlan::Evict {
            entries,
            final_bytes: remaining,
        })
    }
}
