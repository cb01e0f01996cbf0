//! The prune run: reap, probe, plan, remove, report.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{PruneError, Result};
use crate::logging::{Level, Logger};
use crate::prune::size::format_size;
use crate::prune::{
    EvictionPlan, Planner, Probe, PruneRequest, ReapReport, RemovalReport, Remover,
};
use crate::timestamp::age_in_days;

/// What a prune run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    /// Cache size at enumeration
    pub initial_bytes: u64,
    /// Quota the run was checked against
    pub quota_bytes: u64,
    /// Entries the planner selected
    pub planned_entries: usize,
    /// Bytes the planner expected to reclaim
    pub planned_bytes: u64,
    /// True when the plan removed the cache root wholesale
    pub wiped: bool,
    /// True when nothing was touched because of `--dry-run`
    pub dry_run: bool,
    /// Outcome of applying the plan
    pub removal: RemovalReport,
    /// Outcome of the stale `.del` sweep
    pub reaped: ReapReport,
}

pub struct Prune<'a> {
    request: PruneRequest,
    dry_run: bool,
    reap: bool,
    log: &'a Logger,
}

pub struct PruneBuilder<'a> {
    request: Option<PruneRequest>,
    dry_run: bool,
    reap: bool,
    log: &'a Logger,
}

impl<'a> PruneBuilder<'a> {
    pub fn new(log: &'a Logger) -> Self {
        Self {
            request: None,
            dry_run: false,
            reap: true,
            log,
        }
    }

    pub fn request(mut self, request: PruneRequest) -> Self {
        self.request = Some(request);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn reap(mut self, reap: bool) -> Self {
        self.reap = reap;
        self
    }

    pub fn build(self) -> Result<Prune<'a>> {
        let request = self
            .request
            .ok_or(PruneError::MissingOption { name: "request" })?;

        Ok(Prune {
            request,
            dry_run: self.dry_run,
            reap: self.reap,
            log: self.log,
        })
    }
}

impl<'a> Prune<'a> {
    pub fn builder(log: &'a Logger) -> PruneBuilder<'a> {
        PruneBuilder::new(log)
    }

    /// Execute the prune.
    ///
    /// The request is validated and the cache root checked before anything
    /// on disk changes.
    pub fn run(self) -> Result<PruneSummary> {
        self.request.validate()?;
        check_cache_dir(self.request.cache_root())?;

        let log = self.log;
        let root = self.request.cache_root();
        let remover = Remover::new(root, log.clone());
        let mut summary = PruneSummary {
            quota_bytes: self.request.quota_bytes(),
            dry_run: self.dry_run,
            ..PruneSummary::default()
        };

        log.debug(format!("Pruning {}", self.request));

        if self.reap && !self.dry_run {
            summary.reaped = remover.reap_stale();
            if summary.reaped.files_reaped > 0 {
                log.info(format!(
                    "Reaped {} stale .del files ({})",
                    summary.reaped.files_reaped,
                    format_size(summary.reaped.bytes_reaped)
                ));
            }
        }

        let index = Probe::new(log.clone()).enumerate(root)?;
        summary.initial_bytes = index.total_bytes();

        let plan = Planner::new(log.clone()).plan(&index, &self.request)?;
        summary.planned_bytes = plan.planned_bytes();

        if plan.is_empty() {
            log.info(format!(
                "Cache size {} is within boundaries of quota {}",
                format_size(index.total_bytes()),
                format_size(self.request.quota_bytes())
            ));
            return Ok(summary);
        }

        log.info(format!(
            "Cache size {} meets or exceeds quota {}; pruning to {}",
            format_size(index.total_bytes()),
            format_size(self.request.quota_bytes()),
            format_size(self.request.floor() as u64)
        ));

        match &plan {
            EvictionPlan::Evict { entries, .. } => {
                summary.planned_entries = entries.len();
                if log.enabled(Level::Debug) {
                    for entry in entries {
                        log.debug(format!(
                            "  {} {} ({}, last used {} days ago)",
                            if self.dry_run { "Would remove" } else { "Removing" },
                            entry.path().display(),
                            format_size(entry.size()),
                            age_in_days(entry.atime())
                        ));
                    }
                }
            }
            EvictionPlan::WipeAll { .. } => {
                summary.planned_entries = index.len();
                summary.wiped = !self.dry_run;
            }
        }

        if self.dry_run {
            let what = if matches!(plan, EvictionPlan::WipeAll { .. }) {
                format!("wipe {}", root.display())
            } else {
                format!("remove {} entries", summary.planned_entries)
            };
            log.info(format!(
                "Dry run: would {what}, reclaiming {} and leaving {}",
                format_size(plan.planned_bytes()),
                format_size(plan.final_bytes())
            ));
            return Ok(summary);
        }

        summary.removal = remover.apply(&plan)?;
        report(log, &summary);

        Ok(summary)
    }
}

fn check_cache_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PruneError::NotADirectory(path.to_path_buf())),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(PruneError::CacheDirNotFound(path.to_path_buf()))
        }
        Err(source) => Err(PruneError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn report(log: &Logger, summary: &PruneSummary) {
    let removal = &summary.removal;
    log.info("Prune complete:");
    log.info(format!(
        "  Initial size: {}",
        format_size(summary.initial_bytes)
    ));
    log.info(format!(
        "  Space reclaimed: {}",
        format_size(removal.bytes_reclaimed)
    ));
    if summary.wiped {
        log.info("  Cache root removed");
    } else {
        log.info(format!("  Entries removed: {}", removal.entries_removed));
        log.info(format!("  Entries skipped: {}", removal.entries_skipped));
    }
    if removal.entries_errored > 0 {
        log.warning(format!(
            "{} entries could not be unlinked after being claimed; their .del files remain",
            removal.entries_errored
        ));
    }
}
