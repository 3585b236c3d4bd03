//! The technology store.
//!
//! [`TechnologyStore`] owns the authoritative collection. Every mutation builds
//! a new collection, swaps it in and writes it through to [`Storage`]. Lookups
//! by an unknown id are silent no-ops reported through the return value rather
//! than errors, so stale references from a host never fail.

mod notification;
mod seed;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::config::TrackerConfig;
use crate::db::Storage;
use crate::error::ImportError;
use crate::ids::IdAllocator;
use crate::models::*;
use crate::validation;

pub use notification::{Notification, NotificationKind};
pub use seed::seed_technologies;

/// Title given to technologies created without one.
pub const PLACEHOLDER_TITLE: &str = "New technology";

pub struct TechnologyStore {
    storage: Storage,
    config: TrackerConfig,
    technologies: Vec<Technology>,
    ids: IdAllocator,
    notification: Option<Notification>,
}

impl TechnologyStore {
    /// Read the persisted collection, or start from the seed list when nothing
    /// usable is stored.
    pub fn load(storage: Storage, config: TrackerConfig) -> Self {
        let technologies: Vec<Technology> =
            storage.load_or(&config.storage_key, seed_technologies());
        tracing::debug!("Loaded {} technologies", technologies.len());

        Self {
            ids: IdAllocator::seeded_from(&technologies),
            storage,
            config,
            technologies,
            notification: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn technologies(&self) -> &[Technology] {
        &self.technologies
    }

    pub fn get(&self, id: u64) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.id == id)
    }

    pub fn by_status(&self, status: Status) -> Vec<&Technology> {
        self.technologies
            .iter()
            .filter(|t| t.status == status)
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Technology> {
        self.technologies
            .iter()
            .filter(|t| t.category.as_deref() == Some(category))
            .collect()
    }

    /// Case-insensitive match on title or description. A blank query matches
    /// everything.
    pub fn search(&self, query: &str) -> Vec<&Technology> {
        let needle = query.trim().to_lowercase();
        self.technologies
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// A randomly chosen technology that has not been started yet.
    pub fn suggest_next(&self) -> Option<&Technology> {
        let candidates = self.by_status(Status::NotStarted);
        if candidates.is_empty() {
            return None;
        }
        let pick = (uuid::Uuid::new_v4().as_u128() % candidates.len() as u128) as usize;
        candidates.get(pick).copied()
    }

    /// Percentage of completed technologies, rounded. Zero for an empty collection.
    pub fn calculate_progress(&self) -> u8 {
        let total = self.technologies.len();
        if total == 0 {
            return 0;
        }
        let completed = self.by_status(Status::Completed).len();
        (100.0 * completed as f64 / total as f64).round() as u8
    }

    pub fn get_stats(&self) -> Stats {
        self.get_stats_on(Local::now().date_naive())
    }

    /// Statistics with overdue deadlines judged against `today`.
    pub fn get_stats_on(&self, today: NaiveDate) -> Stats {
        let mut stats = Stats {
            total: self.technologies.len(),
            ..Stats::default()
        };
        for tech in &self.technologies {
            match tech.status {
                Status::Completed => stats.completed += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::NotStarted => stats.not_started += 1,
            }
            if tech.is_overdue(today) {
                stats.overdue += 1;
            }
        }
        stats
    }

    // ============================================================
    // Mutations
    // ============================================================

    pub fn update_status(&mut self, id: u64, status: Status) -> bool {
        self.update_where(id, |tech| tech.status = status)
    }

    /// Advance a technology one step through its status cycle.
    /// Returns the new status, or `None` when the id is unknown.
    pub fn cycle_status(&mut self, id: u64) -> Option<Status> {
        let next = self.get(id)?.status.next();
        self.update_status(id, next);
        Some(next)
    }

    pub fn update_all_status(&mut self, status: Status) {
        let next = self
            .technologies
            .iter()
            .map(|tech| Technology {
                status,
                ..tech.clone()
            })
            .collect();
        tracing::debug!("Setting every technology to {}", status);
        self.commit(next);
    }

    pub fn update_notes(&mut self, id: u64, notes: &str) -> bool {
        self.update_where(id, |tech| tech.notes = notes.to_string())
    }

    /// Set or clear (with `None`) the deadline of a technology.
    pub fn update_deadline(&mut self, id: u64, deadline: Option<NaiveDate>) -> bool {
        self.update_where(id, |tech| tech.deadline = deadline)
    }

    pub fn add_resource(&mut self, id: u64, url: &str) -> bool {
        self.update_where(id, |tech| tech.resources.push(url.to_string()))
    }

    /// Remove every occurrence of `url` from the technology's resources.
    pub fn remove_resource(&mut self, id: u64, url: &str) -> bool {
        self.update_where(id, |tech| tech.resources.retain(|r| r != url))
    }

    /// Append a new technology. Returns `None`, leaving the collection
    /// unchanged, once no id is left to assign.
    pub fn add_technology(&mut self, input: CreateTechnologyInput) -> Option<Technology> {
        let Some(id) = self.ids.allocate() else {
            tracing::warn!("No free technology id left, nothing added");
            return None;
        };

        let title = match input.title.trim() {
            "" => PLACEHOLDER_TITLE.to_string(),
            title => title.to_string(),
        };

        let tech = Technology {
            id,
            title,
            description: input.description,
            status: Status::NotStarted,
            notes: String::new(),
            deadline: None,
            resources: Vec::new(),
            category: input.category.filter(|c| !c.trim().is_empty()),
        };

        tracing::debug!("Adding technology {} '{}'", tech.id, tech.title);
        let mut next = self.technologies.clone();
        next.push(tech.clone());
        self.commit(next);
        Some(tech)
    }

    /// Merge the given fields into a technology, leaving the rest untouched.
    /// A blank title is ignored so a technology always keeps a title.
    pub fn update_technology(
        &mut self,
        id: u64,
        input: UpdateTechnologyInput,
    ) -> Option<Technology> {
        let updated = self.update_where(id, |tech| {
            if let Some(title) = input.title.as_deref().map(str::trim) {
                if !title.is_empty() {
                    tech.title = title.to_string();
                }
            }
            if let Some(description) = input.description {
                tech.description = description;
            }
            if let Some(status) = input.status {
                tech.status = status;
            }
            if let Some(notes) = input.notes {
                tech.notes = notes;
            }
            if let Some(deadline) = input.deadline {
                tech.deadline = deadline;
            }
            if let Some(resources) = input.resources {
                tech.resources = resources;
            }
            if let Some(category) = input.category {
                tech.category = Some(category).filter(|c| !c.trim().is_empty());
            }
        });

        if updated {
            self.get(id).cloned()
        } else {
            None
        }
    }

    pub fn delete_technology(&mut self, id: u64) -> bool {
        if self.get(id).is_none() {
            tracing::debug!("Delete skipped, no technology with id {}", id);
            return false;
        }
        let next = self
            .technologies
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();
        tracing::debug!("Deleting technology {}", id);
        self.commit(next);
        true
    }

    /// Replace the collection with the seed list and drop any notification.
    pub fn reset_all_data(&mut self) {
        let seed = seed_technologies();
        self.ids = IdAllocator::seeded_from(&seed);
        self.notification = None;
        tracing::info!("Resetting collection to {} seed technologies", seed.len());
        self.commit(seed);
    }

    // ============================================================
    // Export
    // ============================================================

    pub fn export_to_json(&self) -> ExportDocument {
        ExportDocument {
            exported_at: Local::now().to_rfc3339(),
            roadmap_name: self.config.roadmap_name.clone(),
            version: EXPORT_VERSION.to_string(),
            technologies: self.technologies.clone(),
            statistics: self.get_stats(),
            progress: self.calculate_progress(),
        }
    }

    /// Write the export document into `dir` and return the file's path.
    pub async fn export_to_file(&self, dir: &Path) -> Result<PathBuf> {
        let document = self.export_to_json();
        let json = serde_json::to_string_pretty(&document).context("Failed to serialize export")?;

        let path = dir.join(format!(
            "techtracker-export-{}.json",
            Local::now().format("%Y-%m-%d")
        ));
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write export to {}", path.display()))?;

        tracing::info!(
            "Exported {} technologies to {}",
            document.technologies.len(),
            path.display()
        );
        Ok(path)
    }

    // ============================================================
    // Import
    // ============================================================

    /// Import a JSON file, replacing the whole collection on success.
    ///
    /// The file must have a `.json` extension and fit within the configured
    /// size limit. Any failure leaves the collection untouched. Every outcome
    /// also raises a notification.
    pub async fn import_from_json(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<ImportOutcome, ImportError> {
        let result = self.read_import_file(path.as_ref()).await;
        let result = match result {
            Ok(bytes) => self.apply_import(&bytes),
            Err(e) => Err(e),
        };
        self.notify_import(&result);
        result
    }

    /// Import a JSON document that is already in memory.
    pub fn import_from_str(&mut self, text: &str) -> Result<ImportOutcome, ImportError> {
        let result = self.apply_import(text.as_bytes());
        self.notify_import(&result);
        result
    }

    /// Raw file contents. Decoding is left to the JSON parser so content that
    /// is not UTF-8 is reported as a parse failure.
    async fn read_import_file(&self, path: &Path) -> Result<Vec<u8>, ImportError> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            return Err(ImportError::UnsupportedFileType(name));
        }

        let size = tokio::fs::metadata(path).await?.len();
        let limit = self.config.max_import_bytes;
        if size > limit {
            return Err(ImportError::FileTooLarge { size, limit });
        }

        Ok(tokio::fs::read(path).await?)
    }

    fn apply_import(&mut self, content: &[u8]) -> Result<ImportOutcome, ImportError> {
        let raw: serde_json::Value = serde_json::from_slice(content)?;
        let report = validation::validate(&raw, &self.config.roadmap_name);

        if !report.valid {
            tracing::warn!(
                "Import rejected with {} error(s), {} record(s) passed",
                report.errors.len(),
                report.technologies.len()
            );
            return Err(ImportError::Validation(report.errors));
        }

        for warning in &report.warnings {
            tracing::warn!("Import: {}", warning);
        }

        self.ids = IdAllocator::seeded_from(&report.technologies);
        self.commit(report.technologies.clone());
        tracing::info!(
            "Imported {} technologies from '{}'",
            report.metadata.count,
            report.metadata.roadmap_name
        );

        Ok(ImportOutcome {
            technologies: report.technologies,
            metadata: report.metadata,
            warnings: report.warnings,
        })
    }

    // ============================================================
    // Notifications
    // ============================================================

    /// The current notification, unless it has expired.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification_at(Instant::now())
    }

    pub fn notification_at(&self, now: Instant) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired_at(now))
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    fn notify_import(&mut self, result: &Result<ImportOutcome, ImportError>) {
        self.notification = Some(match result {
            Ok(outcome) => {
                let mut message = format!(
                    "Imported {} technologies from '{}'",
                    outcome.metadata.count, outcome.metadata.roadmap_name
                );
                if !outcome.warnings.is_empty() {
                    message.push_str(&format!(" ({} warning(s))", outcome.warnings.len()));
                }
                Notification::new(
                    NotificationKind::Success,
                    message,
                    self.config.success_notice(),
                )
            }
            Err(e) => Notification::new(
                NotificationKind::Error,
                e.to_string(),
                self.config.error_notice(),
            ),
        });
    }

    // ============================================================
    // Internals
    // ============================================================

    fn update_where(&mut self, id: u64, apply: impl FnOnce(&mut Technology)) -> bool {
        let Some(index) = self.technologies.iter().position(|t| t.id == id) else {
            tracing::debug!("No technology with id {}, nothing to update", id);
            return false;
        };

        let mut next = self.technologies.clone();
        apply(&mut next[index]);
        self.commit(next);
        true
    }

    /// Swap in a new collection and write it through to storage. A failed
    /// write is logged; the in-memory collection stays authoritative.
    fn commit(&mut self, next: Vec<Technology>) {
        self.technologies = next;
        if let Err(e) = self.storage.save(&self.config.storage_key, &self.technologies) {
            tracing::error!("Failed to persist technologies: {:#}", e);
        }
    }
}
