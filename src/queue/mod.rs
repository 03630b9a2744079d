//! Conversion queue manager.
//!
//! Owns the pending file queue, the recent conversion history, and the shared
//! progress value. [`ConversionQueue::start_conversion`] validates the whole
//! batch up front, then submits items to the engine one at a time, recording
//! every outcome in history and reporting failures through the
//! [`NotificationCenter`].

mod types;

pub use types::*;

use crate::config::{Config, ProgressConfig};
use crate::events::{Event, EventBus, EventPayload};
use crate::notifications::NotificationCenter;
use crate::progress::{converted_message, processing_message, ProgressReporter, ProgressSimulator};
use cnvrt_common::{ConversionId, FileId};
use cnvrt_engine::{ByteRequest, ConversionEngine, EngineResponse, PathRequest};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Why a batch was refused before any item was submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("Please select target format for all files")]
    MissingFormat { file_id: FileId, name: String },

    #[error("Cannot convert {name} to the same format ({target})")]
    SameFormat {
        file_id: FileId,
        name: String,
        target: String,
    },

    #[error("A conversion batch is already running")]
    AlreadyProcessing,
}

impl BatchError {
    /// Notification title for this rejection.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingFormat { .. } => "Missing Formats",
            Self::SameFormat { .. } => "Invalid Conversion",
            Self::AlreadyProcessing => "Conversion In Progress",
        }
    }
}

/// Failure of a single item. Never shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error("failed to read file content: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] cnvrt_engine::Error),

    #[error("{0}")]
    Rejected(String),
}

const ITEM_FAILURE_TITLE: &str = "Failed to load";
const ITEM_FAILURE_DESCRIPTION: &str = "The file is likely corrupted";

/// Queue, history and progress for one window's worth of conversions.
pub struct ConversionQueue {
    files: RwLock<Vec<FileItem>>,
    history: RwLock<VecDeque<HistoryEntry>>,
    history_limit: usize,
    progress: ProgressReporter,
    progress_config: ProgressConfig,
    processing: AtomicBool,
    engine: Arc<dyn ConversionEngine>,
    notifications: NotificationCenter,
    events: Arc<EventBus>,
}

impl ConversionQueue {
    pub fn new(
        config: &Config,
        engine: Arc<dyn ConversionEngine>,
        notifications: NotificationCenter,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            files: RwLock::new(Vec::new()),
            history: RwLock::new(VecDeque::with_capacity(config.queue.history_limit)),
            history_limit: config.queue.history_limit,
            progress: ProgressReporter::new(events.clone()),
            progress_config: config.progress.clone(),
            processing: AtomicBool::new(false),
            engine,
            notifications,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Queue
    // -----------------------------------------------------------------------

    /// Append to the end of the queue. No validation happens here.
    pub fn add_file(&self, item: FileItem) -> FileId {
        let id = item.id;
        let name = item.name.clone();
        self.files.write().push(item);
        self.events.publish(EventPayload::FileAdded { file_id: id, name });
        id
    }

    /// Returns false if no item had this id.
    pub fn remove_file(&self, id: FileId) -> bool {
        let removed = {
            let mut files = self.files.write();
            match files.iter().position(|f| f.id == id) {
                Some(index) => {
                    files.remove(index);
                    true
                }
                None => false,
            }
        };

        if removed {
            self.events.publish(EventPayload::FileRemoved { file_id: id });
        }
        removed
    }

    pub fn clear_files(&self) {
        self.files.write().clear();
        self.events.publish(EventPayload::FilesCleared);
    }

    /// Set the target format of a queued item. Returns false if not found.
    pub fn update_file_format(&self, id: FileId, format: impl Into<String>) -> bool {
        let format = format.into();
        let updated = {
            let mut files = self.files.write();
            match files.iter_mut().find(|f| f.id == id) {
                Some(file) => {
                    file.target_format = format.clone();
                    true
                }
                None => false,
            }
        };

        if updated {
            self.events.publish(EventPayload::FileFormatUpdated {
                file_id: id,
                target_format: format,
            });
        }
        updated
    }

    pub fn files(&self) -> Vec<FileItem> {
        self.files.read().clone()
    }

    pub fn file(&self, id: FileId) -> Option<FileItem> {
        self.files.read().iter().find(|f| f.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Prepend an entry, evicting the oldest beyond the history limit.
    pub fn add_to_history(&self, entry: HistoryEntry) {
        let (entry_id, success) = (entry.id, entry.success);
        {
            let mut history = self.history.write();
            history.push_front(entry);
            history.truncate(self.history_limit);
        }
        self.events
            .publish(EventPayload::HistoryAppended { entry_id, success });
    }

    /// Newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.read().iter().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    pub fn progress(&self) -> ProgressState {
        self.progress.snapshot()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    // -----------------------------------------------------------------------
    // Batch
    // -----------------------------------------------------------------------

    /// Convert everything in the queue.
    ///
    /// The batch is rejected as a whole, with one error notification and no
    /// state change, if any item lacks a target format or targets its own
    /// extension. Otherwise every item is submitted in order; a failing item
    /// is recorded and the batch moves on. Afterwards the queue is empty and
    /// progress is back to idle, whatever the outcome.
    pub async fn start_conversion(
        &self,
        destination: Option<&Path>,
        keep_transparency: bool,
    ) -> Result<BatchSummary, BatchError> {
        if self.is_processing() {
            tracing::warn!("Ignoring start request while a batch is running");
            return Err(BatchError::AlreadyProcessing);
        }

        let batch = self.files();
        if let Err(e) = validate_batch(&batch) {
            tracing::warn!("Batch rejected: {}", e);
            self.notifications.error(e.title(), Some(&e.to_string()));
            return Err(e);
        }

        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BatchError::AlreadyProcessing);
        }
        let mut guard = BatchGuard {
            queue: self,
            completed: false,
        };

        let total = batch.len();
        tracing::info!("Starting conversion of {} file(s)", total);
        self.events
            .publish(EventPayload::ProcessingStarted { total });

        let mut summary = BatchSummary::default();
        for (index, item) in batch.iter().enumerate() {
            let position = index + 1;
            self.progress
                .set(0, processing_message(position, total, &item.name, 0));

            let output_path = output_path_for(item, destination);
            tracing::debug!(
                "Converting {}/{} {:?} -> {:?}",
                position,
                total,
                item.name,
                output_path
            );

            let outcome = self
                .convert_item(item, output_path, position, total, keep_transparency)
                .await;

            match outcome {
                Ok(id) => {
                    summary.succeeded += 1;
                    self.add_to_history(HistoryEntry::new(
                        id,
                        &item.extension,
                        &item.target_format,
                        true,
                    ));
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!("Conversion of {} failed: {}", item.name, e);
                    self.notifications.error(
                        format!("{}: {}", ITEM_FAILURE_TITLE, item.name),
                        Some(ITEM_FAILURE_DESCRIPTION),
                    );
                    self.add_to_history(HistoryEntry::new(
                        ConversionId::new(),
                        &item.extension,
                        &item.target_format,
                        false,
                    ));
                }
            }
        }

        guard.completed = true;
        drop(guard);

        tracing::info!(
            "Conversion finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );
        self.events.publish(EventPayload::ProcessingFinished {
            succeeded: summary.succeeded,
            failed: summary.failed,
        });

        if summary.failed == 0 && summary.succeeded > 0 {
            self.notifications.success(
                "Conversion Complete",
                Some(&completion_message(summary.succeeded)),
            );
        }

        Ok(summary)
    }

    /// Submit one item and return the engine's id on success.
    async fn convert_item(
        &self,
        item: &FileItem,
        output_path: PathBuf,
        position: usize,
        total: usize,
        keep_transparency: bool,
    ) -> Result<ConversionId, ItemError> {
        if let Some(content) = item.content.as_ref().filter(|_| item.submits_in_memory()) {
            let data = content.read().await?;
            let response = self
                .engine
                .convert_bytes(ByteRequest {
                    data,
                    output_path,
                    from_format: item.extension.clone(),
                    to_format: item.target_format.clone(),
                    keep_transparency,
                })
                .await?;

            self.progress
                .set(100, converted_message(position, total, &item.name));
            return accept(response, "Conversion failed");
        }

        let request = PathRequest {
            input_path: item.path.clone(),
            output_path,
            from_format: item.extension.clone(),
            to_format: item.target_format.clone(),
        };

        let (response, fallback) = if item.is_video() {
            let simulator = ProgressSimulator::start(
                self.progress.clone(),
                &self.progress_config,
                position,
                total,
                &item.name,
            );
            let response = self.engine.convert_path(request).await;
            simulator.stop();
            (response?, "Video conversion failed")
        } else {
            self.progress
                .set(50, processing_message(position, total, &item.name, 50));
            (
                self.engine.convert_path(request).await?,
                "Image conversion failed",
            )
        };

        let id = accept(response, fallback)?;
        self.progress
            .set(100, converted_message(position, total, &item.name));
        Ok(id)
    }
}

/// Returns the queue to idle when a batch ends, including when the batch
/// future is dropped mid-flight.
struct BatchGuard<'a> {
    queue: &'a ConversionQueue,
    completed: bool,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!("Conversion batch cancelled before completion");
        }
        self.queue.processing.store(false, Ordering::SeqCst);
        self.queue.clear_files();
        self.queue.progress.reset();
    }
}

/// Check the whole batch before anything is submitted.
///
/// Missing formats are reported ahead of same-format items; for the latter
/// the first offender in queue order is named.
pub fn validate_batch(files: &[FileItem]) -> Result<(), BatchError> {
    if let Some(file) = files.iter().find(|f| !f.has_target()) {
        return Err(BatchError::MissingFormat {
            file_id: file.id,
            name: file.name.clone(),
        });
    }

    if let Some(file) = files.iter().find(|f| f.targets_own_format()) {
        return Err(BatchError::SameFormat {
            file_id: file.id,
            name: file.name.clone(),
            target: file.target_format.clone(),
        });
    }

    Ok(())
}

/// `{base}.{target}`, inside `destination` when one is given.
pub fn output_path_for(item: &FileItem, destination: Option<&Path>) -> PathBuf {
    let name = item.output_name();
    match destination {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

fn completion_message(count: usize) -> String {
    format!(
        "Successfully converted {} file{}",
        count,
        if count == 1 { "" } else { "s" }
    )
}

fn accept(response: EngineResponse, fallback: &str) -> Result<ConversionId, ItemError> {
    if response.success {
        Ok(response.id)
    } else {
        Err(ItemError::Rejected(
            response.error.unwrap_or_else(|| fallback.to_string()),
        ))
    }
}
