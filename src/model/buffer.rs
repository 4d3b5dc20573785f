//! Buffer registry
//!
//! Tracks open buffers' metadata and serializes edit application against
//! the external engine. Entries are explicit tagged variants: an `Active`
//! buffer carries cursor and modification state, an `Inactive` one only
//! identity fields, so the tag rather than the shape of the value says
//! what is trustworthy.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use crate::engine::{BufferEdit, EngineResult, HighlightEngine};
use crate::model::highlight::{BufferId, Position};

// ============================================================================
// Buffer variants
// ============================================================================

/// Full metadata for a buffer attached to a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub id: BufferId,
    pub file_path: Option<PathBuf>,
    pub language: String,
    /// Monotonically increasing edit counter reported by the engine
    pub version: u64,
    pub line_count: usize,
    pub cursor: Position,
    pub modified: bool,
}

impl Buffer {
    /// File extension with leading dot (`".rs"`), or empty for pathless
    /// buffers
    pub fn extension(&self) -> String {
        extension_of(self.file_path.as_deref())
    }
}

/// Identity-only metadata for buffers open in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactiveBuffer {
    pub id: BufferId,
    pub file_path: Option<PathBuf>,
    pub language: String,
    pub version: u64,
}

/// A registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEntry {
    Active(Buffer),
    Inactive(InactiveBuffer),
}

impl BufferEntry {
    pub fn id(&self) -> BufferId {
        match self {
            BufferEntry::Active(b) => b.id,
            BufferEntry::Inactive(b) => b.id,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            BufferEntry::Active(b) => b.version,
            BufferEntry::Inactive(b) => b.version,
        }
    }

    pub fn as_active(&self) -> Option<&Buffer> {
        match self {
            BufferEntry::Active(b) => Some(b),
            BufferEntry::Inactive(_) => None,
        }
    }
}

fn extension_of(path: Option<&std::path::Path>) -> String {
    path.and_then(|p| p.extension())
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

// ============================================================================
// Buffer manager
// ============================================================================

/// Registry of open buffers plus the serialized edit queue.
///
/// Edits are applied against the engine strictly one at a time, in the
/// order they were queued; a failed edit stays at the head of the queue.
#[derive(Debug, Default)]
pub struct BufferManager {
    buffers: HashMap<BufferId, BufferEntry>,
    active: Option<BufferId>,
    pending_edits: VecDeque<(BufferId, BufferEdit)>,
}

impl BufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the registry from an engine event: `current` becomes the
    /// active buffer, `background` entries become (or stay) inactive. The
    /// previously active buffer is demoted to inactive.
    pub fn update_from_event(&mut self, current: Buffer, background: Vec<InactiveBuffer>) {
        if let Some(previous) = self.active.filter(|id| *id != current.id) {
            if let Some(BufferEntry::Active(buf)) = self.buffers.get(&previous) {
                let demoted = InactiveBuffer {
                    id: buf.id,
                    file_path: buf.file_path.clone(),
                    language: buf.language.clone(),
                    version: buf.version,
                };
                self.buffers.insert(previous, BufferEntry::Inactive(demoted));
            }
        }

        tracing::trace!(id = current.id.0, version = current.version, "active buffer updated");
        self.active = Some(current.id);
        self.buffers.insert(current.id, BufferEntry::Active(current));

        for buffer in background {
            if Some(buffer.id) == self.active {
                continue;
            }
            self.buffers.insert(buffer.id, BufferEntry::Inactive(buffer));
        }
    }

    pub fn get(&self, id: BufferId) -> Option<&BufferEntry> {
        self.buffers.get(&id)
    }

    /// The active buffer's full metadata, if any buffer is active
    pub fn active(&self) -> Option<&Buffer> {
        self.active
            .and_then(|id| self.buffers.get(&id))
            .and_then(BufferEntry::as_active)
    }

    pub fn active_id(&self) -> Option<BufferId> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Remove a closed buffer, returning its last known entry. Pending
    /// edits for the buffer are discarded.
    pub fn close(&mut self, id: BufferId) -> Option<BufferEntry> {
        if self.active == Some(id) {
            self.active = None;
        }
        self.pending_edits.retain(|(edit_id, _)| *edit_id != id);
        let removed = self.buffers.remove(&id);
        if removed.is_some() {
            tracing::debug!(id = id.0, "closed buffer removed from registry");
        }
        removed
    }

    /// Queue an edit for serialized application
    pub fn queue_edit(&mut self, id: BufferId, edit: BufferEdit) {
        self.pending_edits.push_back((id, edit));
    }

    /// Drain queued edits in FIFO order through the engine, one at a time.
    /// Stops at the first failure and propagates it; the failed edit and
    /// everything behind it stay queued.
    pub fn flush_edits(&mut self, engine: &mut dyn HighlightEngine) -> EngineResult<usize> {
        let mut applied = 0;
        while let Some((id, edit)) = self.pending_edits.front() {
            engine.apply_edit(*id, edit)?;
            self.pending_edits.pop_front();
            applied += 1;
        }
        if applied > 0 {
            tracing::debug!(applied, "flushed buffer edits");
        }
        Ok(applied)
    }

    pub fn pending_edit_count(&self) -> usize {
        self.pending_edits.len()
    }
}
