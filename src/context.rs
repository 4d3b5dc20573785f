//! Application context
//!
//! Explicit construction point for the pieces every coordinator dispatch
//! needs: the buffer registry and the engine handle. Built once by the
//! host and passed by `&mut`; nothing in this crate is a global, and the
//! context owns the lifecycle of what it holds.

use crate::engine::HighlightEngine;
use crate::model::buffer::BufferManager;

pub struct EditorContext {
    pub buffers: BufferManager,
    pub engine: Box<dyn HighlightEngine>,
}

impl EditorContext {
    pub fn new(engine: Box<dyn HighlightEngine>) -> Self {
        Self {
            buffers: BufferManager::new(),
            engine,
        }
    }
}
