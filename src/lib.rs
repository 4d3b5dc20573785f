//! prism - incremental syntax highlighting engine
//!
//! Receives buffer-change and viewport events from an embedding editor
//! engine, tracks per-line tokenization state in a pure store, and
//! reconciles the visible band of the active buffer into minimal batched
//! highlight updates.

pub mod config;
pub mod config_paths;
pub mod context;
pub mod engine;
pub mod highlighter;
pub mod messages;
pub mod model;
pub mod reconciler;
pub mod scorer;
pub mod theme;
pub mod throttle;
pub mod tokenizer;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use config::HighlightConfig;
pub use context::EditorContext;
pub use engine::{
    BufferChangedEvent, BufferContext, BufferEdit, ContentChange, EngineError, EngineResult,
    HighlightEngine, HighlightSpan,
};
pub use highlighter::SyntaxHighlighter;
pub use messages::HighlightMsg;
pub use model::buffer::{Buffer, BufferManager, InactiveBuffer};
pub use model::highlight::{BufferId, HighlightState, Position, Range, RuleStack, Token};
pub use theme::{Theme, TokenColor};
pub use tokenizer::LineTokenizer;
