//! State types for the highlight core
//!
//! `highlight` holds the pure store state the reducer transitions;
//! `buffer` holds the buffer registry the coordinator resolves the active
//! buffer from.

pub mod buffer;
pub mod highlight;

pub use buffer::{Buffer, BufferEntry, BufferManager, InactiveBuffer};
pub use highlight::{
    BufferHighlightState, BufferId, HighlightState, LineHighlightState, Position, Range,
    RuleStack, Token, Viewport,
};
