//! Update functions
//!
//! All highlight store transformations flow through here. Reducers are
//! total: they never fail, and malformed or stale input falls through to
//! the unchanged state.

mod highlight;

pub use highlight::update_highlight;
