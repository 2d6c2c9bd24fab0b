//! Fixed diagnostics reported by repositories and units of work.

/// A read failed.
pub const RETRIEVE_FAILED: &str = "Error retrieving data.";
/// Nothing matched the predicate.
pub const NOT_FOUND: &str = "Item not found.";
/// Staging an insert failed.
pub const ADD_FAILED: &str = "Error adding data.";
/// Staging a replace failed.
pub const UPDATE_FAILED: &str = "Error updating data.";
/// Staging a delete failed.
pub const DELETE_FAILED: &str = "Error deleting data.";
/// The commit transaction failed.
pub const SAVE_FAILED: &str = "Error saving changes.";
/// The session was used after disposal.
pub const SESSION_CLOSED: &str = "The storage session has been closed.";
/// No connection could be acquired for a new session.
pub const SESSION_OPEN_FAILED: &str = "Error opening storage session.";
