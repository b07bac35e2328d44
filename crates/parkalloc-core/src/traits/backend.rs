//! Whole-document storage backend.

use std::fmt;

use crate::error::Result;

/// The three persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Members,
    Requests,
    History,
}

impl Entity {
    /// Document key, also used as the JSON file stem.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Requests => "requests",
            Self::History => "history",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw document persistence. Every write replaces the whole document.
pub trait DocumentBackend: Send {
    fn name(&self) -> &str;

    /// Raw bytes of the current body, or `None` if the document was never
    /// written. Decoding is left to the caller.
    fn read(&self, entity: Entity) -> Result<Option<Vec<u8>>>;

    fn write(&self, entity: Entity, body: &str) -> Result<()>;

    /// Write several documents so that either all or none become visible.
    fn write_all(&self, docs: &[(Entity, String)]) -> Result<()>;
}
