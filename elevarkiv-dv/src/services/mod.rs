//! Collaborator clients
//!
//! HTTP clients for the upstream roster source and the document archive,
//! plus deterministic mock implementations selected by configuration so
//! the service runs end-to-end without collaborators.

pub mod archive_client;
pub mod mock;
pub mod roster_client;

pub use archive_client::{
    ArchiveClient, ArchiveDocument, ArchiveError, ArchiveFile, DocumentFile, DocumentList,
    MAIN_ARCHIVE_SOURCE_ID,
};
pub use roster_client::RosterSource;
