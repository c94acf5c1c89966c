use client_core::{QueryTicket, UploadTicket};

/// Work the UI hands to the backend worker. Each command carries the ticket
/// issued by the controller so the completion can be matched back to it.
#[derive(Debug)]
pub enum BackendCommand {
    Ingest(UploadTicket),
    Query(QueryTicket),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Ingest(_) => "ingest",
            BackendCommand::Query(_) => "query",
        }
    }
}
