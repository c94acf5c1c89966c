//! Backend-to-UI events.

use client_core::{QueryTicket, UploadTicket};
use shared::{
    error::TransportError,
    protocol::{IngestResponse, QueryResponse},
};

pub enum UiEvent {
    Info(String),
    /// The worker could not start; nothing queued afterwards will be served.
    BackendUnavailable(String),
    UploadFinished {
        ticket: UploadTicket,
        result: Result<IngestResponse, TransportError>,
    },
    QueryFinished {
        ticket: QueryTicket,
        result: Result<QueryResponse, TransportError>,
    },
}
