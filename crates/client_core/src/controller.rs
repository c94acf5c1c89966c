//! The interaction controller: owns the session, the pending selection, the
//! transcript and the display state, and sequences the upload and question
//! workflows around the backend calls.
//!
//! Each workflow is split in two. `begin_*` applies every effect that must be
//! visible before the request leaves (status text, typing marker, in-flight
//! gates) and hands back a ticket; `finish_*` takes that ticket together with
//! the backend result. Event loops that cannot block on the network (the GUI)
//! dispatch the ticket elsewhere and call `finish_*` when the completion
//! arrives; `submit_upload`/`submit_question` chain both halves for callers
//! that can await.

use shared::{
    domain::{StatusKind, TranscriptEntry},
    error::{ControllerError, TransportError},
    protocol::{IngestResponse, QueryResponse},
};
use tracing::{debug, info, warn};

use crate::{
    display::{DisplayState, FileReadiness, PROCESSING, READY_TO_UPLOAD},
    selection::{FileContent, PickedFile, SelectionChange, SelectionSource, SelectionTracker},
    transcript::Transcript,
    DocumentBackend,
};

pub const UPLOADING_STATUS: &str = "Uploading and processing document...";
pub const UNKNOWN_UPLOAD_ERROR: &str = "Unknown error occurred.";
pub const UPLOAD_DONE_FALLBACK: &str = "Document processed.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub document_ready: bool,
    pub current_file_name: String,
}

/// A document on its way to the ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content: FileContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub request_id: u64,
    pub upload: DocumentUpload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub request_id: u64,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Ready { file_name: String, chunks_count: u64 },
    Failed(ControllerError),
    /// The completion did not belong to the outstanding upload.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOutcome {
    Answered(String),
    Failed(ControllerError),
    Stale,
}

#[derive(Debug, Default)]
pub struct DocChatController {
    session: Session,
    selection: SelectionTracker,
    transcript: Transcript,
    display: DisplayState,
    question_input: String,
    upload_in_flight: Option<u64>,
    query_in_flight: Option<u64>,
    next_request_id: u64,
}

impl DocChatController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// True once after every transcript change; front-ends scroll to the newest row.
    pub fn take_scroll_request(&mut self) -> bool {
        self.transcript.take_scroll_request()
    }

    pub fn dismiss_status(&mut self) {
        self.display.dismiss_status();
    }

    pub fn question_input(&self) -> &str {
        &self.question_input
    }

    pub fn question_input_mut(&mut self) -> &mut String {
        &mut self.question_input
    }

    pub fn set_question_input(&mut self, text: impl Into<String>) {
        self.question_input = text.into();
    }

    pub fn upload_in_flight(&self) -> bool {
        self.upload_in_flight.is_some()
    }

    pub fn query_in_flight(&self) -> bool {
        self.query_in_flight.is_some()
    }

    fn allocate_request_id(&mut self) -> u64 {
        self.next_request_id += 1;
        self.next_request_id
    }

    pub fn select_files(&mut self, source: SelectionSource, files: Vec<PickedFile>) {
        match self.selection.observe(source, files) {
            SelectionChange::Selected { file_name } => {
                self.session.current_file_name = file_name.clone();
                self.display
                    .show_file(&file_name, READY_TO_UPLOAD, FileReadiness::ReadyToUpload);
            }
            SelectionChange::Cleared => self.display.clear_file(),
        }
    }

    pub fn set_drop_hover(&mut self, hovering: bool) {
        self.selection.set_drop_hover(hovering);
    }

    /// Starts an upload of the pending selection. Returns `None` when nothing
    /// should be sent: no file is selected (reported on the status banner) or
    /// an upload is already outstanding.
    pub fn begin_upload(&mut self) -> Option<UploadTicket> {
        if let Some(request_id) = self.upload_in_flight {
            debug!(request_id, "upload already in flight; ignoring submission");
            return None;
        }
        let pending = self.selection.pending().map(|pending| DocumentUpload {
            file_name: pending.name.clone(),
            content: pending.content.clone(),
        });
        let Some(upload) = pending else {
            self.report_upload_error(&ControllerError::NoFileSelected);
            return None;
        };

        let request_id = self.allocate_request_id();
        self.session.current_file_name = upload.file_name.clone();
        self.display
            .show_file(&upload.file_name, PROCESSING, FileReadiness::Processing);
        self.display.set_status(StatusKind::Info, UPLOADING_STATUS);
        self.upload_in_flight = Some(request_id);
        info!(request_id, file_name = %upload.file_name, "uploading document");

        Some(UploadTicket { request_id, upload })
    }

    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<IngestResponse, TransportError>,
    ) -> UploadOutcome {
        if self.upload_in_flight != Some(ticket.request_id) {
            warn!(
                request_id = ticket.request_id,
                "ignoring completion for an upload that is not outstanding"
            );
            return UploadOutcome::Stale;
        }
        self.upload_in_flight = None;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                // The file card keeps its processing text; only the banner reports the failure.
                if let Some(body) = err.body() {
                    warn!(request_id = ticket.request_id, body, "ingestion request failed");
                }
                let err = ControllerError::Transport(err);
                self.report_upload_error(&err);
                return UploadOutcome::Failed(err);
            }
        };

        if !response.success {
            let message = response
                .error
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| UNKNOWN_UPLOAD_ERROR.to_string());
            let err = ControllerError::BackendRejected(message);
            self.report_upload_error(&err);
            return UploadOutcome::Failed(err);
        }

        let file_name = ticket.upload.file_name;
        let chunks_count = response.chunks_count.unwrap_or_default();
        self.session.document_ready = true;
        self.session.current_file_name = file_name.clone();

        self.display.set_status(
            StatusKind::Success,
            response
                .message
                .unwrap_or_else(|| UPLOAD_DONE_FALLBACK.to_string()),
        );
        self.display.unlock_questions();
        self.display.send_enabled = self.query_in_flight.is_none();
        self.display.show_file(
            &file_name,
            format!("{chunks_count} chunks created"),
            FileReadiness::Processed,
        );
        self.transcript.append(TranscriptEntry::system(format!(
            "Document \"{file_name}\" uploaded successfully. You can now ask questions."
        )));
        info!(request_id = ticket.request_id, %file_name, chunks_count, "document ready");

        UploadOutcome::Ready {
            file_name,
            chunks_count,
        }
    }

    fn report_upload_error(&mut self, err: &ControllerError) {
        warn!(kind = ?err.kind(), error = %err, "upload failed");
        let message = match err {
            ControllerError::Transport(transport) => {
                format!("Error uploading file: {transport}")
            }
            other => other.to_string(),
        };
        self.display.set_status(StatusKind::Error, message);
    }

    /// Starts a query for `text`. Silently returns `None` for blank questions,
    /// before any document is ready, and while another query is outstanding.
    pub fn begin_question(&mut self, text: &str) -> Option<QueryTicket> {
        let question = text.trim();
        if question.is_empty() || !self.session.document_ready {
            return None;
        }
        if let Some(request_id) = self.query_in_flight {
            debug!(request_id, "query already in flight; ignoring submission");
            return None;
        }

        let request_id = self.allocate_request_id();
        self.transcript.append(TranscriptEntry::user(question));
        self.question_input.clear();
        self.transcript.show_typing(request_id);
        self.query_in_flight = Some(request_id);
        self.display.send_enabled = false;
        debug!(request_id, "question dispatched");

        Some(QueryTicket {
            request_id,
            question: question.to_string(),
        })
    }

    /// Submits whatever is currently in the question input.
    pub fn begin_question_from_input(&mut self) -> Option<QueryTicket> {
        let text = self.question_input.clone();
        self.begin_question(&text)
    }

    pub fn finish_question(
        &mut self,
        ticket: QueryTicket,
        result: Result<QueryResponse, TransportError>,
    ) -> QuestionOutcome {
        if self.query_in_flight != Some(ticket.request_id) {
            warn!(
                request_id = ticket.request_id,
                "ignoring completion for a query that is not outstanding"
            );
            return QuestionOutcome::Stale;
        }
        self.transcript.clear_typing(ticket.request_id);

        let outcome = match result {
            Ok(response) => match response.usable_answer() {
                Some(answer) => {
                    self.transcript.append(TranscriptEntry::bot(answer));
                    QuestionOutcome::Answered(answer.to_string())
                }
                None => self.report_query_error(ticket.request_id, ControllerError::EmptyAnswer),
            },
            Err(err) => {
                if let Some(body) = err.body() {
                    warn!(request_id = ticket.request_id, body, "query request failed");
                }
                self.report_query_error(ticket.request_id, ControllerError::Transport(err))
            }
        };

        self.query_in_flight = None;
        self.display.send_enabled = true;
        outcome
    }

    fn report_query_error(&mut self, request_id: u64, err: ControllerError) -> QuestionOutcome {
        warn!(request_id, kind = ?err.kind(), error = %err, "question failed");
        self.transcript.append(TranscriptEntry::system(format!(
            "Error: {err}. Please check the logs for details."
        )));
        QuestionOutcome::Failed(err)
    }

    pub async fn submit_upload<B>(&mut self, backend: &B) -> Option<UploadOutcome>
    where
        B: DocumentBackend + ?Sized,
    {
        let ticket = self.begin_upload()?;
        let result = backend.ingest(&ticket.upload).await;
        Some(self.finish_upload(ticket, result))
    }

    pub async fn submit_question<B>(&mut self, backend: &B, text: &str) -> Option<QuestionOutcome>
    where
        B: DocumentBackend + ?Sized,
    {
        let ticket = self.begin_question(text)?;
        let result = backend.query(&ticket.question).await;
        Some(self.finish_question(ticket, result))
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
