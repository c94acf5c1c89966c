//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{ClientSettings, DocumentBackend, HttpDocumentBackend};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let backend = match HttpDocumentBackend::new(&settings) {
                Ok(backend) => Arc::new(backend),
                Err(err) => {
                    tracing::error!("failed to build http client: {err:#}");
                    let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                        "backend worker startup failure: {err:#}"
                    )));
                    return;
                }
            };
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Connected to {}",
                backend.server_url()
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                let backend = Arc::clone(&backend);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = run_command(backend.as_ref(), cmd).await;
                    if ui_tx.try_send(event).is_err() {
                        tracing::error!("ui event queue unavailable; dropping backend completion");
                    }
                });
            }
            tracing::debug!("ui command queue closed; backend worker exiting");
        });
    });
}

async fn run_command<B>(backend: &B, cmd: BackendCommand) -> UiEvent
where
    B: DocumentBackend + ?Sized,
{
    match cmd {
        BackendCommand::Ingest(ticket) => {
            let result = backend.ingest(&ticket.upload).await;
            UiEvent::UploadFinished { ticket, result }
        }
        BackendCommand::Query(ticket) => {
            let result = backend.query(&ticket.question).await;
            UiEvent::QueryFinished { ticket, result }
        }
    }
}
