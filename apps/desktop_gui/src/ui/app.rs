use std::{path::PathBuf, time::Duration};

use client_core::{
    display::{FileInfo, FileReadiness, StatusBanner},
    markup::Span,
    transcript::{RenderedEntry, TranscriptRow, TYPING_PLACEHOLDER},
    DocChatController, PickedFile, SelectionSource,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::text::LayoutJob;
use shared::domain::{EntryRole, StatusKind};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};

pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    pub startup_error: Option<String>,
}

pub struct DocChatApp {
    controller: DocChatController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    worker_status: String,
    worker_error: Option<String>,
}

impl DocChatApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            controller: DocChatController::new(),
            cmd_tx,
            ui_rx,
            server_url: startup.server_url,
            worker_status: "Backend worker starting...".to_string(),
            worker_error: startup.startup_error,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.worker_status = message;
                }
                UiEvent::BackendUnavailable(message) => {
                    self.worker_status = "Backend unavailable".to_string();
                    self.worker_error = Some(message);
                }
                UiEvent::UploadFinished { ticket, result } => {
                    let outcome = self.controller.finish_upload(ticket, result);
                    tracing::debug!(?outcome, "upload completed");
                }
                UiEvent::QueryFinished { ticket, result } => {
                    let outcome = self.controller.finish_question(ticket, result);
                    tracing::debug!(?outcome, "query completed");
                }
            }
        }
    }

    /// Hands `cmd` to the worker; a command that cannot be queued finishes
    /// its ticket with the queueing error so the controls unlock again.
    fn dispatch(&mut self, cmd: BackendCommand) {
        if let Err((cmd, err)) = dispatch_backend_command(&self.cmd_tx, cmd) {
            match cmd {
                BackendCommand::Ingest(ticket) => {
                    self.controller.finish_upload(ticket, Err(err));
                }
                BackendCommand::Query(ticket) => {
                    self.controller.finish_question(ticket, Err(err));
                }
            }
        }
    }

    fn start_upload(&mut self) {
        if let Some(ticket) = self.controller.begin_upload() {
            self.dispatch(BackendCommand::Ingest(ticket));
        }
    }

    fn send_question(&mut self) {
        if let Some(ticket) = self.controller.begin_question_from_input() {
            self.dispatch(BackendCommand::Query(ticket));
        }
    }

    fn choose_file(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Documents", DOCUMENT_EXTENSIONS);
        if let Some(dir) = default_document_dir() {
            dialog = dialog.set_directory(dir);
        }
        // A cancelled dialog is an empty selection and clears the file card.
        let files = dialog
            .pick_file()
            .map(PickedFile::from_path)
            .into_iter()
            .collect();
        self.controller.select_files(SelectionSource::Chooser, files);
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) =
            ctx.input(|i| (!i.raw.hovered_files.is_empty(), i.raw.dropped_files.clone()));
        if hovering != self.controller.selection().drop_hover() {
            self.controller.set_drop_hover(hovering);
        }
        if !dropped.is_empty() {
            let files = dropped.into_iter().filter_map(picked_from_drop).collect();
            self.controller.select_files(SelectionSource::Drop, files);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Document Chat");
                ui.separator();
                ui.label(egui::RichText::new(&self.server_url).monospace());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.worker_status);
                });
            });
            if let Some(message) = self.worker_error.clone() {
                let banner = StatusBanner {
                    kind: StatusKind::Error,
                    message,
                };
                if show_banner(ui, &banner) {
                    self.worker_error = None;
                }
            }
            ui.add_space(4.0);
        });
    }

    fn show_document_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("document_panel")
            .resizable(false)
            .exact_width(300.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("Document");
                ui.add_space(6.0);

                let hovering = self.controller.selection().drop_hover();
                let mut choose_clicked = false;
                egui::Frame::NONE
                    .fill(drop_zone_fill(hovering))
                    .stroke(egui::Stroke::new(
                        if hovering { 2.0 } else { 1.0 },
                        drop_zone_stroke(hovering),
                    ))
                    .corner_radius(12.0)
                    .inner_margin(egui::Margin::symmetric(12, 18))
                    .show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        ui.vertical_centered(|ui| {
                            ui.label(if hovering {
                                "Release to select this file"
                            } else {
                                "Drag a PDF or text file here"
                            });
                            ui.weak("or");
                            choose_clicked = ui.button("Choose file...").clicked();
                        });
                    });
                if choose_clicked {
                    self.choose_file();
                }

                if let Some(info) = self.controller.display().file_info.clone() {
                    ui.add_space(8.0);
                    show_file_card(ui, &info);
                }

                ui.add_space(8.0);
                let uploading = self.controller.upload_in_flight();
                ui.horizontal(|ui| {
                    let upload = egui::Button::new("Upload").min_size(egui::vec2(96.0, 28.0));
                    if ui.add_enabled(!uploading, upload).clicked() {
                        self.start_upload();
                    }
                    if uploading {
                        ui.spinner();
                    }
                });

                if let Some(banner) = self.controller.display().status.clone() {
                    ui.add_space(8.0);
                    if show_banner(ui, &banner) {
                        self.controller.dismiss_status();
                    }
                }
            });
    }

    fn show_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            let display = self.controller.display();
            let question_enabled = display.question_enabled;
            let send_enabled = display.send_enabled;
            let placeholder = display.question_placeholder;

            let mut submit = false;
            ui.horizontal(|ui| {
                let input_width = (ui.available_width() - 84.0).max(120.0);
                let edit = egui::TextEdit::singleline(self.controller.question_input_mut())
                    .hint_text(placeholder)
                    .desired_width(input_width);
                let response = ui.add_enabled(question_enabled, edit);
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                    response.request_focus();
                }
                let send = egui::Button::new("Send").min_size(egui::vec2(72.0, 24.0));
                if ui.add_enabled(send_enabled, send).clicked() {
                    submit = true;
                }
            });
            if submit {
                self.send_question();
            }
            ui.add_space(6.0);
        });
    }

    fn show_transcript(&mut self, ctx: &egui::Context) {
        let scroll_to_bottom = self.controller.take_scroll_request();
        egui::CentralPanel::default().show(ctx, |ui| {
            let palette = SpanPalette::from_ui(ui);
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let transcript = self.controller.transcript();
                    if transcript.is_empty() && !transcript.is_typing() {
                        ui.add_space(24.0);
                        ui.vertical_centered(|ui| {
                            ui.weak("Upload a document, then ask questions about it here.");
                        });
                    }
                    for row in transcript.rows() {
                        match row {
                            TranscriptRow::Entry(rendered) => show_entry(ui, rendered, &palette),
                            TranscriptRow::Typing => show_typing_row(ui),
                        }
                        ui.add_space(6.0);
                    }
                    if scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
        });
    }
}

impl eframe::App for DocChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_file_drops(ctx);

        self.show_header(ctx);
        self.show_document_panel(ctx);
        self.show_composer(ctx);
        self.show_transcript(ctx);

        if self.controller.upload_in_flight() || self.controller.query_in_flight() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn default_document_dir() -> Option<PathBuf> {
    dirs::document_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::home_dir)
}

/// Dropped files arrive as a path on native platforms and as bytes on the web.
fn picked_from_drop(file: egui::DroppedFile) -> Option<PickedFile> {
    if let Some(path) = file.path {
        return Some(PickedFile::from_path(path));
    }
    file.bytes.map(|bytes| PickedFile::from_bytes(file.name, bytes))
}

fn drop_zone_fill(hovering: bool) -> egui::Color32 {
    if hovering {
        egui::Color32::from_rgb(38, 58, 92)
    } else {
        egui::Color32::from_rgb(32, 34, 40)
    }
}

fn drop_zone_stroke(hovering: bool) -> egui::Color32 {
    if hovering {
        egui::Color32::from_rgb(110, 160, 240)
    } else {
        egui::Color32::from_rgb(78, 80, 90)
    }
}

fn banner_colors(kind: StatusKind) -> (egui::Color32, egui::Stroke) {
    match kind {
        StatusKind::Info => (
            egui::Color32::from_rgb(44, 62, 94),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(96, 130, 190)),
        ),
        StatusKind::Success => (
            egui::Color32::from_rgb(42, 84, 58),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(92, 164, 112)),
        ),
        StatusKind::Error => (
            egui::Color32::from_rgb(111, 53, 53),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
        ),
    }
}

/// Returns true when the banner's Dismiss button was clicked.
fn show_banner(ui: &mut egui::Ui, banner: &StatusBanner) -> bool {
    let (fill, stroke) = banner_colors(banner.kind);
    let mut dismissed = false;
    egui::Frame::NONE
        .fill(fill)
        .stroke(stroke)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    dismissed = ui.button("Dismiss").clicked();
                });
            });
        });
    dismissed
}

fn readiness_color(readiness: FileReadiness) -> egui::Color32 {
    match readiness {
        FileReadiness::ReadyToUpload => egui::Color32::from_rgb(170, 172, 180),
        FileReadiness::Processing => egui::Color32::from_rgb(230, 190, 90),
        FileReadiness::Processed => egui::Color32::from_rgb(120, 200, 140),
    }
}

fn show_file_card(ui: &mut egui::Ui, info: &FileInfo) {
    egui::Frame::NONE
        .fill(egui::Color32::from_rgb(40, 42, 50))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new(&info.file_name).strong());
            ui.label(egui::RichText::new(&info.detail).color(readiness_color(info.readiness)));
        });
}

fn entry_fill(role: EntryRole) -> egui::Color32 {
    match role {
        EntryRole::User => egui::Color32::from_rgb(46, 64, 104),
        EntryRole::Bot => egui::Color32::from_rgb(44, 46, 54),
        EntryRole::System => egui::Color32::from_rgb(58, 52, 40),
    }
}

fn show_entry(ui: &mut egui::Ui, rendered: &RenderedEntry, palette: &SpanPalette) {
    let entry = &rendered.entry;
    let align = if entry.role == EntryRole::User {
        egui::Align::Max
    } else {
        egui::Align::Min
    };
    ui.with_layout(egui::Layout::top_down(align), |ui| {
        egui::Frame::NONE
            .fill(entry_fill(entry.role))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 6))
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width() * 0.85);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(entry.role.label()).strong());
                    ui.weak(
                        entry
                            .sent_at
                            .with_timezone(&chrono::Local)
                            .format("%H:%M")
                            .to_string(),
                    );
                });
                let mut job = layout_spans(&rendered.body.spans, palette);
                job.wrap.max_width = ui.available_width();
                ui.label(job);
            });
    });
}

fn show_typing_row(ui: &mut egui::Ui) {
    egui::Frame::NONE
        .fill(entry_fill(EntryRole::Bot))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new(TYPING_PLACEHOLDER).italics().weak());
            });
        });
}

/// Fonts and colors used to turn styled spans into a text layout.
struct SpanPalette {
    body: egui::FontId,
    monospace: egui::FontId,
    text: egui::Color32,
    strong: egui::Color32,
    code_bg: egui::Color32,
}

impl SpanPalette {
    fn from_ui(ui: &egui::Ui) -> Self {
        let style = ui.style();
        Self {
            body: egui::TextStyle::Body.resolve(style),
            monospace: egui::TextStyle::Monospace.resolve(style),
            text: ui.visuals().text_color(),
            strong: ui.visuals().strong_text_color(),
            code_bg: ui.visuals().code_bg_color,
        }
    }
}

fn layout_spans(spans: &[Span], palette: &SpanPalette) -> LayoutJob {
    let mut job = LayoutJob::default();
    for span in spans {
        let code = span.style.code || span.style.code_block;
        let format = egui::TextFormat {
            font_id: if code {
                palette.monospace.clone()
            } else {
                palette.body.clone()
            },
            color: if span.style.bold {
                palette.strong
            } else {
                palette.text
            },
            background: if code {
                palette.code_bg
            } else {
                egui::Color32::TRANSPARENT
            },
            italics: span.style.italic,
            ..Default::default()
        };
        job.append(&span.text, 0.0, format);
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    use client_core::{markup::render_bot_text, FileContent};

    fn palette() -> SpanPalette {
        SpanPalette {
            body: egui::FontId::proportional(14.0),
            monospace: egui::FontId::monospace(13.0),
            text: egui::Color32::GRAY,
            strong: egui::Color32::WHITE,
            code_bg: egui::Color32::DARK_GRAY,
        }
    }

    #[test]
    fn styled_answer_becomes_one_section_per_span() {
        let rendered = render_bot_text("**Total:** 42 via `sum()`");
        let job = layout_spans(&rendered.spans, &palette());

        assert_eq!(job.text, "Total: 42 via sum()");
        assert_eq!(job.sections.len(), rendered.spans.len());
        let bold = &job.sections[0];
        assert_eq!(&job.text[bold.byte_range.clone()], "Total:");
        assert_eq!(bold.format.color, egui::Color32::WHITE);
        let code = job.sections.last().expect("code section");
        assert_eq!(&job.text[code.byte_range.clone()], "sum()");
        assert_eq!(code.format.font_id, egui::FontId::monospace(13.0));
        assert_eq!(code.format.background, egui::Color32::DARK_GRAY);
    }

    #[test]
    fn italic_span_sets_italics_only() {
        let rendered = render_bot_text("*maybe*");
        let job = layout_spans(&rendered.spans, &palette());

        assert_eq!(job.sections.len(), 1);
        let format = &job.sections[0].format;
        assert!(format.italics);
        assert_eq!(format.color, egui::Color32::GRAY);
        assert_eq!(format.font_id, egui::FontId::proportional(14.0));
    }

    #[test]
    fn dropped_path_is_preferred_over_bytes() {
        let file = egui::DroppedFile {
            path: Some(PathBuf::from("/tmp/report.pdf")),
            name: "ignored.pdf".into(),
            bytes: Some(b"bytes".to_vec().into()),
            ..Default::default()
        };

        let picked = picked_from_drop(file).expect("picked");
        assert_eq!(picked.name, "report.pdf");
        assert_eq!(
            picked.content,
            FileContent::Path(PathBuf::from("/tmp/report.pdf"))
        );
    }

    #[test]
    fn dropped_bytes_keep_the_reported_name() {
        let file = egui::DroppedFile {
            name: "notes.txt".into(),
            bytes: Some(b"alpha".to_vec().into()),
            ..Default::default()
        };

        let picked = picked_from_drop(file).expect("picked");
        assert_eq!(picked.name, "notes.txt");
        assert_eq!(picked.content, FileContent::Bytes(b"alpha".to_vec().into()));
    }

    #[test]
    fn drop_without_content_is_skipped() {
        assert!(picked_from_drop(egui::DroppedFile::default()).is_none());
    }

    #[test]
    fn banner_palette_distinguishes_severities() {
        let info = banner_colors(StatusKind::Info).0;
        let success = banner_colors(StatusKind::Success).0;
        let error = banner_colors(StatusKind::Error).0;
        assert_ne!(info, success);
        assert_ne!(success, error);
        assert_ne!(info, error);
    }
}
