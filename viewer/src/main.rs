use iced::{
    widget::{
        button, column, image as iced_image, row, scrollable, slider, stack, text, Canvas,
        Column, Container,
    },
    Alignment, Element, Length, Task, Theme,
};
use overlay::{fit_to_view, MarkerOverlay, TapEvent};
use std::sync::Arc;
use tubecore::detection::{DetectionError, DetectionReply, DetectionTicket, ImageId, RequestToken};
use tubecore::geometry::{ImageDimensions, PixelPoint, ReferenceFrame};
use tubecore::prelude::{MARKER_SIZE_RANGE, SENSITIVITY_RANGE};
use tubecore::{Completion, OverlaySession, TapOutcome};
use upload::{prepare_upload, probe_dimensions, UploadLimits};

mod client;
mod config;
mod overlay;
mod upload;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Viewer::boot, Viewer::update, Viewer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Viewer) -> String {
    "Insulation Tubes Count".into()
}

fn application_theme(_: &Viewer) -> Theme {
    Theme::Light
}

struct Viewer {
    config: config::ViewerConfig,
    client: reqwest::Client,
    session: OverlaySession,
    source: Option<Arc<Vec<u8>>>,
    preview: Option<Preview>,
    file_name: Option<String>,
    status: String,
}

#[derive(Debug, Clone)]
struct PickedFile {
    name: String,
    bytes: Arc<Vec<u8>>,
}

#[derive(Debug, Clone)]
struct Preview {
    handle: iced_image::Handle,
    dims: ImageDimensions,
}

#[derive(Debug, Clone)]
enum Message {
    PickImage,
    ImagePicked(Option<PickedFile>),
    PreviewDecoded(ImageId, Result<Preview, String>),
    DetectionFinished(RequestToken, Result<DetectionReply, DetectionError>),
    SensitivityChanged(u8),
    SensitivityReleased,
    MarkerSizeChanged(u8),
    Tapped(TapEvent),
    UndoLast,
    ClearMarkers,
    ClearSession,
    DismissNotice,
}

impl Viewer {
    fn boot() -> (Self, Task<Message>) {
        let config = config::ViewerConfig::from_env();
        log::info!("detection endpoint: {}", config.endpoint);
        (
            Viewer {
                session: OverlaySession::new(config.session.clone()),
                config,
                client: reqwest::Client::new(),
                source: None,
                preview: None,
                file_name: None,
                status: "Upload a photo of the tube bundle".into(),
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => Task::perform(pick_file(), Message::ImagePicked),
            Message::ImagePicked(None) => Task::none(),
            Message::ImagePicked(Some(file)) => {
                let ticket = state.session.select_image();
                state.source = Some(file.bytes.clone());
                state.preview = None;
                state.status = format!("Analyzing {}...", file.name);
                state.file_name = Some(file.name);

                let id = ticket.image;
                Task::batch([
                    Task::perform(decode_preview(file.bytes), move |preview| {
                        Message::PreviewDecoded(id, preview)
                    }),
                    state.detection_task(ticket),
                ])
            }
            Message::PreviewDecoded(id, Ok(preview)) => {
                if state.session.image() != Some(id) {
                    return Task::none();
                }
                let dims = preview.dims;
                state.preview = Some(preview);
                match state.session.image_ready(id, dims) {
                    Ok(Some(completion)) => state.report(completion),
                    Ok(None) => {}
                    Err(err) => state.status = format!("Could not use image: {err}"),
                }
                Task::none()
            }
            Message::PreviewDecoded(id, Err(err)) => {
                if state.session.image() == Some(id) {
                    log::warn!("preview decode failed: {err}");
                    state.session.clear();
                    state.source = None;
                    state.preview = None;
                    state.status = format!("Could not open image: {err}");
                }
                Task::none()
            }
            Message::DetectionFinished(token, outcome) => {
                let completion = state.session.complete_detection(token, outcome);
                state.report(completion);
                Task::none()
            }
            Message::SensitivityChanged(value) => {
                state.session.set_sensitivity(value);
                Task::none()
            }
            Message::SensitivityReleased => match state.session.commit_sensitivity() {
                Some(ticket) => {
                    state.status = format!("Re-analyzing at {}%...", ticket.sensitivity);
                    state.detection_task(ticket)
                }
                None => Task::none(),
            },
            Message::MarkerSizeChanged(value) => {
                state.session.set_marker_size(value);
                Task::none()
            }
            Message::Tapped(tap) => {
                let Ok(rendered) = ReferenceFrame::new(tap.width as f64, tap.height as f64)
                else {
                    return Task::none();
                };
                match state
                    .session
                    .tap(PixelPoint::new(tap.x as f64, tap.y as f64), rendered)
                {
                    TapOutcome::Added(index) => state.status = format!("Added #{}", index + 1),
                    TapOutcome::Removed(index) => {
                        state.status = format!("Removed #{}", index + 1)
                    }
                    TapOutcome::Ignored => {}
                }
                Task::none()
            }
            Message::UndoLast => {
                if state.session.undo_last().is_some() {
                    state.status = "Removed last dot".into();
                }
                Task::none()
            }
            Message::ClearMarkers => {
                state.session.clear_markers();
                state.status = "All dots cleared".into();
                Task::none()
            }
            Message::ClearSession => {
                state.session.clear();
                state.source = None;
                state.preview = None;
                state.file_name = None;
                state.status = "Upload a photo of the tube bundle".into();
                Task::none()
            }
            Message::DismissNotice => {
                state.session.dismiss_notice();
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let session = &state.session;

        let controls = column![
            text("Insulation Tubes Count").size(26),
            button("Upload Photo").on_press(Message::PickImage).padding(10),
            text(format!("Sensitivity: {}%", session.sensitivity())).size(14),
            slider(
                SENSITIVITY_RANGE,
                session.sensitivity(),
                Message::SensitivityChanged
            )
            .on_release(Message::SensitivityReleased),
            text(format!("Circle Size: {}px", session.marker_size())).size(14),
            slider(
                MARKER_SIZE_RANGE,
                session.marker_size(),
                Message::MarkerSizeChanged
            ),
            text(&state.status).size(14),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(300.0));

        let mut workspace = Column::new().spacing(10).padding(16).width(Length::Fill);

        if let Some(notice) = session.notice() {
            workspace = workspace.push(
                row![
                    text(notice.to_string()).size(14),
                    button("Dismiss").on_press(Message::DismissNotice),
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            );
        }

        if session.phase().is_detecting() {
            workspace = workspace.push(text("Analyzing image...").size(16));
        }

        match &state.preview {
            Some(preview) => {
                let size = fit_to_view(preview.dims.width, preview.dims.height);
                let photo = iced_image(preview.handle.clone())
                    .width(Length::Fixed(size.width))
                    .height(Length::Fixed(size.height));
                let overlay = Canvas::new(MarkerOverlay::new(session.glyphs()))
                    .width(Length::Fixed(size.width))
                    .height(Length::Fixed(size.height));

                workspace = workspace
                    .push(text(format!("Total: {}", session.count())).size(22))
                    .push(text("Tap image to add or remove dots").size(12))
                    .push(stack![photo, overlay])
                    .push(
                        row![
                            button("Undo Last").on_press(Message::UndoLast),
                            button("Clear All").on_press(Message::ClearMarkers),
                            button("New Session").on_press(Message::ClearSession),
                        ]
                        .spacing(10),
                    );
                if let Some(name) = &state.file_name {
                    workspace = workspace.push(
                        text(format!(
                            "{name}: {}x{}",
                            preview.dims.width, preview.dims.height
                        ))
                        .size(12),
                    );
                }
            }
            None if session.image().is_some() => {
                workspace = workspace.push(text("Loading image...").size(16));
            }
            None => {
                workspace = workspace.push(text("No image selected").size(16));
            }
        }

        let history = session.events().history().rev().fold(
            Column::new().spacing(4),
            |col, entry| col.push(text(entry.to_string()).size(12)),
        );
        workspace = workspace
            .push(text("Activity log").size(16))
            .push(Container::new(scrollable(history).height(Length::Fixed(120.0))).padding(6));

        let layout = row![controls, workspace]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn detection_task(&self, ticket: DetectionTicket) -> Task<Message> {
        let Some(source) = self.source.clone() else {
            return Task::none();
        };
        let token = ticket.token;
        Task::perform(
            run_detection(
                self.client.clone(),
                self.config.endpoint.clone(),
                source,
                self.config.limits,
                ticket,
            ),
            move |outcome| Message::DetectionFinished(token, outcome),
        )
    }

    fn report(&mut self, completion: Completion) {
        match completion {
            Completion::Applied { count } => self.status = format!("Detected {count} tubes"),
            Completion::Deferred => self.status = "Waiting for image to load...".into(),
            Completion::Discarded => {}
            Completion::Failed(err) => self.status = format!("Detection failed: {err}"),
        }
    }
}

async fn pick_file() -> Option<PickedFile> {
    let handle = rfd::AsyncFileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
        .pick_file()
        .await?;
    let bytes = handle.read().await;
    Some(PickedFile {
        name: handle.file_name(),
        bytes: Arc::new(bytes),
    })
}

async fn decode_preview(bytes: Arc<Vec<u8>>) -> Result<Preview, String> {
    let probe = bytes.clone();
    let dims = tokio::task::spawn_blocking(move || probe_dimensions(&probe))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| format!("{e:#}"))?;
    Ok(Preview {
        handle: iced_image::Handle::from_bytes(bytes.to_vec()),
        dims,
    })
}

async fn run_detection(
    client: reqwest::Client,
    endpoint: String,
    source: Arc<Vec<u8>>,
    limits: UploadLimits,
    ticket: DetectionTicket,
) -> Result<DetectionReply, DetectionError> {
    let upload = tokio::task::spawn_blocking(move || prepare_upload(&source, limits))
        .await
        .map_err(|e| DetectionError::Transport(e.to_string()))?
        .map_err(|e| DetectionError::Transport(format!("preparing upload: {e:#}")))?;
    log::debug!(
        "uploading {} bytes ({}x{}) for request {}",
        upload.bytes.len(),
        upload.dims.width,
        upload.dims.height,
        ticket.token
    );
    client::detect(client, endpoint, upload, ticket).await
}
