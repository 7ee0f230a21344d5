use crate::generator::profile::build_detections;
use crate::workflow::config::WorkflowConfig;
use crate::workflow::script::{ScriptStep, SessionScript};
use anyhow::{bail, Context};
use tubecore::detection::{DetectionError, DetectionReply, DetectionTicket};
use tubecore::geometry::{ImageDimensions, Marker, PixelPoint, ReferenceFrame};
use tubecore::telemetry::MetricsSnapshot;
use tubecore::{Completion, OverlaySession, SessionPhase};

pub struct WorkflowResult {
    pub markers: Vec<Marker>,
    pub labels: Vec<usize>,
    pub color_bands: Vec<usize>,
    pub phase: SessionPhase,
    pub notice: Option<String>,
    pub completions: Vec<Completion>,
    pub metrics: MetricsSnapshot,
    pub history: Vec<String>,
}

impl WorkflowResult {
    pub fn count(&self) -> usize {
        self.markers.len()
    }
}

/// Replays session scripts against a fresh [`OverlaySession`].
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, script: &SessionScript) -> anyhow::Result<WorkflowResult> {
        let mut session = OverlaySession::new(self.config.session.clone());
        let mut tickets: Vec<DetectionTicket> = Vec::new();
        let mut completions = Vec::new();

        for (step_index, step) in script.steps.iter().enumerate() {
            self.apply_step(&mut session, &mut tickets, &mut completions, step)
                .with_context(|| format!("executing script step {}", step_index + 1))?;
        }

        let glyphs = session.glyphs();
        Ok(WorkflowResult {
            markers: session.markers().to_vec(),
            labels: glyphs.iter().map(|g| g.label).collect(),
            color_bands: glyphs.iter().map(|g| g.color_band).collect(),
            phase: session.phase(),
            notice: session.notice().map(ToString::to_string),
            completions,
            metrics: session.metrics().snapshot(),
            history: session.events().history().map(str::to_string).collect(),
        })
    }

    fn apply_step(
        &self,
        session: &mut OverlaySession,
        tickets: &mut Vec<DetectionTicket>,
        completions: &mut Vec<Completion>,
        step: &ScriptStep,
    ) -> anyhow::Result<()> {
        match step {
            ScriptStep::Select => tickets.push(session.select_image()),
            ScriptStep::Ready { width, height } => {
                let image = session.image().context("ready signal without an image")?;
                if let Some(completion) = session
                    .image_ready(image, ImageDimensions::new(*width, *height))
                    .context("applying ready signal")?
                {
                    completions.push(completion);
                }
            }
            ScriptStep::Respond {
                request,
                points,
                frame,
            } => {
                let ticket = pick_ticket(tickets, *request)?;
                let reply = DetectionReply {
                    points: points.clone(),
                    frame: *frame,
                };
                completions.push(session.complete_detection(ticket.token, Ok(reply)));
            }
            ScriptStep::Generate {
                request,
                width,
                height,
            } => {
                let ticket = pick_ticket(tickets, *request)?;
                let dims = ImageDimensions::new(*width, *height);
                let points = build_detections(
                    &self.config.generator,
                    dims,
                    ticket.sensitivity,
                    self.config.generator.seed,
                );
                completions.push(
                    session.complete_detection(ticket.token, Ok(DetectionReply::in_frame(points, dims))),
                );
            }
            ScriptStep::Fail {
                request,
                malformed,
                message,
            } => {
                let ticket = pick_ticket(tickets, *request)?;
                let err = if *malformed {
                    DetectionError::Malformed(message.clone())
                } else {
                    DetectionError::Transport(message.clone())
                };
                completions.push(session.complete_detection(ticket.token, Err(err)));
            }
            ScriptStep::Drag { sensitivity } => session.set_sensitivity(*sensitivity),
            ScriptStep::Commit { sensitivity } => {
                if let Some(value) = sensitivity {
                    session.set_sensitivity(*value);
                }
                if let Some(ticket) = session.commit_sensitivity() {
                    tickets.push(ticket);
                }
            }
            ScriptStep::Tap {
                x,
                y,
                width,
                height,
            } => {
                let rendered = ReferenceFrame::new(*width, *height)
                    .context("tap against an invalid rendered box")?;
                session.tap(PixelPoint::new(*x, *y), rendered);
            }
            ScriptStep::MarkerSize { size } => session.set_marker_size(*size),
            ScriptStep::Undo => {
                session.undo_last();
            }
            ScriptStep::ClearMarkers => session.clear_markers(),
            ScriptStep::Clear => session.clear(),
        }
        Ok(())
    }
}

fn pick_ticket(tickets: &[DetectionTicket], request: Option<usize>) -> anyhow::Result<DetectionTicket> {
    let ticket = match request {
        Some(position) => position.checked_sub(1).and_then(|idx| tickets.get(idx)),
        None => tickets.last(),
    };
    match ticket {
        Some(ticket) => Ok(*ticket),
        None => bail!("no detection request {:?} has been issued", request),
    }
}
