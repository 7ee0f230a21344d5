//! Detection reconciliation: the single writer of a session's marker set.
//!
//! The session never performs I/O. Operations that need a detection call hand
//! out a [`DetectionTicket`]; the caller runs the request and passes the
//! outcome back through [`OverlaySession::complete_detection`].

use crate::detection::{DetectionError, DetectionReply, DetectionTicket, ImageId, RequestToken};
use crate::geometry::{
    normalize_detection, normalize_pointer, ImageDimensions, Marker, PixelPoint, ReferenceFrame,
};
use crate::markers::{glyphs, tap_tolerance, MarkerGlyph, MarkerStore};
use crate::prelude::{
    clamp_marker_size, clamp_sensitivity, OverlayError, OverlayResult, SessionConfig,
};
use crate::session::phase::SessionPhase;
use crate::telemetry::{DetectionMetrics, EventLog};

/// What happened to a detection outcome handed back to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Markers were replaced with `count` normalized points.
    Applied { count: usize },
    /// The reply is held until the image reports its natural size.
    Deferred,
    /// A newer request was issued (or the image changed); nothing changed.
    Discarded,
    /// The request failed; markers were left untouched.
    Failed(OverlayError),
}

/// Result of a tap on the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Added(usize),
    Removed(usize),
    /// No image is displayed, or the tap fell outside it.
    Ignored,
}

#[derive(Debug)]
struct ImageSlot {
    id: ImageId,
    natural: Option<ImageDimensions>,
    parked: Option<(RequestToken, DetectionReply)>,
}

/// Aggregate of everything an overlay view displays.
#[derive(Debug)]
pub struct OverlaySession {
    config: SessionConfig,
    sensitivity: u8,
    marker_size: u8,
    image: Option<ImageSlot>,
    store: MarkerStore,
    phase: SessionPhase,
    last_token: u64,
    last_image: u64,
    notice: Option<OverlayError>,
    events: EventLog,
    metrics: DetectionMetrics,
}

impl OverlaySession {
    pub fn new(config: SessionConfig) -> Self {
        let config = config.normalized();
        Self {
            sensitivity: config.default_sensitivity,
            marker_size: config.default_marker_size,
            config,
            image: None,
            store: MarkerStore::new(),
            phase: SessionPhase::Idle,
            last_token: 0,
            last_image: 0,
            notice: None,
            events: EventLog::new(),
            metrics: DetectionMetrics::new(),
        }
    }

    /// Starts a new image: markers are cleared and a detection is issued.
    pub fn select_image(&mut self) -> DetectionTicket {
        self.last_image += 1;
        let id = ImageId(self.last_image);
        self.image = Some(ImageSlot {
            id,
            natural: None,
            parked: None,
        });
        self.store.clear();
        self.notice = None;
        self.phase = SessionPhase::Reconciled;
        self.events.record(format!("Image {} selected", id.0));
        self.issue(id)
    }

    /// Signals that the image `id` finished decoding with the given natural size.
    ///
    /// A reply that arrived before the size was known is applied now.
    pub fn image_ready(
        &mut self,
        id: ImageId,
        natural: ImageDimensions,
    ) -> OverlayResult<Option<Completion>> {
        let Some(slot) = self.image.as_mut().filter(|slot| slot.id == id) else {
            self.events
                .trace(&format!("ignoring ready signal for replaced image {}", id.0));
            return Ok(None);
        };
        if let Err(err) = natural.frame() {
            // Nothing could ever be normalized against this image.
            slot.parked = None;
            if self.phase.is_detecting() {
                self.fail(err.clone());
            }
            return Err(err);
        }
        slot.natural = Some(natural);
        let parked = slot.parked.take();
        self.events.record(format!(
            "Image {} ready ({}x{})",
            id.0, natural.width, natural.height
        ));

        Ok(parked.map(|(token, reply)| self.apply(token, reply)))
    }

    /// Updates the displayed sensitivity while the slider is dragged.
    pub fn set_sensitivity(&mut self, value: u8) {
        self.sensitivity = clamp_sensitivity(value);
    }

    /// Re-runs detection with the current sensitivity when an image is shown.
    pub fn commit_sensitivity(&mut self) -> Option<DetectionTicket> {
        let id = self.image.as_ref()?.id;
        self.events
            .record(format!("Sensitivity {} committed", self.sensitivity));
        Some(self.issue(id))
    }

    /// Display-only; markers and phase are unaffected.
    pub fn set_marker_size(&mut self, value: u8) {
        self.marker_size = clamp_marker_size(value);
    }

    /// Hands back the outcome of the request identified by `token`.
    pub fn complete_detection(
        &mut self,
        token: RequestToken,
        outcome: Result<DetectionReply, DetectionError>,
    ) -> Completion {
        if self.phase.in_flight() != Some(token) {
            self.metrics.record_stale();
            self.events
                .trace(&format!("discarding stale detection response {token}"));
            return Completion::Discarded;
        }

        match outcome {
            Ok(reply) => self.apply(token, reply),
            Err(err) => self.fail(err.into()),
        }
    }

    /// Removes the marker under the pointer, or adds one at the pointer.
    ///
    /// `pointer` is in pixels relative to the top-left corner of the rendered
    /// image box `rendered`.
    pub fn tap(&mut self, pointer: PixelPoint, rendered: ReferenceFrame) -> TapOutcome {
        if self.image.is_none() {
            return TapOutcome::Ignored;
        }
        let Some(point) = normalize_pointer(pointer, rendered) else {
            return TapOutcome::Ignored;
        };
        let Ok(tolerance) = self.tolerance(rendered) else {
            return TapOutcome::Ignored;
        };

        let hit = self
            .config
            .hit_policy
            .find(&point, self.store.as_slice(), tolerance);
        let outcome = match hit {
            Some(index) => {
                self.store.remove_at(index);
                self.events.record(format!("Removed marker {}", index + 1));
                TapOutcome::Removed(index)
            }
            None => {
                let index = self.store.append(point);
                self.events.record(format!("Added marker {}", index + 1));
                TapOutcome::Added(index)
            }
        };
        self.phase = self.phase.edited();
        outcome
    }

    /// Drops the most recent marker in sequence order.
    pub fn undo_last(&mut self) -> Option<Marker> {
        let removed = self.store.pop_last()?;
        self.phase = self.phase.edited();
        self.events
            .record(format!("Undid marker {}", self.store.count() + 1));
        Some(removed)
    }

    /// Removes every marker but keeps the image.
    pub fn clear_markers(&mut self) {
        if self.image.is_none() {
            return;
        }
        self.store.clear();
        self.phase = self.phase.edited();
        self.events.record("Cleared all markers");
    }

    /// Returns to `Idle`; any in-flight response will be discarded.
    pub fn clear(&mut self) {
        self.image = None;
        self.store.clear();
        self.notice = None;
        self.phase = SessionPhase::Idle;
        self.events.record("Session cleared");
    }

    /// Tap tolerance in percentage units for the given rendered box.
    pub fn tolerance(&self, rendered: ReferenceFrame) -> OverlayResult<f64> {
        tap_tolerance(self.marker_size, rendered.width(), self.config.hit_slack)
    }

    pub fn glyphs(&self) -> Vec<MarkerGlyph> {
        glyphs(
            self.store.as_slice(),
            &self.config.palette,
            self.config.band_size,
            self.marker_size,
        )
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn markers(&self) -> &[Marker] {
        self.store.as_slice()
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn sensitivity(&self) -> u8 {
        self.sensitivity
    }

    pub fn marker_size(&self) -> u8 {
        self.marker_size
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn image(&self) -> Option<ImageId> {
        self.image.as_ref().map(|slot| slot.id)
    }

    pub fn natural_dimensions(&self) -> Option<ImageDimensions> {
        self.image.as_ref().and_then(|slot| slot.natural)
    }

    /// Latest user-visible failure, if any.
    pub fn notice(&self) -> Option<&OverlayError> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn metrics(&self) -> &DetectionMetrics {
        &self.metrics
    }

    fn issue(&mut self, image: ImageId) -> DetectionTicket {
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        if let Some(slot) = self.image.as_mut() {
            slot.parked = None;
        }
        self.phase = SessionPhase::Detecting {
            token,
            settled: self.phase.settled(),
        };
        self.metrics.record_issued();
        self.events.trace(&format!(
            "issued detection {token} at sensitivity {}",
            self.sensitivity
        ));
        DetectionTicket {
            token,
            image,
            sensitivity: self.sensitivity,
        }
    }

    fn apply(&mut self, token: RequestToken, reply: DetectionReply) -> Completion {
        let Some(slot) = self.image.as_mut() else {
            self.metrics.record_stale();
            return Completion::Discarded;
        };
        let Some(natural) = slot.natural else {
            slot.parked = Some((token, reply));
            self.events
                .trace(&format!("holding response {token} until image is ready"));
            return Completion::Deferred;
        };

        let normalized = reply
            .points
            .iter()
            .map(|point| {
                let point = match reply.frame {
                    Some(frame) => point.rescaled(frame, natural),
                    None => *point,
                };
                normalize_detection(point.into(), Some(natural))
            })
            .collect::<OverlayResult<Vec<_>>>();

        match normalized {
            Ok(markers) => {
                self.store.replace_all(markers);
                self.phase = SessionPhase::Reconciled;
                self.notice = None;
                self.metrics.record_applied();
                self.events
                    .record(format!("Detected {} tubes", self.store.count()));
                Completion::Applied {
                    count: self.store.count(),
                }
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: OverlayError) -> Completion {
        self.phase = self.phase.settled().into();
        self.metrics.record_failed();
        self.events.record(format!("Detection failed: {err}"));
        self.notice = Some(err.clone());
        Completion::Failed(err)
    }
}

impl Default for OverlaySession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
