//! One editing session: frame, photo, placement and the export lifecycle.

use crate::{
    assets::{
        bitmap::{FrameAsset, UserPhoto},
        loader::ImageLoader,
        source::ImageSource,
    },
    edit::{
        gesture::{GestureTracker, WheelInput},
        transform::Transform,
    },
    export::{
        campaign::Campaign,
        exporter::{ExportHost, ExportReceipt, Exporter},
        platform::PlatformCapabilities,
        share::{ShareIntent, ShareTarget},
        stats::StatsSink,
    },
    foundation::{
        config::EditorConfig,
        core::{Canvas, PhotoArea, Point},
        error::{FrameIdError, FrameIdResult},
    },
    render::{
        compose::{CompositeResult, CropRect, Placement, compose},
        detect::{DetectionReport, detect_photo_area_report},
        surface::FrameLayer,
    },
};

/// Lifecycle of a session. Loading a new photo always returns to `PhotoLoaded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    PhotoLoaded,
    Composited,
    Exported,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSlot {
    Frame,
    Photo,
}

/// Issued when a load starts. Only the most recent ticket of a slot may apply its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    slot: LoadSlot,
    generation: u64,
}

impl LoadTicket {
    pub fn slot(&self) -> LoadSlot {
        self.slot
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load of the same slot was started; the result was dropped.
    Superseded,
}

#[derive(Debug)]
struct LoadedFrame {
    layer: FrameLayer,
    report: DetectionReport,
}

#[derive(Debug)]
pub struct EditorSession {
    cfg: EditorConfig,
    exporter: Exporter,
    campaign: Campaign,
    state: SessionState,
    canvas: Canvas,
    frame: Option<LoadedFrame>,
    photo: Option<UserPhoto>,
    placement: Placement,
    gestures: GestureTracker,
    frame_generation: u64,
    photo_generation: u64,
    preview: Option<CompositeResult>,
    composite: Option<CompositeResult>,
}

impl EditorSession {
    pub fn new(
        cfg: EditorConfig,
        caps: PlatformCapabilities,
        campaign: Campaign,
    ) -> FrameIdResult<Self> {
        cfg.validate()?;
        Ok(Self {
            canvas: cfg.editor_canvas,
            gestures: GestureTracker::new(&cfg),
            exporter: Exporter::new(caps),
            campaign,
            state: SessionState::Empty,
            frame: None,
            photo: None,
            placement: Placement::Freehand {
                transform: Transform::default(),
            },
            frame_generation: 0,
            photo_generation: 0,
            preview: None,
            composite: None,
            cfg,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.cfg
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn photo_area(&self) -> Option<PhotoArea> {
        self.frame.as_ref().map(|f| f.report.area)
    }

    pub fn detection(&self) -> Option<&DetectionReport> {
        self.frame.as_ref().map(|f| &f.report)
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Freehand transform, or `None` in cropped mode.
    pub fn transform(&self) -> Option<Transform> {
        match self.placement {
            Placement::Freehand { transform } => Some(transform),
            Placement::Cropped { .. } => None,
        }
    }

    /// Latest redraw. Present once a frame is loaded.
    pub fn preview(&self) -> Option<&CompositeResult> {
        self.preview.as_ref()
    }

    /// Result of the last [`EditorSession::compose`], dropped on any edit.
    pub fn composite(&self) -> Option<&CompositeResult> {
        self.composite.as_ref()
    }

    pub fn begin_frame_load(&mut self) -> LoadTicket {
        self.frame_generation += 1;
        tracing::debug!(generation = self.frame_generation, "frame load started");
        LoadTicket {
            slot: LoadSlot::Frame,
            generation: self.frame_generation,
        }
    }

    pub fn begin_photo_load(&mut self) -> LoadTicket {
        self.photo_generation += 1;
        tracing::debug!(generation = self.photo_generation, "photo load started");
        LoadTicket {
            slot: LoadSlot::Photo,
            generation: self.photo_generation,
        }
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        let latest = match ticket.slot {
            LoadSlot::Frame => self.frame_generation,
            LoadSlot::Photo => self.photo_generation,
        };
        ticket.generation == latest
    }

    /// Apply a finished frame load: size the output canvas, rasterize, detect the photo area once
    /// and refit the photo. A session in cropped mode stays cropped, with the centered cover crop
    /// for the new photo area replacing the previous crop. Errors leave the session untouched.
    pub fn finish_frame_load(
        &mut self,
        ticket: LoadTicket,
        result: FrameIdResult<FrameAsset>,
    ) -> FrameIdResult<LoadOutcome> {
        self.check_slot(ticket, LoadSlot::Frame)?;
        if !self.is_current(ticket) {
            tracing::warn!(
                generation = ticket.generation,
                latest = self.frame_generation,
                "discarding superseded frame load"
            );
            return Ok(LoadOutcome::Superseded);
        }
        let frame = result?;
        let bmp = frame.bitmap();
        let canvas = Canvas::for_frame(bmp.width(), bmp.height(), self.cfg.max_output_edge)?;
        let layer = FrameLayer::rasterize(&frame, canvas, self.cfg.frame_fit)?;
        let report =
            detect_photo_area_report(&layer, self.cfg.alpha_threshold, self.cfg.fallback_area)?;
        tracing::debug!(?canvas, area = ?report.area, source = ?report.source, "frame applied");

        self.canvas = canvas;
        self.frame = Some(LoadedFrame { layer, report });
        let keep_crop = matches!(self.placement, Placement::Cropped { .. });
        self.refit_photo(keep_crop)?;
        self.redraw()?;
        Ok(LoadOutcome::Applied)
    }

    /// Apply a finished photo load: reset to a fitted freehand placement and return to
    /// `PhotoLoaded`.
    pub fn finish_photo_load(
        &mut self,
        ticket: LoadTicket,
        result: FrameIdResult<UserPhoto>,
    ) -> FrameIdResult<LoadOutcome> {
        self.check_slot(ticket, LoadSlot::Photo)?;
        if !self.is_current(ticket) {
            tracing::warn!(
                generation = ticket.generation,
                latest = self.photo_generation,
                "discarding superseded photo load"
            );
            return Ok(LoadOutcome::Superseded);
        }
        let photo = result?;
        tracing::debug!(
            w = photo.bitmap().width(),
            h = photo.bitmap().height(),
            "photo applied"
        );
        self.photo = Some(photo);
        self.refit_photo(false)?;
        self.redraw()?;
        Ok(LoadOutcome::Applied)
    }

    pub async fn load_frame(
        &mut self,
        loader: &ImageLoader,
        source: ImageSource,
    ) -> FrameIdResult<LoadOutcome> {
        let ticket = self.begin_frame_load();
        let result = loader.load(source).await.map(FrameAsset::new);
        self.finish_frame_load(ticket, result)
    }

    pub async fn load_photo(
        &mut self,
        loader: &ImageLoader,
        source: ImageSource,
    ) -> FrameIdResult<LoadOutcome> {
        let ticket = self.begin_photo_load();
        let result = loader.load(source).await.map(UserPhoto::new);
        self.finish_photo_load(ticket, result)
    }

    fn check_slot(&self, ticket: LoadTicket, slot: LoadSlot) -> FrameIdResult<()> {
        if ticket.slot != slot {
            return Err(FrameIdError::validation(format!(
                "{:?} ticket used for a {slot:?} load",
                ticket.slot
            )));
        }
        Ok(())
    }

    fn refit_photo(&mut self, keep_crop: bool) -> FrameIdResult<()> {
        self.composite = None;
        self.gestures.reset();
        let Some(photo) = &self.photo else {
            return Ok(());
        };
        let bmp = photo.bitmap();
        self.placement = match self.photo_area() {
            Some(area) if keep_crop => Placement::Cropped {
                crop: CropRect::cover(bmp.width(), bmp.height(), area.aspect())?,
            },
            area => Placement::Freehand {
                transform: Transform::fit(
                    bmp.width(),
                    bmp.height(),
                    area,
                    self.canvas,
                    self.cfg.fit_without_frame,
                ),
            },
        };
        self.state = SessionState::PhotoLoaded;
        Ok(())
    }

    fn redraw(&mut self) -> FrameIdResult<()> {
        let Some(frame) = &self.frame else {
            return Ok(());
        };
        let photo = self.photo.as_ref().map(|p| (p, &self.placement));
        self.preview = Some(compose(&frame.layer, photo, frame.report.area)?);
        Ok(())
    }

    fn apply_edit(&mut self, placement: Placement) -> FrameIdResult<bool> {
        if self.photo.is_none() || placement == self.placement {
            return Ok(false);
        }
        self.placement = placement;
        self.composite = None;
        self.redraw()?;
        Ok(true)
    }

    /// Edits below return `true` when the placement changed and the preview was redrawn.
    pub fn set_transform(&mut self, transform: Transform) -> FrameIdResult<bool> {
        self.apply_edit(Placement::Freehand { transform })
    }

    /// Switch to cropper-guided placement. The crop is clamped to the photo.
    pub fn set_crop(&mut self, crop: CropRect) -> FrameIdResult<bool> {
        let Some(photo) = &self.photo else {
            return Ok(false);
        };
        let crop = crop.clamped_to(photo.bitmap().width(), photo.bitmap().height())?;
        self.apply_edit(Placement::Cropped { crop })
    }

    /// Cropped placement with the centered crop matching the photo area's aspect.
    pub fn use_cover_crop(&mut self) -> FrameIdResult<bool> {
        let (Some(photo), Some(area)) = (&self.photo, self.photo_area()) else {
            return Ok(false);
        };
        let crop = CropRect::cover(photo.bitmap().width(), photo.bitmap().height(), area.aspect())?;
        self.apply_edit(Placement::Cropped { crop })
    }

    fn gesture_base(&self) -> Option<Transform> {
        self.photo.as_ref()?;
        self.transform()
    }

    pub fn pointer_down(&mut self, at: Point) {
        if let Some(t) = self.gesture_base() {
            self.gestures.pointer_down(at, &t);
        }
    }

    pub fn pointer_move(&mut self, at: Point) -> FrameIdResult<bool> {
        let Some(t) = self.gesture_base() else {
            return Ok(false);
        };
        match self.gestures.pointer_move(at, &t) {
            Some(next) => self.set_transform(next),
            None => Ok(false),
        }
    }

    pub fn pointer_up(&mut self) {
        self.gestures.pointer_up();
    }

    pub fn wheel(&mut self, input: WheelInput) -> FrameIdResult<bool> {
        let Some(t) = self.gesture_base() else {
            return Ok(false);
        };
        match self.gestures.wheel(input, &t) {
            Some(next) => self.set_transform(next),
            None => Ok(false),
        }
    }

    pub fn touch_start(&mut self, touches: &[Point]) {
        if let Some(t) = self.gesture_base() {
            self.gestures.touch_start(touches, &t);
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> FrameIdResult<bool> {
        let Some(t) = self.gesture_base() else {
            return Ok(false);
        };
        match self.gestures.touch_move(touches, &t) {
            Some(next) => self.set_transform(next),
            None => Ok(false),
        }
    }

    pub fn touch_end(&mut self) {
        self.gestures.touch_end();
    }

    /// Render the final composite and move to `Composited`.
    pub fn compose(&mut self) -> FrameIdResult<&CompositeResult> {
        let Some(frame) = &self.frame else {
            return Err(FrameIdError::validation(
                "The frame is still loading, please wait.",
            ));
        };
        let Some(photo) = &self.photo else {
            return Err(FrameIdError::validation("Please upload a photo first."));
        };
        let out = compose(&frame.layer, Some((photo, &self.placement)), frame.report.area)?;
        if self.state == SessionState::PhotoLoaded {
            self.state = SessionState::Composited;
        }
        Ok(&*self.composite.insert(out))
    }

    /// Export the current composite (rendering it first if needed) and move to `Exported`.
    pub fn export(
        &mut self,
        host: &mut dyn ExportHost,
        stats: &mut dyn StatsSink,
    ) -> FrameIdResult<ExportReceipt> {
        if self.composite.is_none() {
            self.compose()?;
        }
        let composite = self
            .composite
            .as_ref()
            .ok_or_else(|| FrameIdError::render("no composite to export"))?;
        let receipt = self.exporter.export(composite, &self.campaign, host, stats)?;
        self.state = SessionState::Exported;
        Ok(receipt)
    }

    pub fn share(
        &self,
        target: ShareTarget,
        origin: &str,
        host: &mut dyn ExportHost,
        stats: &mut dyn StatsSink,
    ) -> FrameIdResult<ShareIntent> {
        self.exporter
            .share(target, &self.campaign, origin, host, stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/session.rs"]
mod tests;
