//! Frame ID composites a user photo behind a campaign frame ("twibbon") and exports the result.
//!
//! The public API is session-oriented:
//!
//! - Load a frame and a photo through an [`ImageLoader`] into an [`EditorSession`]
//! - Adjust placement with pointer, wheel and touch gestures, or a [`CropRect`]
//! - Compose and export through an [`ExportHost`] chosen by [`PlatformCapabilities`]
#![forbid(unsafe_code)]

/// Image sources, decoding and bitmaps.
pub mod assets;
/// Transform state, gestures and the editing session.
pub mod edit;
/// Export paths, share intents and counters.
pub mod export;
/// Core types, configuration and errors.
pub mod foundation;
/// Photo-area detection and compositing.
pub mod render;

pub use crate::assets::bitmap::{Bitmap, FrameAsset, UserPhoto};
pub use crate::assets::loader::ImageLoader;
pub use crate::assets::source::{AssetFetcher, Fetched, ImageSource, LocalUploads};
pub use crate::edit::gesture::{GestureTracker, WheelInput};
pub use crate::edit::session::{
    EditorSession, LoadOutcome, LoadSlot, LoadTicket, SessionState,
};
pub use crate::edit::transform::{MAX_SCALE, MIN_SCALE, Transform};
pub use crate::export::campaign::Campaign;
pub use crate::export::exporter::{
    ExportHost, ExportPath, ExportReceipt, Exporter, ShareSheetRequest, WindowOutcome,
};
pub use crate::export::host::DirectoryHost;
pub use crate::export::platform::PlatformCapabilities;
pub use crate::export::share::{ShareIntent, ShareTarget, share_intent};
pub use crate::export::stats::{CounterAction, CounterUpdate, JsonLinesStats, NoStats, StatsSink};
pub use crate::foundation::config::{EditorConfig, FallbackArea, FrameFit};
pub use crate::foundation::core::{Affine, Canvas, PhotoArea, Point, Rect, Vec2};
pub use crate::foundation::error::{DecodeError, FrameIdError, FrameIdResult};
pub use crate::render::compose::{CompositeResult, CropRect, Placement, compose};
pub use crate::render::detect::{
    AreaSource, DetectionReport, detect_photo_area, detect_photo_area_report,
};
pub use crate::render::surface::FrameLayer;
