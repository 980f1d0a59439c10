use super::*;
use crate::{
    assets::bitmap::{Bitmap, FrameAsset},
    export::stats::CounterUpdate,
    foundation::{
        config::{FallbackArea, FrameFit},
        core::Canvas,
    },
    render::{compose::compose, detect::detect_photo_area, surface::FrameLayer},
};

#[derive(Default)]
struct Recorder {
    popups_blocked: bool,
    share_fails: bool,
    live_urls: Vec<String>,
    downloads: Vec<(String, Vec<u8>)>,
    windows: Vec<String>,
    opened: Vec<String>,
    shared: Vec<String>,
    clipboard: Option<String>,
}

impl ExportHost for Recorder {
    fn create_object_url(&mut self, _png: &[u8]) -> FrameIdResult<String> {
        let url = format!("blob:test/{}", self.live_urls.len());
        self.live_urls.push(url.clone());
        Ok(url)
    }

    fn revoke_object_url(&mut self, url: &str) {
        self.live_urls.retain(|u| u != url);
    }

    fn trigger_download(&mut self, url: &str, filename: &str) -> FrameIdResult<()> {
        self.downloads.push((filename.to_string(), url.as_bytes().to_vec()));
        Ok(())
    }

    fn open_window(&mut self, html: &str) -> FrameIdResult<WindowOutcome> {
        if self.popups_blocked {
            return Ok(WindowOutcome::Blocked);
        }
        self.windows.push(html.to_string());
        Ok(WindowOutcome::Opened)
    }

    fn open_url(&mut self, url: &str) -> FrameIdResult<WindowOutcome> {
        if self.popups_blocked {
            return Ok(WindowOutcome::Blocked);
        }
        self.opened.push(url.to_string());
        Ok(WindowOutcome::Opened)
    }

    fn share_files(&mut self, request: &ShareSheetRequest<'_>) -> FrameIdResult<()> {
        if self.share_fails {
            return Err(FrameIdError::validation("user dismissed"));
        }
        self.shared.push(request.filename.to_string());
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: &str) -> FrameIdResult<()> {
        self.clipboard = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct Counts(Vec<(String, CounterAction)>);

impl StatsSink for Counts {
    fn record(&mut self, slug: &str, update: CounterUpdate) -> FrameIdResult<()> {
        self.0.push((slug.to_string(), update.action));
        Ok(())
    }
}

fn campaign() -> Campaign {
    Campaign {
        slug: "demo".to_string(),
        name: "Demo <Fest>".to_string(),
        description: None,
    }
}

fn composite(tainted: bool) -> CompositeResult {
    let mut bmp =
        Bitmap::from_rgba_image(image::RgbaImage::from_pixel(6, 6, image::Rgba([9, 9, 9, 255])))
            .unwrap();
    if tainted {
        bmp = bmp.into_tainted();
    }
    let layer = FrameLayer::rasterize(
        &FrameAsset::new(bmp),
        Canvas::new(6, 6).unwrap(),
        FrameFit::Contain,
    )
    .unwrap();
    let area = detect_photo_area(&layer, 200, FallbackArea::default()).unwrap();
    compose(&layer, None, area).unwrap()
}

#[test]
fn direct_download_clicks_anchor_and_revokes_url() {
    let exporter = Exporter::new(PlatformCapabilities::desktop());
    assert!(exporter.capabilities().supports_direct_download);
    let mut host = Recorder::default();
    let mut stats = Counts::default();

    let receipt = exporter
        .export(&composite(false), &campaign(), &mut host, &mut stats)
        .unwrap();

    assert_eq!(receipt.path, ExportPath::DirectDownload);
    assert_eq!(receipt.filename, "twibbon-Demo <Fest>.png");
    assert!(receipt.bytes > 0);
    assert_eq!(host.downloads.len(), 1);
    assert!(host.live_urls.is_empty());
    assert!(host.windows.is_empty());
    assert_eq!(stats.0, vec![("demo".to_string(), CounterAction::Download)]);
}

#[test]
fn restricted_platform_opens_save_page_and_shares() {
    let caps = PlatformCapabilities {
        supports_direct_download: false,
        supports_share_sheet: true,
    };
    let mut host = Recorder::default();
    let mut stats = Counts::default();

    let receipt = Exporter::new(caps)
        .export(&composite(false), &campaign(), &mut host, &mut stats)
        .unwrap();

    assert_eq!(receipt.path, ExportPath::SaveImagePage);
    assert!(receipt.shared);
    assert!(host.downloads.is_empty());
    let page = &host.windows[0];
    assert!(page.contains("data:image/png;base64,"));
    assert!(page.contains("Long-press"));
    assert!(page.contains("Twibbon - Demo &lt;Fest&gt;"));
    assert!(!page.contains("<Fest>"));
    assert_eq!(host.shared, vec!["twibbon-Demo <Fest>.png".to_string()]);
    assert_eq!(stats.0.len(), 1);
}

#[test]
fn share_sheet_failure_is_not_an_export_failure() {
    let caps = PlatformCapabilities {
        supports_direct_download: false,
        supports_share_sheet: true,
    };
    let mut host = Recorder {
        share_fails: true,
        ..Recorder::default()
    };
    let receipt = Exporter::new(caps)
        .export(&composite(false), &campaign(), &mut host, &mut Counts::default())
        .unwrap();
    assert!(!receipt.shared);
    assert_eq!(host.windows.len(), 1);
}

#[test]
fn blocked_popup_is_export_blocked_without_counting() {
    let caps = PlatformCapabilities {
        supports_direct_download: false,
        supports_share_sheet: false,
    };
    let mut host = Recorder {
        popups_blocked: true,
        ..Recorder::default()
    };
    let mut stats = Counts::default();

    let err = Exporter::new(caps)
        .export(&composite(false), &campaign(), &mut host, &mut stats)
        .unwrap_err();
    assert!(matches!(err, FrameIdError::ExportBlocked(_)));
    assert!(err.user_message().contains("allow popups"));
    assert!(stats.0.is_empty());
}

#[test]
fn tainted_composite_fails_before_any_side_effect() {
    let mut host = Recorder::default();
    let mut stats = Counts::default();
    let err = Exporter::default()
        .export(&composite(true), &campaign(), &mut host, &mut stats)
        .unwrap_err();
    assert!(matches!(err, FrameIdError::CanvasTainted));
    assert!(host.live_urls.is_empty() && host.downloads.is_empty());
    assert!(stats.0.is_empty());
}

#[test]
fn share_opens_intent_and_counts() {
    let mut host = Recorder::default();
    let mut stats = Counts::default();
    let exporter = Exporter::default();

    let intent = exporter
        .share(
            ShareTarget::Facebook,
            &campaign(),
            "https://frame.id",
            &mut host,
            &mut stats,
        )
        .unwrap();
    assert!(matches!(intent, ShareIntent::OpenUrl(_)));
    assert_eq!(host.opened.len(), 1);

    exporter
        .share(
            ShareTarget::Instagram,
            &campaign(),
            "https://frame.id",
            &mut host,
            &mut stats,
        )
        .unwrap();
    assert_eq!(
        host.clipboard.as_deref(),
        Some("https://frame.id/twibbon/demo")
    );
    assert_eq!(
        stats.0.iter().map(|(_, a)| *a).collect::<Vec<_>>(),
        vec![CounterAction::Share, CounterAction::Share]
    );
}

#[test]
fn html_escaping() {
    assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    assert_eq!(escape_js("it's </script>"), "it\\'s \\x3C/script>");
}
