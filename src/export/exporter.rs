use crate::{
    assets::source,
    export::{
        campaign::Campaign,
        platform::PlatformCapabilities,
        share::{ShareIntent, ShareTarget, share_intent},
        stats::{CounterAction, StatsSink, record_best_effort},
    },
    foundation::error::{FrameIdError, FrameIdResult},
    render::compose::CompositeResult,
};

/// Whether a requested window actually appeared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowOutcome {
    Opened,
    /// Refused by a popup blocker. Hosts report this when no window became visible.
    Blocked,
}

/// Files handed to the native share sheet.
#[derive(Clone, Copy, Debug)]
pub struct ShareSheetRequest<'a> {
    pub filename: &'a str,
    pub png: &'a [u8],
    pub title: &'a str,
    pub text: &'a str,
}

/// Side effects the exporter needs from its environment (browser, desktop shell, test double).
pub trait ExportHost {
    /// Register `png` as a blob and return an object URL for it.
    fn create_object_url(&mut self, png: &[u8]) -> FrameIdResult<String>;
    fn revoke_object_url(&mut self, url: &str);
    /// Follow `url` through an anchor carrying `download = filename`.
    fn trigger_download(&mut self, url: &str, filename: &str) -> FrameIdResult<()>;
    /// Open a new window showing `html`.
    fn open_window(&mut self, html: &str) -> FrameIdResult<WindowOutcome>;
    fn open_url(&mut self, url: &str) -> FrameIdResult<WindowOutcome>;
    fn share_files(&mut self, request: &ShareSheetRequest<'_>) -> FrameIdResult<()>;
    fn copy_to_clipboard(&mut self, text: &str) -> FrameIdResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPath {
    DirectDownload,
    SaveImagePage,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExportReceipt {
    pub path: ExportPath,
    pub filename: String,
    pub bytes: usize,
    /// The native share sheet accepted the image.
    pub shared: bool,
}

/// Serializes composites and hands them to the platform.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exporter {
    caps: PlatformCapabilities,
}

impl Exporter {
    pub fn new(caps: PlatformCapabilities) -> Self {
        Self { caps }
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.caps
    }

    /// Encode `composite` as PNG and save it.
    ///
    /// Direct-download platforms get an object URL clicked through a download anchor. Others get
    /// a new window with the image and save instructions, plus a share-sheet attempt when
    /// available. A blocked window is [`FrameIdError::ExportBlocked`]; the download counter is
    /// bumped only on success.
    #[tracing::instrument(skip_all, fields(slug = %campaign.slug))]
    pub fn export(
        &self,
        composite: &CompositeResult,
        campaign: &Campaign,
        host: &mut dyn ExportHost,
        stats: &mut dyn StatsSink,
    ) -> FrameIdResult<ExportReceipt> {
        let png = composite.encode_png()?;
        let filename = campaign.export_filename();

        let receipt = if self.caps.supports_direct_download {
            let url = host.create_object_url(&png)?;
            let clicked = host.trigger_download(&url, &filename);
            host.revoke_object_url(&url);
            clicked?;
            ExportReceipt {
                path: ExportPath::DirectDownload,
                filename,
                bytes: png.len(),
                shared: false,
            }
        } else {
            let page = save_image_page(&source::png_data_url(&png), &filename, campaign);
            if host.open_window(&page)? == WindowOutcome::Blocked {
                tracing::warn!("save-image window was blocked");
                return Err(FrameIdError::export_blocked(
                    "the save-image window was blocked by a popup blocker",
                ));
            }
            let shared = self.caps.supports_share_sheet && {
                let title = campaign.page_title();
                let request = ShareSheetRequest {
                    filename: &filename,
                    png: &png,
                    title: &title,
                    text: SHARE_SHEET_TEXT,
                };
                match host.share_files(&request) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "share sheet failed");
                        false
                    }
                }
            };
            ExportReceipt {
                path: ExportPath::SaveImagePage,
                filename,
                bytes: png.len(),
                shared,
            }
        };

        tracing::info!(
            path = ?receipt.path,
            bytes = receipt.bytes,
            filename = %receipt.filename,
            "exported"
        );
        record_best_effort(stats, &campaign.slug, CounterAction::Download);
        Ok(receipt)
    }

    /// Share the campaign page to a social channel and bump the share counter.
    #[tracing::instrument(skip_all, fields(slug = %campaign.slug, target = target.as_str()))]
    pub fn share(
        &self,
        target: ShareTarget,
        campaign: &Campaign,
        origin: &str,
        host: &mut dyn ExportHost,
        stats: &mut dyn StatsSink,
    ) -> FrameIdResult<ShareIntent> {
        let intent = share_intent(target, campaign, origin);
        match &intent {
            ShareIntent::OpenUrl(url) => {
                if host.open_url(url)? == WindowOutcome::Blocked {
                    return Err(FrameIdError::export_blocked(
                        "the share window was blocked by a popup blocker",
                    ));
                }
            }
            ShareIntent::CopyLink(url) => host.copy_to_clipboard(url)?,
        }
        tracing::info!("shared");
        record_best_effort(stats, &campaign.slug, CounterAction::Share);
        Ok(intent)
    }
}

const SHARE_SHEET_TEXT: &str = "Check out my twibbon!";

/// Self-contained page shown on platforms without direct downloads.
pub fn save_image_page(data_url: &str, filename: &str, campaign: &Campaign) -> String {
    let title = escape_html(&campaign.page_title());
    let filename = escape_html(filename);
    let data_url = escape_html(data_url);
    let share_title = escape_js(&campaign.page_title());
    let share_name = escape_js(&campaign.export_filename());
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ margin: 0; padding: 20px; font-family: -apple-system, BlinkMacSystemFont, sans-serif; background: #f5f5f5; text-align: center; }}
.container {{ max-width: 500px; margin: 0 auto; background: #fff; padding: 20px; border-radius: 12px; }}
img {{ max-width: 100%; height: auto; border-radius: 8px; }}
.instructions {{ margin: 20px 0; padding: 15px; background: #e3f2fd; border-radius: 8px; color: #1976d2; }}
.button {{ display: inline-block; margin: 10px; padding: 12px 24px; background: #2196f3; color: #fff; text-decoration: none; border: 0; border-radius: 8px; font-size: 16px; }}
</style>
</head>
<body>
<div class="container">
<h2>{title}</h2>
<img src="{data_url}" alt="{filename}">
<div class="instructions">
<p><strong>How to save:</strong></p>
<p>Long-press the image above, then choose "Save to Photos" or "Download Image".</p>
</div>
<a class="button" href="{data_url}" download="{filename}">Download</a>
<button class="button" onclick="shareImage()">Share</button>
</div>
<script>
async function shareImage() {{
  if (!navigator.share) return;
  try {{
    const blob = await (await fetch(document.querySelector('img').src)).blob();
    const file = new File([blob], '{share_name}', {{ type: 'image/png' }});
    await navigator.share({{ title: '{share_title}', text: '{SHARE_SHEET_TEXT}', files: [file] }});
  }} catch (e) {{
    console.log('share failed', e);
  }}
}}
</script>
</body>
</html>
"#
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// For single-quoted JS string literals inside an HTML <script>.
fn escape_js(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3C"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
