/// What the current platform lets the exporter do. Resolved once per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlatformCapabilities {
    /// Programmatic file downloads work.
    pub supports_direct_download: bool,
    /// A native share sheet can receive files.
    pub supports_share_sheet: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::desktop()
    }
}

impl PlatformCapabilities {
    pub fn desktop() -> Self {
        Self {
            supports_direct_download: true,
            supports_share_sheet: false,
        }
    }

    /// Classify a browser user agent.
    ///
    /// Safari and iOS browsers block programmatic downloads of generated images but offer the
    /// native share sheet.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let restricted = is_safari(user_agent) || is_ios(user_agent);
        Self {
            supports_direct_download: !restricted,
            supports_share_sheet: restricted,
        }
    }
}

/// "safari" appears with no "chrome"/"android" before it (case-insensitive).
pub fn is_safari(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    let Some(safari) = ua.find("safari") else {
        return false;
    };
    let blocker = [ua.find("chrome"), ua.find("android")]
        .into_iter()
        .flatten()
        .min();
    blocker.is_none_or(|b| b > safari)
}

pub fn is_ios(user_agent: &str) -> bool {
    ["iPad", "iPhone", "iPod"]
        .iter()
        .any(|d| user_agent.contains(d))
}

#[cfg(test)]
#[path = "../../tests/unit/export/platform.rs"]
mod tests;
