use std::fmt::Write as _;

use crate::{
    export::campaign::Campaign,
    foundation::error::{FrameIdError, FrameIdResult},
};

/// Social channels the campaign page can be shared to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareTarget {
    Whatsapp,
    Facebook,
    Twitter,
    Instagram,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 4] = [
        ShareTarget::Whatsapp,
        ShareTarget::Facebook,
        ShareTarget::Twitter,
        ShareTarget::Instagram,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
        }
    }
}

impl std::str::FromStr for ShareTarget {
    type Err = FrameIdError;

    fn from_str(s: &str) -> FrameIdResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FrameIdError::validation(format!("unknown share target \"{s}\"")))
    }
}

/// What the host should do to share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareIntent {
    /// Open this URL in a new window.
    OpenUrl(String),
    /// No web intent exists for the channel, copy the page link instead.
    CopyLink(String),
}

/// Build the share action for `target` pointing at the campaign page under `origin`.
pub fn share_intent(target: ShareTarget, campaign: &Campaign, origin: &str) -> ShareIntent {
    let url = campaign.share_url(origin);
    let text = campaign.share_text();
    match target {
        ShareTarget::Whatsapp => ShareIntent::OpenUrl(format!(
            "https://wa.me/?text={}",
            encode_uri_component(&format!("{text} {url}"))
        )),
        ShareTarget::Facebook => ShareIntent::OpenUrl(format!(
            "https://www.facebook.com/sharer/sharer.php?u={}",
            encode_uri_component(&url)
        )),
        ShareTarget::Twitter => ShareIntent::OpenUrl(format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            encode_uri_component(&text),
            encode_uri_component(&url)
        )),
        ShareTarget::Instagram => ShareIntent::CopyLink(url),
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, byte-wise over UTF-8.
pub fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/share.rs"]
mod tests;
