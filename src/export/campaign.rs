/// Campaign the frame belongs to. Drives filenames, page titles and share text.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Campaign {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Campaign {
    /// `twibbon-<campaign-name>.png`, with path separators replaced so the name is always a
    /// single file name.
    pub fn export_filename(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| match c {
                '/' | '\\' | '\0' => '-',
                c => c,
            })
            .collect();
        format!("twibbon-{name}.png")
    }

    pub fn page_title(&self) -> String {
        format!("Twibbon - {}", self.name)
    }

    /// Public page of the campaign under `origin` (scheme + host, no trailing slash needed).
    pub fn share_url(&self, origin: &str) -> String {
        format!("{}/twibbon/{}", origin.trim_end_matches('/'), self.slug)
    }

    pub fn share_text(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!("Check out this awesome twibbon: {}", self.name),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/campaign.rs"]
mod tests;
