use serde::{Deserialize, Serialize};

const SHORT_DESCRIPTION_MAX_CHARS: usize = 200;

/// One playlist entry as the cache stores and the presentation layer shows it.
///
/// Items carry no identity beyond structural equality; the cache keeps an
/// ordered sequence of them, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoItem {
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: String,
}

impl VideoItem {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }

    /// Description cut at a word boundary so list rows stay short.
    pub fn short_description(&self) -> String {
        smart_truncate(&self.description, SHORT_DESCRIPTION_MAX_CHARS)
    }
}

fn smart_truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut out = String::new();
    for word in text.split(' ') {
        let next_len = out.chars().count() + word.chars().count() + usize::from(!out.is_empty());
        if next_len > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        out = text.chars().take(max_chars).collect();
    }
    out.push_str("...");
    out
}
