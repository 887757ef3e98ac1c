use serde::{Deserialize, Serialize};

use crate::domain::VideoItem;

/// Body returned by the playlist endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkVideoContainer {
    pub videos: Vec<NetworkVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkVideo {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub updated: String,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_captions: Option<String>,
}

impl From<NetworkVideo> for VideoItem {
    fn from(value: NetworkVideo) -> Self {
        Self {
            title: value.title,
            description: value.description,
            url: value.url,
            thumbnail_url: value.thumbnail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_devbyte_playlist_body() {
        let raw = r#"{
            "videos": [
                {
                    "title": "Android Jetpack: Room",
                    "description": "Room persistence library",
                    "url": "https://youtu.be/room",
                    "updated": "2018-06-07T17:09:43+00:00",
                    "thumbnail": "https://i.ytimg.com/room.jpg",
                    "closedCaptions": null
                },
                {
                    "title": "Coroutines",
                    "description": "Structured concurrency",
                    "url": "https://youtu.be/coroutines",
                    "thumbnail": "https://i.ytimg.com/coroutines.jpg"
                }
            ]
        }"#;

        let container: NetworkVideoContainer = serde_json::from_str(raw).expect("decode");
        let items: Vec<VideoItem> = container.videos.into_iter().map(VideoItem::from).collect();

        assert_eq!(
            items,
            vec![
                VideoItem::new(
                    "Android Jetpack: Room",
                    "Room persistence library",
                    "https://youtu.be/room",
                    "https://i.ytimg.com/room.jpg",
                ),
                VideoItem::new(
                    "Coroutines",
                    "Structured concurrency",
                    "https://youtu.be/coroutines",
                    "https://i.ytimg.com/coroutines.jpg",
                ),
            ]
        );
    }

    #[test]
    fn rejects_entry_without_thumbnail() {
        let raw = r#"{"videos":[{"title":"t","description":"d","url":"u"}]}"#;
        assert!(serde_json::from_str::<NetworkVideoContainer>(raw).is_err());
    }
}
