//! Song detail, song list and song admin patches

use serde::{Deserialize, Serialize};
use t2k_common::{ArtistId, SongId};

use super::{normalize_text, normalize_url};

/// Position of a song in one chart year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ChartPoint {
    pub year: i32,
    pub position: i32,
}

/// Song joined with its artist
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SongRecord {
    pub song_id: SongId,
    pub artist_id: ArtistId,
    pub title: String,
    pub artist_name: String,
    pub release_year: Option<i32>,
    pub img_url: Option<String>,
    pub lyrics: Option<String>,
    pub youtube: Option<String>,
    pub artist_photo: Option<String>,
    pub artist_biography: Option<String>,
}

/// Response of `/song/details`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    pub song_id: SongId,
    pub artist_id: ArtistId,
    #[serde(rename = "titel")]
    pub title: String,
    pub img_url: Option<String>,
    pub artist_name: String,
    pub artist_photo: Option<String>,
    pub artist_biography: Option<String>,
    pub lyrics: Option<String>,
    pub release_year: Option<i32>,
    pub youtube: Option<String>,
    pub chart_history: Vec<ChartPoint>,
}

impl SongDetail {
    pub fn new(song: SongRecord, chart_history: Vec<ChartPoint>) -> Self {
        Self {
            song_id: song.song_id,
            artist_id: song.artist_id,
            title: song.title,
            img_url: song.img_url,
            artist_name: song.artist_name,
            artist_photo: song.artist_photo,
            artist_biography: song.artist_biography,
            lyrics: song.lyrics,
            release_year: song.release_year,
            youtube: song.youtube,
            chart_history,
        }
    }
}

/// Row of `/song/getallsongs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SongListItem {
    pub song_id: SongId,
    #[serde(rename = "titel")]
    pub title: String,
    pub artist_name: String,
    pub release_year: Option<i32>,
    pub img_url: Option<String>,
    pub youtube: Option<String>,
}

/// Query string of `/song/details`
#[derive(Debug, Clone, Deserialize)]
pub struct SongDetailQuery {
    pub id: SongId,
}

/// Body of `PUT /song/update/:songId`; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    pub img_url: Option<String>,
    pub lyrics: Option<String>,
    pub youtube: Option<String>,
}

impl SongPatch {
    /// Validate and apply onto `song`; on error `song` is untouched
    pub fn apply(&self, song: &mut SongRecord) -> Result<(), String> {
        let img_url = match &self.img_url {
            Some(url) => Some(normalize_url(url).map_err(|e| format!("Invalid image URL: {}", e))?),
            None => None,
        };
        let youtube = match &self.youtube {
            Some(url) => Some(normalize_url(url).map_err(|e| format!("Invalid YouTube URL: {}", e))?),
            None => None,
        };

        if let Some(img_url) = img_url {
            song.img_url = img_url;
        }
        if let Some(youtube) = youtube {
            song.youtube = youtube;
        }
        if let Some(lyrics) = &self.lyrics {
            song.lyrics = Some(normalize_text(lyrics));
        }
        Ok(())
    }
}

/// Song as returned after an update (missing values as empty strings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongView {
    pub song_id: SongId,
    #[serde(rename = "titel")]
    pub title: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub release_year: Option<i32>,
    pub img_url: String,
    pub lyrics: String,
    pub youtube: String,
}

impl From<SongRecord> for SongView {
    fn from(song: SongRecord) -> Self {
        Self {
            song_id: song.song_id,
            title: song.title,
            artist_id: song.artist_id,
            artist_name: song.artist_name,
            release_year: song.release_year,
            img_url: song.img_url.unwrap_or_default(),
            lyrics: song.lyrics.unwrap_or_default(),
            youtube: song.youtube.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> SongRecord {
        SongRecord {
            song_id: 10,
            artist_id: 1,
            title: "Bohemian Rhapsody".to_string(),
            artist_name: "Queen".to_string(),
            release_year: Some(1975),
            img_url: None,
            lyrics: None,
            youtube: Some("https://www.youtube.com/watch?v=fJ9rUzIMcZQ".to_string()),
            artist_photo: None,
            artist_biography: None,
        }
    }

    #[test]
    fn test_patch_sets_and_clears() {
        let mut record = song();
        let patch = SongPatch {
            img_url: Some(" https://img.example/br.jpg ".to_string()),
            lyrics: Some("Is this the real life?\n".to_string()),
            youtube: Some(String::new()),
        };

        patch.apply(&mut record).unwrap();

        assert_eq!(record.img_url.as_deref(), Some("https://img.example/br.jpg"));
        assert_eq!(record.lyrics.as_deref(), Some("Is this the real life?"));
        assert_eq!(record.youtube, None);
    }

    #[test]
    fn test_invalid_url_leaves_song_untouched() {
        let mut record = song();
        let patch = SongPatch {
            lyrics: Some("new".to_string()),
            youtube: Some("youtube.com/watch".to_string()),
            ..SongPatch::default()
        };

        let err = patch.apply(&mut record).unwrap_err();
        assert!(err.contains("YouTube"));
        assert_eq!(record, song());
    }

    #[test]
    fn test_patch_reads_camel_case() {
        let patch: SongPatch =
            serde_json::from_str(r#"{"imgUrl": "https://a.example/x.png", "timestamp": 1, "hash": "0"}"#)
                .unwrap();
        assert_eq!(patch.img_url.as_deref(), Some("https://a.example/x.png"));
        assert!(patch.lyrics.is_none());
    }

    #[test]
    fn test_view_uses_empty_strings() {
        let view = SongView::from(song());
        assert_eq!(view.img_url, "");
        assert_eq!(view.lyrics, "");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["titel"], "Bohemian Rhapsody");
        assert_eq!(json["artistName"], "Queen");
    }
}
