use crate::metadata::VorbisComment;
use std::fmt;
use tracing::trace;

const LOG_TARGET: &str = "flac_bridge::metadata::tag";

/// Tag fields the session keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    Artist,
    Album,
    AlbumArtist,
    Title,
    Track,
    Disc,
    Genre,
    Date,
    Composer,
    Performer,
    Comment,
    MusicBrainzTrackId,
    MusicBrainzAlbumId,
    MusicBrainzArtistId,
    MusicBrainzAlbumArtistId,
}

impl TagType {
    /// Maps a comment field name onto a tag type, ignoring ASCII case.
    pub fn from_comment_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_uppercase().as_str() {
            "ARTIST" => TagType::Artist,
            "ALBUM" => TagType::Album,
            "ALBUMARTIST" | "ALBUM ARTIST" => TagType::AlbumArtist,
            "TITLE" => TagType::Title,
            "TRACKNUMBER" => TagType::Track,
            "DISCNUMBER" => TagType::Disc,
            "GENRE" => TagType::Genre,
            "DATE" => TagType::Date,
            "COMPOSER" => TagType::Composer,
            "PERFORMER" => TagType::Performer,
            "COMMENT" | "DESCRIPTION" => TagType::Comment,
            "MUSICBRAINZ_TRACKID" => TagType::MusicBrainzTrackId,
            "MUSICBRAINZ_ALBUMID" => TagType::MusicBrainzAlbumId,
            "MUSICBRAINZ_ARTISTID" => TagType::MusicBrainzArtistId,
            "MUSICBRAINZ_ALBUMARTISTID" => TagType::MusicBrainzAlbumArtistId,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            TagType::Artist => "Artist",
            TagType::Album => "Album",
            TagType::AlbumArtist => "AlbumArtist",
            TagType::Title => "Title",
            TagType::Track => "Track",
            TagType::Disc => "Disc",
            TagType::Genre => "Genre",
            TagType::Date => "Date",
            TagType::Composer => "Composer",
            TagType::Performer => "Performer",
            TagType::Comment => "Comment",
            TagType::MusicBrainzTrackId => "MUSICBRAINZ_TRACKID",
            TagType::MusicBrainzAlbumId => "MUSICBRAINZ_ALBUMID",
            TagType::MusicBrainzArtistId => "MUSICBRAINZ_ARTISTID",
            TagType::MusicBrainzAlbumArtistId => "MUSICBRAINZ_ALBUMARTISTID",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagItem {
    pub kind: TagType,
    pub value: String,
}

/// Song metadata collected from comment blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub duration_seconds: Option<f64>,
    pub items: Vec<TagItem>,
}

impl Tag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, kind: TagType, value: impl Into<String>) {
        self.items.push(TagItem {
            kind,
            value: value.into(),
        });
    }

    /// First value stored for `kind`.
    pub fn get(&self, kind: TagType) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.kind == kind)
            .map(|item| item.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.duration_seconds.is_none()
    }

    /// Appends every recognised, non-empty comment field. Existing items
    /// are kept. Returns how many items were added.
    pub fn merge_comments(&mut self, comment: &VorbisComment) -> usize {
        let before = self.items.len();
        for (name, value) in &comment.comments {
            match TagType::from_comment_name(name) {
                Some(kind) if !value.is_empty() => self.add_item(kind, value.clone()),
                _ => trace!(target: LOG_TARGET, "Skipping comment field {:?}", name),
            }
        }
        self.items.len() - before
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(seconds) = self.duration_seconds {
            writeln!(f, "Time: {:.3}", seconds)?;
        }
        for item in &self.items {
            writeln!(f, "{}: {}", item.kind.name(), item.value)?;
        }
        Ok(())
    }
}
