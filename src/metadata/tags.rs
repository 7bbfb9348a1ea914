//! Metadata extraction from embedded tags.
//!
//! Uses the lofty crate, so no external tool is needed. Vorbis comments in
//! FLAC files map ALBUMARTIST/ARTIST/COMPOSER onto lofty's generic item keys.

use std::path::Path;

use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey};

use super::{AlbumMetadata, MetadataError, MetadataProvider, first_present};

/// Reads album metadata from the file's primary tag.
pub struct TagReader;

impl MetadataProvider for TagReader {
    fn extract(&self, path: &Path) -> Result<AlbumMetadata, MetadataError> {
        tracing::debug!("Reading tags from: {:?}", path);

        let tagged_file = Probe::open(path)
            .map_err(|e| MetadataError::Tags(e.to_string()))?
            .read()
            .map_err(|e| MetadataError::Tags(e.to_string()))?;

        // Get the primary tag, or fall back to the first available tag
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .ok_or_else(|| MetadataError::NoTrack(path.to_path_buf()))?;

        let album = tag.album();
        let title = tag.title();

        Ok(AlbumMetadata {
            album: first_present([album.as_deref(), title.as_deref()]),
            performer: first_present([
                tag.get_string(&ItemKey::AlbumArtist),
                tag.get_string(&ItemKey::TrackArtist),
                tag.get_string(&ItemKey::Composer),
            ]),
        })
    }
}
