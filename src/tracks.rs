use std::fmt;

use crate::language::Language;

/// Codec name fragments identifying bitmap subtitle formats
const IMAGE_CODEC_MARKERS: &[&str] = &["sup", "hdmv", "pgs", "vobsub", "dvbsub", "dvd_subtitle"];

/// One subtitle track as reported by the container inspection tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub id: u64,
    pub codec: String,
    pub language: Option<String>,
    pub name: Option<String>,
}

impl TrackDescriptor {
    pub fn is_image_based(&self) -> bool {
        let codec = self.codec.to_lowercase();
        IMAGE_CODEC_MARKERS.iter().any(|marker| codec.contains(marker))
    }

    pub fn has_language(&self, language: &Language) -> bool {
        self.language.as_deref().is_some_and(|tag| language.matches(tag))
    }
}

impl fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} codec={} language={}",
            self.id,
            self.codec,
            self.language.as_deref().unwrap_or("und")
        )?;
        if let Some(name) = &self.name {
            write!(f, " name=\"{}\"", name)?;
        }
        Ok(())
    }
}

/// Decision taken for one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A target-language track is already embedded
    AlreadySatisfied,
    /// Extract this text-based source-language track
    Extract(TrackDescriptor),
    /// Source-language tracks exist but are all bitmap-based
    DeferImageBased(Vec<TrackDescriptor>),
    /// No source-language track at all
    NoSource,
}

/// Pick the subtitle track to translate.
///
/// A target-language track anywhere short-circuits the decision. Otherwise the
/// first text-based source-language track in descriptor order wins.
pub fn select_track(tracks: &[TrackDescriptor], source: &Language, target: &Language) -> Selection {
    if tracks.iter().any(|track| track.has_language(target)) {
        return Selection::AlreadySatisfied;
    }

    let mut image_tracks = Vec::new();
    for track in tracks.iter().filter(|track| track.has_language(source)) {
        if track.is_image_based() {
            image_tracks.push(track.clone());
        } else {
            return Selection::Extract(track.clone());
        }
    }

    if image_tracks.is_empty() {
        Selection::NoSource
    } else {
        Selection::DeferImageBased(image_tracks)
    }
}
