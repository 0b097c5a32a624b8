//! File naming: the auto-numbering scheme and the namer seam.
//!
//! Naming is the one interactive concern in the original workflow, so it
//! sits behind a trait: the pipeline asks a [`VideoNamer`] for each file's
//! stem and stays prompt-free. The binary supplies a prompting
//! implementation; library users and tests supply their own.

use crate::error::Result;
use crate::types::SlideRecord;

/// Chosen name for one downloaded video
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoName {
    /// Filename stem, without directory or extension
    pub stem: String,
    /// Position in the auto-naming sequence (None under manual naming)
    pub sequence: Option<u32>,
}

/// Source of filenames for downloaded videos
///
/// Called once per successfully downloaded video, in scan order. The
/// pipeline only asks for a name after the byte stream has landed on disk,
/// so sequence counters advance exactly once per kept file.
pub trait VideoNamer {
    /// Produce the filename stem for the next downloaded video
    ///
    /// # Errors
    ///
    /// Implementations backed by operator input may fail with
    /// [`Error::Io`](crate::Error::Io).
    fn next_name(&mut self, slide: &SlideRecord) -> Result<VideoName>;
}

/// Sequential `<prefix>.<counter><suffix>` naming in scan order
///
/// With prefix `"2"` and suffix `" - Overview"`, three videos come out as
/// `2.1 - Overview`, `2.2 - Overview`, `2.3 - Overview`.
#[derive(Clone, Debug)]
pub struct AutoNamer {
    prefix: String,
    suffix: String,
    counter: u32,
}

impl AutoNamer {
    /// Create an auto-namer; the counter starts at 1
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            counter: 1,
        }
    }
}

impl VideoNamer for AutoNamer {
    fn next_name(&mut self, _slide: &SlideRecord) -> Result<VideoName> {
        let sequence = self.counter;
        self.counter += 1;
        Ok(VideoName {
            stem: format!("{}.{}{}", self.prefix, sequence, self.suffix),
            sequence: Some(sequence),
        })
    }
}
