use std::{fs::File, io::BufReader, path::Path};

use crate::{
    assets::descriptor::SequenceDescriptor,
    config::length::CssLength,
    foundation::error::{ScrollSeqError, ScrollSeqResult},
};

fn default_container_height() -> String {
    "200vh".to_string()
}

/// Public inputs of a scroll-driven image sequence, as a host page would pass them.
///
/// JSON keys are camelCase: `imageFolder`, `totalFrames`, `className`, `containerHeight`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScrollImageProps {
    /// Folder holding `1.<ext> .. N.<ext>`.
    pub image_folder: String,
    /// Number of frames in the folder.
    pub total_frames: u32,
    /// Extra class names applied by the host to the pinned container.
    #[serde(default)]
    pub class_name: String,
    /// Height of the pinned container as a CSS length.
    #[serde(default = "default_container_height")]
    pub container_height: String,
}

impl ScrollImageProps {
    pub fn new(image_folder: impl Into<String>, total_frames: u32) -> Self {
        Self {
            image_folder: image_folder.into(),
            total_frames,
            class_name: String::new(),
            container_height: default_container_height(),
        }
    }

    pub fn from_reader<R: std::io::Read>(r: R) -> ScrollSeqResult<Self> {
        let props: Self = serde_json::from_reader(r)
            .map_err(|e| ScrollSeqError::serde(format!("parse props JSON: {e}")))?;
        props.validate()?;
        Ok(props)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ScrollSeqResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollSeqError::validation(format!("open props JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> ScrollSeqResult<()> {
        if self.image_folder.trim().is_empty() {
            return Err(ScrollSeqError::validation("imageFolder must be non-empty"));
        }
        if self.total_frames == 0 {
            return Err(ScrollSeqError::validation("totalFrames must be >= 1"));
        }
        self.container_height_length()?;
        Ok(())
    }

    pub fn container_height_length(&self) -> ScrollSeqResult<CssLength> {
        CssLength::parse(&self.container_height)
    }

    /// Build the descriptor for frames stored with extension `ext`.
    pub fn descriptor(&self, ext: &str) -> SequenceDescriptor {
        SequenceDescriptor::new(self.image_folder.clone(), self.total_frames, ext)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/props.rs"]
mod tests;
