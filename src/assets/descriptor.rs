use crate::foundation::core::FrameIndex;

/// Immutable description of one numbered frame sequence.
///
/// Frames live at `{folder}/{index + 1}.{suffix}`: file names are one-based while
/// [`FrameIndex`] is zero-based.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SequenceDescriptor {
    folder: String,
    frame_count: u32,
    suffix: String,
}

impl SequenceDescriptor {
    pub fn new(folder: impl Into<String>, frame_count: u32, suffix: impl Into<String>) -> Self {
        let folder = folder.into();
        let folder = folder.trim_end_matches(['/', '\\']).to_string();
        let suffix = suffix.into();
        let suffix = suffix.trim_start_matches('.').to_string();
        Self {
            folder,
            frame_count,
            suffix,
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Source path for `index`; indices past the end are still formatted.
    pub fn path_for(&self, index: FrameIndex) -> String {
        format!("{}/{}.{}", self.folder, index.file_number(), self.suffix)
    }

    pub fn indices(&self) -> impl ExactSizeIterator<Item = FrameIndex> + use<> {
        (0..self.frame_count).map(FrameIndex)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/descriptor.rs"]
mod tests;
