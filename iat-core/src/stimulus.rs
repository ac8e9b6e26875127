use std::collections::BTreeMap;
use std::path::Path;

use crate::mapping::Label;
use crate::Atom;

/// File extensions that mark an asset path as an image.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "PNG", "JPG", "JPEG"];

/// Returns true if the text after the last `.` is a known image extension.
pub fn is_image(asset: &str) -> bool {
    let ext = asset.rsplit('.').next().unwrap_or(asset);
    IMAGE_EXTENSIONS.contains(&ext)
}

/// One category-tagged item of the stimulus table.
///
/// Equality covers the whole record, extra columns included, so two rows
/// that only differ in an unused column are distinct stimuli.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stimulus {
    pub content: Atom,
    pub response: Label,
    pub extra: BTreeMap<String, String>,
}

impl Stimulus {
    pub fn new(content: &str, response: &str) -> Self {
        Self {
            content: Atom::from(content),
            response: Label::from(response),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, column: &str, value: &str) -> Self {
        self.extra.insert(column.to_string(), value.to_string());
        self
    }

    /// Content that names an image file is presented as a picture.
    pub fn is_image(&self) -> bool {
        is_image(&self.content)
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.is_image().then(|| Path::new(&*self.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extension_membership() {
        assert!(is_image("instructions/instr1.png"));
        assert!(is_image("face.JPEG"));
        assert!(!is_image("face.Jpeg"));
        assert!(!is_image("Press space to continue."));
        assert!(!is_image("archive.png.txt"));
    }

    #[test]
    fn equality_covers_extra_columns() {
        let a = Stimulus::new("me", "Self");
        let b = Stimulus::new("me", "Self").with_extra("source", "list-b");
        assert_ne!(a, b);
        assert_eq!(a, Stimulus::new("me", "Self"));
    }

    #[test]
    fn image_stimulus_exposes_path() {
        let s = Stimulus::new("img/lab.jpg", "Science");
        assert_eq!(s.image_path(), Some(Path::new("img/lab.jpg")));
        assert_eq!(Stimulus::new("lab", "Science").image_path(), None);
    }
}
