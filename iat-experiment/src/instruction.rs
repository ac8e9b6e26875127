use std::io;
use std::path::{Path, PathBuf};

use iat_core::Key;
use iat_core::stimulus::is_image;

use crate::error::{Halt, SessionError};
use crate::frontend::{KeySource, Screen};

/// An instruction screen: a picture or plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Text(String),
    Image(PathBuf),
}

impl Instruction {
    /// Picks the variant from the asset string: image extensions mean a
    /// picture, anything else is shown as text.
    pub fn from_asset(asset: &str) -> Result<Self, SessionError> {
        if asset.is_empty() {
            Err(SessionError::EmptyInstruction)
        } else if is_image(asset) {
            Ok(Self::Image(PathBuf::from(asset)))
        } else {
            Ok(Self::Text(asset.to_string()))
        }
    }

    /// Text wins over an image when both are given.
    pub fn new(text: Option<&str>, image: Option<&Path>) -> Result<Self, SessionError> {
        match (text, image) {
            (Some(t), _) if !t.is_empty() => Ok(Self::Text(t.to_string())),
            (_, Some(p)) if !p.as_os_str().is_empty() => Ok(Self::Image(p.to_path_buf())),
            _ => Err(SessionError::EmptyInstruction),
        }
    }
}

/// Shows `instruction` until one of `stop_keys` is pressed.
///
/// Any key source answer containing `abort_key` aborts; this only happens
/// when the abort key is itself a stop key or the input source has run dry.
pub fn show_instruction<S, K>(
    screen: &mut S,
    keys: &mut K,
    instruction: &Instruction,
    stop_keys: &[Key],
    abort_key: &Key,
) -> Result<(), Halt>
where
    S: Screen + ?Sized,
    K: KeySource + ?Sized,
{
    screen.show_instruction(instruction);
    loop {
        let Some(pressed) = keys.wait_keys(stop_keys, None) else {
            continue;
        };
        if pressed.contains(abort_key) && !stop_keys.contains(abort_key) {
            return Err(Halt::Abort);
        }
        if pressed.iter().any(|k| stop_keys.contains(k)) {
            return Ok(());
        }
    }
}

/// Image files at the top level of `dir`, sorted by path.
pub fn list_images(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_image) {
            images.push(entry.path());
        }
    }
    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_kind_follows_extension() {
        assert_eq!(
            Instruction::from_asset("instructions/instr1.png").unwrap(),
            Instruction::Image(PathBuf::from("instructions/instr1.png"))
        );
        assert_eq!(
            Instruction::from_asset("Press space to begin").unwrap(),
            Instruction::Text("Press space to begin".to_string())
        );
        assert!(matches!(
            Instruction::from_asset(""),
            Err(SessionError::EmptyInstruction)
        ));
    }

    #[test]
    fn needs_text_or_image() {
        assert!(Instruction::new(None, None).is_err());
        assert!(Instruction::new(Some(""), None).is_err());
        assert_eq!(
            Instruction::new(Some("Hi"), Some(Path::new("a.png"))).unwrap(),
            Instruction::Text("Hi".to_string())
        );
        assert_eq!(
            Instruction::new(None, Some(Path::new("a.png"))).unwrap(),
            Instruction::Image(PathBuf::from("a.png"))
        );
    }

    #[test]
    fn lists_only_top_level_images() {
        let dir = std::env::temp_dir().join(format!("iat-images-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        for name in ["b.png", "a.JPG", "notes.txt", "nested/c.png"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let found = list_images(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found, [dir.join("a.JPG"), dir.join("b.png")]);
    }
}
