use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ahash::RandomState;
use compact_str::CompactString;

use super::traits::GlyphRasterizer;
use crate::error::FontLoadError;

/// Stable handle to a registered font; indexes never change once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(u32);

impl FontId {
    pub fn index(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font#{}", self.0)
    }
}

/// A named face, immutable after registration.
pub struct Font<F> {
    name: CompactString,
    path: PathBuf,
    face_index: u32,
    face: F,
}

impl<F> Font<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn face(&self) -> &F {
        &self.face
    }
}

/// Maps caller-chosen names to loaded faces.
///
/// Lookups take `&self` and registration takes `&mut self`, so reads are
/// never concurrent with a registration in progress.
pub struct FontRegistry<F> {
    fonts: Vec<Font<F>>,
    by_name: HashMap<CompactString, FontId, RandomState>,
}

impl<F> FontRegistry<F> {
    pub fn new() -> Self {
        Self {
            fonts: Vec::new(),
            by_name: HashMap::default(),
        }
    }

    /// Loads face `face_index` of `path` under `name`.
    ///
    /// Fails without side effects when the name is taken or the face cannot be loaded.
    pub fn register<R>(
        &mut self,
        rasterizer: &mut R,
        name: &str,
        path: &Path,
        face_index: u32,
    ) -> Result<FontId, FontLoadError>
    where
        R: GlyphRasterizer<Face = F>,
    {
        if self.by_name.contains_key(name) {
            return Err(FontLoadError::DuplicateName(name.into()));
        }

        let face = rasterizer.load_face(path, face_index)?;
        let id = FontId(self.fonts.len() as u32);
        let name = CompactString::from(name);

        self.fonts.push(Font {
            name: name.clone(),
            path: path.to_path_buf(),
            face_index,
            face,
        });
        log::debug!("Registered {} as {} ({}:{})", name, id, path.display(), face_index);
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<FontId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: FontId) -> Option<&Font<F>> {
        self.fonts.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl<F> Default for FontRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaceError;
    use crate::font::synthetic::{SyntheticFace, SyntheticRasterizer};

    fn setup() -> (FontRegistry<SyntheticFace>, SyntheticRasterizer) {
        let rasterizer = SyntheticRasterizer::new()
            .with_face("fonts/sans.ttf", 1)
            .with_face("fonts/family.ttc", 3);
        (FontRegistry::new(), rasterizer)
    }

    #[test]
    fn test_register_and_has() {
        let (mut registry, mut r) = setup();
        let id = registry
            .register(&mut r, "sans", Path::new("fonts/sans.ttf"), 0)
            .unwrap();
        assert!(registry.has("sans"));
        assert!(!registry.has("serif"));
        assert_eq!(registry.id("sans"), Some(id));
        assert_eq!(registry.get(id).unwrap().name(), "sans");
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let (mut registry, mut r) = setup();
        let first = registry
            .register(&mut r, "sans", Path::new("fonts/sans.ttf"), 0)
            .unwrap();
        let second = registry.register(&mut r, "sans", Path::new("fonts/family.ttc"), 2);
        assert!(matches!(second, Err(FontLoadError::DuplicateName(ref n)) if n == "sans"));

        let font = registry.get(first).unwrap();
        assert_eq!(font.path(), Path::new("fonts/sans.ttf"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_bad_face_index() {
        let (mut registry, mut r) = setup();
        let result = registry.register(&mut r, "bold", Path::new("fonts/family.ttc"), 3);
        assert!(matches!(
            result,
            Err(FontLoadError::Face(FaceError::IndexOutOfRange { index: 3, .. }))
        ));
        assert!(!registry.has("bold"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let (mut registry, mut r) = setup();
        let result = registry.register(&mut r, "mono", Path::new("fonts/mono.ttf"), 0);
        assert!(matches!(result, Err(FontLoadError::Face(FaceError::Io { .. }))));
        assert!(!registry.has("mono"));
    }

    #[test]
    fn test_ids_are_sequential() {
        let (mut registry, mut r) = setup();
        let a = registry
            .register(&mut r, "a", Path::new("fonts/family.ttc"), 0)
            .unwrap();
        let b = registry
            .register(&mut r, "b", Path::new("fonts/family.ttc"), 1)
            .unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(registry.get(b).unwrap().face_index(), 1);
    }
}
