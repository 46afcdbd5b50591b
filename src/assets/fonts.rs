use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CoverError, CoverResult};

/// Logical font slot a text line can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    /// Default face; always present.
    Main,
    /// Decorative display face (综艺体).
    Zongyi,
    /// Latin-script face.
    English,
    /// Italic override, applied when `font-style: italic`.
    Italic,
}

impl FromStr for FontRole {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "zongyi" => Ok(Self::Zongyi),
            "english" => Ok(Self::English),
            "italic" => Ok(Self::Italic),
            other => Err(CoverError::validation(format!(
                "unknown font role '{other}' (expected main, zongyi, english or italic)"
            ))),
        }
    }
}

impl std::fmt::Display for FontRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Main => "main",
            Self::Zongyi => "zongyi",
            Self::English => "english",
            Self::Italic => "italic",
        })
    }
}

/// Font file paths per role, as supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontTable {
    /// Main face. Auto-discovered from system fonts when absent.
    pub main: Option<PathBuf>,
    /// Decorative face; falls back to `main`.
    pub zongyi: Option<PathBuf>,
    /// Latin face; falls back to `main`.
    pub english: Option<PathBuf>,
    /// Italic face; when absent italic lines keep their regular face.
    pub italic: Option<PathBuf>,
}

impl FontTable {
    /// Path configured for `role`, ignoring empty strings.
    pub fn path_for(&self, role: FontRole) -> Option<&Path> {
        let p = match role {
            FontRole::Main => self.main.as_deref(),
            FontRole::Zongyi => self.zongyi.as_deref(),
            FontRole::English => self.english.as_deref(),
            FontRole::Italic => self.italic.as_deref(),
        };
        p.filter(|p| !p.as_os_str().is_empty())
    }
}

/// Lookup table from `font-family` names to font roles.
///
/// Replaces free-form substring matching: the `font-family` list is split on
/// commas and the first family listed here decides the role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRoles {
    entries: Vec<(String, FontRole)>,
}

impl Default for FamilyRoles {
    fn default() -> Self {
        Self {
            entries: vec![
                ("综艺体".to_string(), FontRole::Zongyi),
                ("MyCoolEnglishFont".to_string(), FontRole::English),
            ],
        }
    }
}

impl FamilyRoles {
    /// Empty table: every line uses the main face.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Map `family` to `role`, replacing an existing entry for the same name.
    pub fn insert(&mut self, family: impl Into<String>, role: FontRole) {
        let family = family.into();
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&family))
        {
            Some(entry) => entry.1 = role,
            None => self.entries.push((family, role)),
        }
    }

    /// Parse a `NAME=ROLE` assignment and insert it.
    pub fn insert_assignment(&mut self, assignment: &str) -> CoverResult<()> {
        let (name, role) = assignment.split_once('=').ok_or_else(|| {
            CoverError::validation(format!("expected NAME=ROLE, got '{assignment}'"))
        })?;
        let name = unquote(name);
        if name.is_empty() {
            return Err(CoverError::validation("family name must be non-empty"));
        }
        self.insert(name, role.parse()?);
        Ok(())
    }

    /// Role for a raw `font-family` value; [`FontRole::Main`] when nothing matches.
    pub fn role_for(&self, font_family: &str) -> FontRole {
        font_family
            .split(',')
            .map(unquote)
            .filter(|f| !f.is_empty())
            .find_map(|family| {
                self.entries
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(family))
                    .map(|(_, role)| *role)
            })
            .unwrap_or(FontRole::Main)
    }
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Where a loaded face came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    /// Read from a caller-supplied file.
    File(PathBuf),
    /// Discovered among installed system fonts.
    System {
        /// Family name of the discovered face.
        family: String,
    },
    /// Supplied in memory by the caller.
    Memory,
}

/// Font bytes ready for shaping and rasterization.
#[derive(Clone)]
pub struct LoadedFont {
    /// Stable identity within one [`FontLibrary`].
    pub id: u32,
    /// Where the bytes came from.
    pub origin: FontOrigin,
    /// Raw font file bytes (TTF/OTF/TTC).
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl LoadedFont {
    /// Wrap in-memory font bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            id: 0,
            origin: FontOrigin::Memory,
            bytes: Arc::new(bytes),
            index: 0,
        }
    }

    /// Read and validate a font file.
    pub fn from_path(path: &Path) -> CoverResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CoverError::font(format!("cannot read font '{}': {e}", path.display()))
        })?;
        if !contains_font_face(&bytes) {
            return Err(CoverError::font(format!(
                "'{}' contains no usable font face",
                path.display()
            )));
        }
        Ok(Self {
            id: 0,
            origin: FontOrigin::File(path.to_path_buf()),
            bytes: Arc::new(bytes),
            index: 0,
        })
    }
}

/// The set of faces one render may use, keyed by role.
#[derive(Clone, Debug)]
pub struct FontLibrary {
    main: LoadedFont,
    zongyi: Option<LoadedFont>,
    english: Option<LoadedFont>,
    italic: Option<LoadedFont>,
    next_id: u32,
}

impl FontLibrary {
    /// Library with only a main face.
    pub fn new(mut main: LoadedFont) -> Self {
        main.id = 0;
        Self {
            main,
            zongyi: None,
            english: None,
            italic: None,
            next_id: 1,
        }
    }

    /// Install `font` for `role` (replacing `main` when `role` is [`FontRole::Main`]).
    pub fn with_font(mut self, role: FontRole, mut font: LoadedFont) -> Self {
        font.id = self.next_id;
        self.next_id += 1;
        match role {
            FontRole::Main => self.main = font,
            FontRole::Zongyi => self.zongyi = Some(font),
            FontRole::English => self.english = Some(font),
            FontRole::Italic => self.italic = Some(font),
        }
        self
    }

    /// Load every face named in `table`.
    ///
    /// Unreadable faces are not fatal: they degrade to the platform default
    /// font (or to `main`) with a warning. Only the absence of any usable main
    /// face is an error.
    #[tracing::instrument(skip_all)]
    pub fn load(table: &FontTable) -> CoverResult<Self> {
        let mut system: Option<Option<LoadedFont>> = None;
        let mut system_font = || {
            system
                .get_or_insert_with(|| {
                    let found = system_default_font();
                    if let Some(font) = &found {
                        tracing::info!(origin = ?font.origin, "using platform default font");
                    }
                    found
                })
                .clone()
        };

        let main = match table.path_for(FontRole::Main) {
            Some(path) => match LoadedFont::from_path(path) {
                Ok(font) => Some(font),
                Err(err) => {
                    tracing::warn!(%err, "main font unavailable, falling back to platform default");
                    system_font()
                }
            },
            None => system_font(),
        };
        let main = main.ok_or_else(|| {
            CoverError::font("no main font given and no usable system font was found")
        })?;

        let mut lib = Self::new(main);
        for role in [FontRole::Zongyi, FontRole::English, FontRole::Italic] {
            let Some(path) = table.path_for(role) else {
                continue;
            };
            match LoadedFont::from_path(path) {
                Ok(font) => lib = lib.with_font(role, font),
                Err(err) if role == FontRole::Italic => {
                    tracing::warn!(%err, "italic font unavailable, italic lines keep their regular face");
                }
                Err(err) => {
                    tracing::warn!(%err, %role, "font unavailable, falling back to platform default");
                    if let Some(font) = system_font() {
                        lib = lib.with_font(role, font);
                    }
                }
            }
        }

        Ok(lib)
    }

    /// The main face.
    pub fn main(&self) -> &LoadedFont {
        &self.main
    }

    /// Face installed for `role`, without fallback.
    pub fn get(&self, role: FontRole) -> Option<&LoadedFont> {
        match role {
            FontRole::Main => Some(&self.main),
            FontRole::Zongyi => self.zongyi.as_ref(),
            FontRole::English => self.english.as_ref(),
            FontRole::Italic => self.italic.as_ref(),
        }
    }

    /// Face to use for a line asking for `role`, honoring the italic override.
    pub fn font_for(&self, role: FontRole, italic: bool) -> &LoadedFont {
        if italic && let Some(font) = &self.italic {
            return font;
        }
        match role {
            FontRole::Main | FontRole::Italic => &self.main,
            FontRole::Zongyi | FontRole::English => self.get(role).unwrap_or(&self.main),
        }
    }

    /// All installed faces, main first.
    pub fn iter(&self) -> impl Iterator<Item = (FontRole, &LoadedFont)> {
        [
            (FontRole::Main, Some(&self.main)),
            (FontRole::Zongyi, self.zongyi.as_ref()),
            (FontRole::English, self.english.as_ref()),
            (FontRole::Italic, self.italic.as_ref()),
        ]
        .into_iter()
        .filter_map(|(role, font)| font.map(|f| (role, f)))
    }
}

/// Families tried, in order, when no main font is supplied.
const PREFERRED_SYSTEM_FAMILIES: &[&str] = &[
    "PingFang SC",
    "STHeiti",
    "SimHei",
    "Hiragino Sans GB",
    "Noto Sans CJK SC",
    "Source Han Sans SC",
    "WenQuanYi Micro Hei",
];

/// Discover a platform font, preferring CJK-capable sans-serif faces.
pub fn system_default_font() -> Option<LoadedFont> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let mut families: Vec<usvg::fontdb::Family<'_>> = PREFERRED_SYSTEM_FAMILIES
        .iter()
        .copied()
        .map(usvg::fontdb::Family::Name)
        .collect();
    families.push(usvg::fontdb::Family::SansSerif);

    let query = usvg::fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
    let face = db.face(id)?;
    let family = face
        .families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| face.post_script_name.clone());
    let index = face.index;
    let bytes = db.with_face_data(id, |data, _| data.to_vec())?;

    Some(LoadedFont {
        id: 0,
        origin: FontOrigin::System { family },
        bytes: Arc::new(bytes),
        index,
    })
}

fn contains_font_face(bytes: &[u8]) -> bool {
    let mut db = usvg::fontdb::Database::new();
    db.load_font_data(bytes.to_vec());
    db.len() > 0
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
