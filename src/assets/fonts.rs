use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{ThumbnailError, ThumbnailResult};

/// Weight threshold above which text uses the bold face.
pub const BOLD_THRESHOLD: u16 = 600;

/// Families tried, in order, when fonts come from the host system.
const SYSTEM_SANS_CANDIDATES: &[&str] = &[
    "Inter",
    "Proxima Nova",
    "Helvetica Neue",
    "Arial",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Roboto",
    "Open Sans",
    "Cantarell",
    "FreeSans",
];

/// One loaded font face.
#[derive(Clone)]
pub struct FontFace {
    /// Family name as reported by the font itself.
    pub family: String,
    /// OS/2 weight class.
    pub weight: u16,
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl FontFace {
    fn probe(bytes: Vec<u8>, label: &str) -> ThumbnailResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes.clone());
        let face = db.faces().next().ok_or_else(|| {
            ThumbnailError::config(format!("{label} font bytes contain no parsable face"))
        })?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ThumbnailError::config(format!("{label} font has no family name")))?;
        Ok(Self {
            family,
            weight: face.weight.0,
            bytes: Arc::new(bytes),
        })
    }
}

/// Process-wide, immutable font assets: a regular and a bold face plus the `fontdb` database the
/// rasterizer resolves SVG text against.
#[derive(Clone, Debug)]
pub struct FontSet {
    regular: FontFace,
    bold: FontFace,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl FontSet {
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> ThumbnailResult<Self> {
        let regular = FontFace::probe(regular, "regular")?;
        let bold = FontFace::probe(bold, "bold")?;

        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(regular.bytes.as_ref().clone());
        db.load_font_data(bold.bytes.as_ref().clone());
        db.set_sans_serif_family(regular.family.clone());

        tracing::debug!(
            regular_family = %regular.family,
            regular_weight = regular.weight,
            bold_family = %bold.family,
            bold_weight = bold.weight,
            "loaded font set"
        );

        Ok(Self {
            regular,
            bold,
            fontdb: Arc::new(db),
        })
    }

    pub fn from_files(regular: &Path, bold: &Path) -> ThumbnailResult<Self> {
        let r = std::fs::read(regular)
            .with_context(|| format!("read regular font '{}'", regular.display()))?;
        let b =
            std::fs::read(bold).with_context(|| format!("read bold font '{}'", bold.display()))?;
        Self::from_bytes(r, b)
    }

    /// Pick a regular and a bold sans-serif face from the fonts installed on the host.
    pub fn from_system() -> ThumbnailResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let usable = |f: &&usvg::fontdb::FaceInfo| {
            f.index == 0 && f.style == usvg::fontdb::Style::Normal
        };

        let mut chosen = None;
        for name in SYSTEM_SANS_CANDIDATES {
            let faces: Vec<&usvg::fontdb::FaceInfo> = db
                .faces()
                .filter(usable)
                .filter(|f| f.families.iter().any(|(n, _)| n == name))
                .collect();
            if let Some(pair) = pick_regular_and_bold(&faces) {
                chosen = Some(pair);
                break;
            }
        }
        if chosen.is_none() {
            let faces: Vec<&usvg::fontdb::FaceInfo> = db.faces().filter(usable).collect();
            if let Some(first) = faces.first() {
                let family = first.families.first().map(|(n, _)| n.clone());
                let same_family: Vec<&usvg::fontdb::FaceInfo> = faces
                    .iter()
                    .copied()
                    .filter(|f| f.families.first().map(|(n, _)| n.clone()) == family)
                    .collect();
                chosen = pick_regular_and_bold(&same_family);
            }
        }

        let (regular_id, bold_id) =
            chosen.ok_or_else(|| ThumbnailError::config("no usable system fonts found"))?;
        let read = |id| {
            db.with_face_data(id, |data, _index| data.to_vec())
                .ok_or_else(|| ThumbnailError::config("system font data is unavailable"))
        };
        Self::from_bytes(read(regular_id)?, read(bold_id)?)
    }

    pub fn regular(&self) -> &FontFace {
        &self.regular
    }

    pub fn bold(&self) -> &FontFace {
        &self.bold
    }

    /// Face used for a CSS-style weight.
    pub fn face_for_weight(&self, weight: u16) -> &FontFace {
        if weight >= BOLD_THRESHOLD {
            &self.bold
        } else {
            &self.regular
        }
    }

    pub fn fontdb(&self) -> Arc<usvg::fontdb::Database> {
        Arc::clone(&self.fontdb)
    }

    /// Resolver that honours the requested family/weight and otherwise falls back to any loaded
    /// face, so text never silently disappears.
    pub fn svg_font_resolver() -> usvg::FontResolver<'static> {
        use usvg::FontResolver;

        FontResolver {
            select_font: Box::new(|font, fontdb| {
                let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
                for family in font.families() {
                    families.push(match family {
                        usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                        usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                        usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                        usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                        usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                        usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                    });
                }
                families.push(usvg::fontdb::Family::SansSerif);

                let query = usvg::fontdb::Query {
                    families: &families,
                    weight: usvg::fontdb::Weight(font.weight()),
                    ..Default::default()
                };

                if let Some(id) = fontdb.query(&query) {
                    return Some(id);
                }
                fontdb.faces().next().map(|f| f.id)
            }),
            select_fallback: FontResolver::default_fallback_selector(),
        }
    }
}

fn pick_regular_and_bold(
    faces: &[&usvg::fontdb::FaceInfo],
) -> Option<(usvg::fontdb::ID, usvg::fontdb::ID)> {
    let closest = |target: i32| {
        faces
            .iter()
            .min_by_key(|f| ((f.weight.0 as i32 - target).abs(), f.weight.0))
            .map(|f| f.id)
    };
    Some((closest(400)?, closest(700)?))
}

/// DejaVu Sans regular and bold, vendored under `tests/data/fonts`.
#[cfg(test)]
pub(crate) fn fixture_font_set() -> FontSet {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts");
    FontSet::from_files(&dir.join("DejaVuSans.ttf"), &dir.join("DejaVuSans-Bold.ttf"))
        .expect("vendored test fonts")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
