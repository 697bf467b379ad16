use std::{collections::HashMap, path::PathBuf, sync::Arc};

use crate::font_desc::{FontDescriptor, FontStyle, FontWeight};

/// Font database plus a cache of loaded rasterizer faces.
///
/// `fontdb` tracks the available faces; `fontdue` instances are created
/// lazily the first time a face is actually drawn with and kept for the
/// lifetime of the store.
pub struct FontStore {
    db: fontdb::Database,
    loaded: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
}

impl Default for FontStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            db: fontdb::Database::new(),
            loaded: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
    }

    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.db.load_font_file(path)
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Direct access to the underlying database (generic family
    /// configuration, face enumeration, ...).
    pub fn db(&self) -> &fontdb::Database {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut fontdb::Database {
        &mut self.db
    }
}

/// Descriptor-driven queries.
impl FontStore {
    /// Finds the face that best matches the descriptor and returns it
    /// loaded.
    ///
    /// The descriptor's family list is tried first (comma-separated,
    /// quotes stripped, generic names mapped), then a sans-serif fallback,
    /// then any face in the database at all.
    pub fn query_descriptor(
        &mut self,
        desc: &FontDescriptor,
    ) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        let mut families: Vec<fontdb::Family<'_>> = desc
            .family
            .split(',')
            .map(|name| name.trim().trim_matches(['"', '\'']))
            .filter(|name| !name.is_empty())
            .map(|name| match name {
                "serif" => fontdb::Family::Serif,
                "sans-serif" => fontdb::Family::SansSerif,
                "cursive" => fontdb::Family::Cursive,
                "fantasy" => fontdb::Family::Fantasy,
                "monospace" => fontdb::Family::Monospace,
                other => fontdb::Family::Name(other),
            })
            .collect();
        families.push(fontdb::Family::SansSerif);

        let query = fontdb::Query {
            families: &families,
            weight: weight_of(desc.weight),
            stretch: fontdb::Stretch::Normal,
            style: style_of(desc.style),
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|face| face.id))?;
        self.font(id).map(|font| (id, font))
    }

    /// Retrieves a loaded face by ID, loading it on first use.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let result = self.db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match result {
                    Ok(font) => {
                        let loaded: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(loaded))
                    }
                    Err(e) => {
                        log::error!("failed to load font face (id: {id:?}): {e}");
                        None
                    }
                }
            }
        }
    }
}

fn weight_of(weight: Option<FontWeight>) -> fontdb::Weight {
    match weight {
        Some(FontWeight::Bold) => fontdb::Weight::BOLD,
        Some(FontWeight::Bolder) => fontdb::Weight::EXTRA_BOLD,
        Some(FontWeight::Lighter) => fontdb::Weight::LIGHT,
        Some(FontWeight::Weight(n)) => fontdb::Weight(n),
        _ => fontdb::Weight::NORMAL,
    }
}

fn style_of(style: Option<FontStyle>) -> fontdb::Style {
    match style {
        Some(FontStyle::Italic) => fontdb::Style::Italic,
        Some(FontStyle::Oblique) => fontdb::Style::Oblique,
        _ => fontdb::Style::Normal,
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_and_style_mapping() {
        assert_eq!(weight_of(Some(FontWeight::Bold)), fontdb::Weight::BOLD);
        assert_eq!(weight_of(Some(FontWeight::Weight(300))), fontdb::Weight(300));
        assert_eq!(weight_of(None), fontdb::Weight::NORMAL);
        assert_eq!(style_of(Some(FontStyle::Italic)), fontdb::Style::Italic);
        assert_eq!(style_of(Some(FontStyle::Inherit)), fontdb::Style::Normal);
    }

    #[test]
    fn query_on_empty_store_returns_none() {
        let mut store = FontStore::new();
        let desc = FontDescriptor::parse("16px Arial");
        assert!(store.query_descriptor(&desc).is_none());
    }
}
