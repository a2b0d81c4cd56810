//! Material catalog and name canonicalisation
//!
//! Material names in 3DS files are typed by hand in a modelling tool and rarely
//! match the spelling the solid compiler expects. Lookups against the catalog
//! ignore case, but the canonical spelling is what ends up in generated files
//! because the compiler compares names case-sensitively.

/// Surface names known to the solid compiler, in catalog order
pub const KNOWN_MATERIALS: [&str; 31] = [
    "Concrete",
    "Pavement",
    "Grass",
    "Ice",
    "Metal",
    "Sand",
    "Dirt",
    "Turbo",
    "DirtRoad",
    "Rubber",
    "SlidingRubber",
    "Test",
    "Rock",
    "Water",
    "Wood",
    "Danger",
    "Asphalt",
    "WetDirtRoad",
    "WetAsphalt",
    "WetPavement",
    "WetGrass",
    "Snow",
    "ResonantMetal",
    "GolfBall",
    "GolfWall",
    "GolfGround",
    "Turbo2",
    "Bumper",
    "NotCollidable",
    "FreeWheeling",
    "TurboRoulette",
];

/// Result of canonicalising a material name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    /// Catalog spelling for known names, title-cased input otherwise
    pub name: String,
    /// Whether the name matched a catalog entry
    pub known: bool,
    /// Known name written with a different case than the catalog entry
    pub casing_mismatch: bool,
}

/// Immutable, ordered set of canonical material names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialCatalog {
    names: Vec<String>,
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::new(KNOWN_MATERIALS)
    }
}

impl MaterialCatalog {
    /// Create a catalog from canonical names
    ///
    /// Entries that only differ by case keep the first spelling.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            let name = name.trim();
            if name.is_empty() || unique.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                continue;
            }
            unique.push(name.to_string());
        }
        Self { names: unique }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Catalog spelling of `name`, ignoring case and surrounding whitespace
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Whether `name` matches a catalog entry
    pub fn is_known(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Canonicalise a raw material name
    ///
    /// Returns `None` for blank names.
    ///
    /// # Example
    ///
    /// ```
    /// use solidtree::catalog::MaterialCatalog;
    ///
    /// let catalog = MaterialCatalog::default();
    /// let wheel = catalog.canonicalize(" freewheeling ").unwrap();
    /// assert_eq!(wheel.name, "FreeWheeling");
    /// assert!(wheel.known && wheel.casing_mismatch);
    ///
    /// let lava = catalog.canonicalize("LAVA").unwrap();
    /// assert_eq!(lava.name, "Lava");
    /// assert!(!lava.known);
    /// ```
    pub fn canonicalize(&self, raw: &str) -> Option<Canonical> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(match self.lookup(trimmed) {
            Some(entry) => Canonical {
                name: entry.to_string(),
                known: true,
                casing_mismatch: entry != trimmed,
            },
            None => Canonical {
                name: title_case(trimmed),
                known: false,
                casing_mismatch: false,
            },
        })
    }
}

/// Upper-case the first character and lower-case the rest
fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
