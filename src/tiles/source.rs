use crate::core::{
    config::{MirrorSelection, TileSourceConfig},
    constants::DEFAULT_TILE_TEMPLATE,
    geo::TileIndex,
};

/// Trait representing anything that can produce tile URLs for a given tile.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `tile`.
    fn url(&self, tile: &TileIndex) -> String;
}

/// Picks which of `mirror_count` identical hosts serves a tile. Purely a
/// load-spreading hint: every mirror returns the same image.
pub trait MirrorPolicy: Send + Sync {
    fn select(&self, tile: &TileIndex, mirror_count: usize) -> usize;
}

/// `y mod n`
#[derive(Debug, Clone, Copy, Default)]
pub struct RowMirrors;

impl MirrorPolicy for RowMirrors {
    fn select(&self, tile: &TileIndex, mirror_count: usize) -> usize {
        tile.y as usize % mirror_count.max(1)
    }
}

/// `(x + y) mod n`
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnRowSumMirrors;

impl MirrorPolicy for ColumnRowSumMirrors {
    fn select(&self, tile: &TileIndex, mirror_count: usize) -> usize {
        (tile.x as usize + tile.y as usize) % mirror_count.max(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedMirror(pub usize);

impl MirrorPolicy for FixedMirror {
    fn select(&self, _tile: &TileIndex, mirror_count: usize) -> usize {
        self.0.min(mirror_count.saturating_sub(1))
    }
}

impl From<MirrorSelection> for Box<dyn MirrorPolicy> {
    fn from(selection: MirrorSelection) -> Self {
        match selection {
            MirrorSelection::Row => Box::new(RowMirrors),
            MirrorSelection::ColumnRowSum => Box::new(ColumnRowSumMirrors),
            MirrorSelection::Fixed(i) => Box::new(FixedMirror(i)),
        }
    }
}

/// Tile source built from a `{mirror}/{z}/{x}/{y}` URL template.
pub struct TemplateTileSource {
    template: String,
    mirrors: Vec<String>,
    policy: Box<dyn MirrorPolicy>,
}

impl TemplateTileSource {
    pub fn new(template: impl Into<String>, mirrors: Vec<String>, policy: Box<dyn MirrorPolicy>) -> Self {
        Self {
            template: template.into(),
            mirrors,
            policy,
        }
    }

    pub fn from_config(config: &TileSourceConfig) -> Self {
        Self::new(
            config.url_template.clone(),
            config.mirrors.clone(),
            config.mirror_selection.into(),
        )
    }

    /// Swaps the mirror selection policy.
    pub fn with_policy(mut self, policy: Box<dyn MirrorPolicy>) -> Self {
        self.policy = policy;
        self
    }

    fn mirror(&self, tile: &TileIndex) -> &str {
        if self.mirrors.is_empty() {
            return "";
        }
        let idx = self.policy.select(tile, self.mirrors.len()) % self.mirrors.len();
        &self.mirrors[idx]
    }
}

impl Default for TemplateTileSource {
    fn default() -> Self {
        Self::from_config(&TileSourceConfig::default())
    }
}

impl TileSource for TemplateTileSource {
    fn url(&self, tile: &TileIndex) -> String {
        let mirror = self.mirror(tile);
        self.template
            .replace("{mirror}", mirror)
            .replace("{s}", mirror)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl std::fmt::Debug for TemplateTileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateTileSource")
            .field("template", &self.template)
            .field("mirrors", &self.mirrors)
            .finish()
    }
}

/// The stock basemap: the default template with mirrors `a`, `b`, `c` chosen by row.
pub fn default_basemap() -> TemplateTileSource {
    TemplateTileSource::new(
        DEFAULT_TILE_TEMPLATE,
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        Box::new(RowMirrors),
    )
}
