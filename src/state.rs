//! Application state - single source of truth

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::filter;
use crate::sprite::Sprite;

pub const DEFAULT_PAGE_LIMIT: u32 = 150;
pub const SPINNER_TICK_MS: u64 = 90;

/// Width and height of a single card in terminal cells.
pub const CARD_WIDTH: u16 = 24;
pub const CARD_HEIGHT: u16 = 6;

/// Rows taken by the header and footer around the card grid.
pub const HEADER_ROWS: u16 = 3;
pub const FOOTER_ROWS: u16 = 3;

/// Entry of the paged collection listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub name: String,
    pub url: String,
}

impl Summary {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Numeric identifier carried by the last-but-one segment of `url`.
    pub fn id(&self) -> Option<u32> {
        id_from_url(&self.url)
    }

    /// Path parameter used to fetch this entry's detail record.
    pub fn detail_key(&self) -> String {
        match self.id() {
            Some(id) => id.to_string(),
            None => self.name.clone(),
        }
    }
}

/// Extract the numeric id from a resource url such as `.../pokemon/25/`.
pub fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpriteUrls {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    pub artwork: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Stat {
    pub name: String,
    pub base_stat: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
}

/// Full record returned by the single-resource endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detail {
    pub id: u32,
    pub name: String,
    /// Decimetres.
    pub height: u32,
    /// Hectograms.
    pub weight: u32,
    pub base_experience: Option<u32>,
    pub sprites: SpriteUrls,
    pub types: Vec<String>,
    pub stats: Vec<Stat>,
    pub abilities: Vec<Ability>,
}

impl Detail {
    /// Official artwork, falling back to the default front sprite.
    pub fn artwork_url(&self) -> Option<&str> {
        self.sprites
            .artwork
            .as_deref()
            .or(self.sprites.front_default.as_deref())
    }
}

/// Per-card detail lifecycle: Loading -> Loaded / Failed.
pub type ItemState = DataResource<Detail>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SpriteSlot {
    Artwork,
    Normal,
    Shiny,
}

impl SpriteSlot {
    pub const ALL: [SpriteSlot; 3] = [SpriteSlot::Artwork, SpriteSlot::Normal, SpriteSlot::Shiny];

    pub fn task_name(self) -> &'static str {
        match self {
            SpriteSlot::Artwork => "sprite_artwork",
            SpriteSlot::Normal => "sprite_normal",
            SpriteSlot::Shiny => "sprite_shiny",
        }
    }

    /// Longest side, in pixels, the decoded image is scaled down to.
    pub fn max_side(self) -> u32 {
        match self {
            SpriteSlot::Artwork => 64,
            SpriteSlot::Normal | SpriteSlot::Shiny => 32,
        }
    }
}

/// The detail record shown in the overlay, with its images.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Selection {
    pub detail: Detail,
    pub artwork: DataResource<Sprite>,
    pub normal: DataResource<Sprite>,
    pub shiny: DataResource<Sprite>,
}

impl Selection {
    pub fn new(detail: Detail) -> Self {
        Self {
            detail,
            artwork: DataResource::Empty,
            normal: DataResource::Empty,
            shiny: DataResource::Empty,
        }
    }

    pub fn sprite_url(&self, slot: SpriteSlot) -> Option<String> {
        let url = match slot {
            SpriteSlot::Artwork => self.detail.artwork_url(),
            SpriteSlot::Normal => self.detail.sprites.front_default.as_deref(),
            SpriteSlot::Shiny => self.detail.sprites.front_shiny.as_deref(),
        };
        url.map(str::to_string)
    }

    pub fn sprite(&self, slot: SpriteSlot) -> &DataResource<Sprite> {
        match slot {
            SpriteSlot::Artwork => &self.artwork,
            SpriteSlot::Normal => &self.normal,
            SpriteSlot::Shiny => &self.shiny,
        }
    }

    pub fn sprite_mut(&mut self, slot: SpriteSlot) -> &mut DataResource<Sprite> {
        match slot {
            SpriteSlot::Artwork => &mut self.artwork,
            SpriteSlot::Normal => &mut self.normal,
            SpriteSlot::Shiny => &mut self.shiny,
        }
    }

    pub fn sprites_loading(&self) -> bool {
        SpriteSlot::ALL
            .iter()
            .any(|slot| self.sprite(*slot).is_loading())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub page: PageRequest,

    /// Load phase and full list.
    pub catalog: DataResource<Vec<Summary>>,
    /// Indices into the full list matching the search term.
    pub filtered: Vec<usize>,
    pub search: SearchState,

    /// Presenter state of every visible card, keyed by summary name.
    pub items: HashMap<String, ItemState>,
    /// Mount generation of every entry in `items`. Detail results carry the
    /// generation they were requested for and only apply to that mount.
    #[serde(default)]
    pub mounts: HashMap<String, u64>,
    #[serde(default)]
    pub next_mount: u64,
    /// Card under the keyboard cursor, as an index into `filtered`.
    pub cursor: usize,

    /// Detail shown in the overlay. The overlay is open iff this is set.
    pub selection: Option<Selection>,

    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PageRequest::default())
    }
}

impl AppState {
    pub fn new(page: PageRequest) -> Self {
        Self {
            terminal_size: (80, 24),
            page,
            catalog: DataResource::Empty,
            filtered: Vec::new(),
            search: SearchState::default(),
            items: HashMap::new(),
            mounts: HashMap::new(),
            next_mount: 0,
            cursor: 0,
            selection: None,
            tick: 0,
        }
    }

    pub fn summaries(&self) -> &[Summary] {
        self.catalog.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn visible(&self) -> impl Iterator<Item = &Summary> + '_ {
        let all = self.summaries();
        self.filtered.iter().filter_map(move |idx| all.get(*idx))
    }

    pub fn visible_entry(&self, index: usize) -> Option<&Summary> {
        self.filtered
            .get(index)
            .and_then(|idx| self.summaries().get(*idx))
    }

    pub fn item(&self, name: &str) -> Option<&ItemState> {
        self.items.get(name)
    }

    pub fn mount_of(&self, name: &str) -> Option<u64> {
        self.mounts.get(name).copied()
    }

    /// Record the terminal size the grid is laid out for. Returns whether it changed.
    pub fn set_terminal_size(&mut self, width: u16, height: u16) -> bool {
        if self.terminal_size == (width, height) {
            return false;
        }
        self.terminal_size = (width, height);
        true
    }

    pub fn overlay_open(&self) -> bool {
        self.selection.is_some()
    }

    /// Recompute the filtered list from the full list and search term.
    pub fn rebuild_filtered(&mut self) {
        self.filtered = filter::matching_indices(self.summaries(), &self.search.query);
        self.clamp_cursor();
    }

    pub fn clamp_cursor(&mut self) {
        if self.filtered.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.filtered.len() {
            self.cursor = self.filtered.len() - 1;
        }
    }

    pub fn grid_columns(&self) -> usize {
        grid_columns(self.terminal_size.0)
    }

    pub fn grid_visible_rows(&self) -> usize {
        grid_rows(self.terminal_size.1.saturating_sub(HEADER_ROWS + FOOTER_ROWS))
    }

    pub fn loading_count(&self) -> usize {
        self.items.values().filter(|item| item.is_loading()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.items.values().filter(|item| item.is_failed()).count()
    }

    pub fn anything_loading(&self) -> bool {
        self.catalog.is_loading()
            || self.items.values().any(|item| item.is_loading())
            || self
                .selection
                .as_ref()
                .map(Selection::sprites_loading)
                .unwrap_or(false)
    }
}

/// Number of card columns that fit in `width` cells.
pub fn grid_columns(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

/// Number of card rows that fit in `height` cells.
pub fn grid_rows(height: u16) -> usize {
    (height / CARD_HEIGHT).max(1) as usize
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let phase = if self.catalog.is_loading() {
            "loading".to_string()
        } else if let Some(error) = self.catalog.error() {
            format!("failed: {error}")
        } else if self.catalog.is_loaded() {
            "ready".to_string()
        } else {
            "idle".to_string()
        };
        vec![
            DebugSection::new("Catalog")
                .entry("phase", ron_string(&phase))
                .entry("page", ron_string(&self.page))
                .entry("total", ron_string(&self.summaries().len()))
                .entry("filtered", ron_string(&self.filtered.len()))
                .entry("cursor", ron_string(&self.cursor)),
            DebugSection::new("Search")
                .entry("query", ron_string(&self.search.query))
                .entry("active", ron_string(&self.search.active)),
            DebugSection::new("Selection")
                .entry(
                    "detail",
                    ron_string(&self.selection.as_ref().map(|s| s.detail.name.clone())),
                )
                .entry("overlay_open", ron_string(&self.overlay_open())),
            DebugSection::new("Status")
                .entry("items", ron_string(&self.items.len()))
                .entry("items_loading", ron_string(&self.loading_count()))
                .entry("items_failed", ron_string(&self.failed_count())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_url() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/25/"), Some(25));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/1/"), Some(1));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/151"), Some(151));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/"), None);
    }

    #[test]
    fn test_detail_key_falls_back_to_name() {
        let summary = Summary::new("pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
        assert_eq!(summary.detail_key(), "25");

        let summary = Summary::new("missingno", "not-a-url");
        assert_eq!(summary.detail_key(), "missingno");
    }

    #[test]
    fn test_grid_columns_never_zero() {
        assert_eq!(grid_columns(10), 1);
        assert_eq!(grid_columns(CARD_WIDTH * 3 + 5), 3);
    }

    #[test]
    fn test_rebuild_filtered_clamps_cursor() {
        let mut state = AppState {
            catalog: DataResource::Loaded(vec![
                Summary::new("bulbasaur", "/pokemon/1/"),
                Summary::new("charmander", "/pokemon/4/"),
            ]),
            cursor: 1,
            ..Default::default()
        };
        state.search.query = "bulb".into();
        state.rebuild_filtered();
        assert_eq!(state.filtered, vec![0]);
        assert_eq!(state.cursor, 0);
    }
}
