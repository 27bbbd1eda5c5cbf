//! Actions: user intents and async results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::CatalogError;
use crate::sprite::Sprite;
use crate::state::{Detail, SpriteSlot, Summary};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,

    // ===== Catalog =====
    CatalogDidLoad(Vec<Summary>),
    CatalogDidError(CatalogError),

    // ===== Item presenters =====
    ItemDetailDidLoad {
        name: String,
        mount: u64,
        detail: Detail,
    },
    ItemDetailDidError {
        name: String,
        mount: u64,
        error: CatalogError,
    },
    /// Activate the card at this index of the filtered list
    ItemActivate(usize),

    // ===== Card cursor =====
    CursorMove { cols: i16, rows: i16 },
    CursorPage(i16),
    CursorJumpTop,
    CursorJumpBottom,

    // ===== Search =====
    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    // ===== Detail overlay =====
    OverlayClose,
    OverlaySpriteDidLoad { id: u32, slot: SpriteSlot, sprite: Sprite },
    OverlaySpriteDidError { id: u32, slot: SpriteSlot, error: String },

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
