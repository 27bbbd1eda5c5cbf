//! Effects - side effects declared by the reducer

use crate::state::SpriteSlot;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Fetch one page of summaries
    LoadCatalog { limit: u32, offset: u32 },
    /// Fetch the detail record behind one card
    LoadItemDetail { name: String, key: String, mount: u64 },
    /// Abort the detail fetch of a card that left the filtered list
    CancelItemDetail { name: String },
    /// Fetch and decode one overlay image
    LoadSprite { id: u32, slot: SpriteSlot, url: String },
    /// Abort pending overlay images
    CancelSprites,
}
