//! Reducer - pure function: (state, action) -> DispatchResult

use std::collections::HashSet;

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, Detail, ItemState, Selection, SpriteSlot};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.catalog = DataResource::Loading;
            state.filtered.clear();
            state.items.clear();
            state.mounts.clear();
            state.selection = None;
            state.cursor = 0;
            DispatchResult::changed_with(Effect::LoadCatalog {
                limit: state.page.limit,
                offset: state.page.offset,
            })
        }

        // ===== Catalog =====
        Action::CatalogDidLoad(summaries) => {
            state.catalog = DataResource::Loaded(summaries);
            state.rebuild_filtered();
            changed_with_effects(sync_items(state))
        }

        Action::CatalogDidError(error) => {
            state.catalog = DataResource::Failed(error.to_string());
            state.filtered.clear();
            state.cursor = 0;
            changed_with_effects(sync_items(state))
        }

        // ===== Item presenters =====
        Action::ItemDetailDidLoad {
            name,
            mount,
            detail,
        } => {
            let Some(item) = pending_item(state, &name, mount) else {
                return DispatchResult::unchanged();
            };
            *item = DataResource::Loaded(detail);
            DispatchResult::changed()
        }

        Action::ItemDetailDidError { name, mount, error } => {
            let Some(item) = pending_item(state, &name, mount) else {
                return DispatchResult::unchanged();
            };
            *item = DataResource::Failed(error.to_string());
            DispatchResult::changed()
        }

        Action::ItemActivate(index) => {
            let Some(detail) = resolved_detail(state, index) else {
                return DispatchResult::unchanged();
            };
            state.cursor = index;
            changed_with_effects(open_overlay(state, detail))
        }

        // ===== Card cursor =====
        Action::CursorMove { cols, rows } => {
            let columns = state.grid_columns() as i64;
            let delta = rows as i64 * columns + cols as i64;
            move_cursor(state, delta)
        }

        Action::CursorPage(pages) => {
            let page = (state.grid_visible_rows() * state.grid_columns()) as i64;
            move_cursor(state, pages as i64 * page)
        }

        Action::CursorJumpTop => set_cursor(state, 0),

        Action::CursorJumpBottom => {
            let last = state.filtered.len().saturating_sub(1);
            set_cursor(state, last)
        }

        // ===== Search =====
        Action::SearchStart => {
            if state.search.active || state.overlay_open() {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            if state.search.query.is_empty() {
                return DispatchResult::changed();
            }
            state.search.query.clear();
            apply_search(state)
        }

        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            apply_search(state)
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            apply_search(state)
        }

        // ===== Detail overlay =====
        Action::OverlayClose => {
            if state.selection.take().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(Effect::CancelSprites)
        }

        Action::OverlaySpriteDidLoad { id, slot, sprite } => {
            let Some(resource) = pending_sprite(state, id, slot) else {
                return DispatchResult::unchanged();
            };
            *resource = DataResource::Loaded(sprite);
            DispatchResult::changed()
        }

        Action::OverlaySpriteDidError { id, slot, error } => {
            let Some(resource) = pending_sprite(state, id, slot) else {
                return DispatchResult::unchanged();
            };
            *resource = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.set_terminal_size(width, height) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            if !state.anything_loading() {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn changed_with_effects(effects: Vec<Effect>) -> DispatchResult<Effect> {
    if effects.is_empty() {
        DispatchResult::changed()
    } else {
        DispatchResult::changed_with_many(effects)
    }
}

fn apply_search(state: &mut AppState) -> DispatchResult<Effect> {
    state.rebuild_filtered();
    changed_with_effects(sync_items(state))
}

/// Mount a presenter for every newly visible card and tear down the ones
/// that left the filtered list. Torn-down presenters lose their state; a
/// pending fetch is cancelled and its late result ignored. Every mount gets
/// a fresh generation, so a result queued before a remount never lands.
fn sync_items(state: &mut AppState) -> Vec<Effect> {
    let visible: Vec<(String, String)> = state
        .visible()
        .map(|entry| (entry.name.clone(), entry.detail_key()))
        .collect();
    let visible_names: HashSet<&str> = visible.iter().map(|(name, _)| name.as_str()).collect();

    let mut effects = Vec::new();
    let mut gone: Vec<String> = state
        .items
        .keys()
        .filter(|name| !visible_names.contains(name.as_str()))
        .cloned()
        .collect();
    gone.sort();
    for name in gone {
        state.mounts.remove(&name);
        if let Some(item) = state.items.remove(&name) {
            if item.is_loading() {
                effects.push(Effect::CancelItemDetail { name });
            }
        }
    }

    for (name, key) in &visible {
        if !state.items.contains_key(name) {
            state.next_mount += 1;
            let mount = state.next_mount;
            state.items.insert(name.clone(), DataResource::Loading);
            state.mounts.insert(name.clone(), mount);
            effects.push(Effect::LoadItemDetail {
                name: name.clone(),
                key: key.clone(),
                mount,
            });
        }
    }
    effects
}

/// The presenter a detail result was requested for, if it is still mounted
/// and waiting.
fn pending_item<'a>(
    state: &'a mut AppState,
    name: &str,
    mount: u64,
) -> Option<&'a mut ItemState> {
    if state.mount_of(name) != Some(mount) {
        return None;
    }
    let item = state.items.get_mut(name)?;
    item.is_loading().then_some(item)
}

fn resolved_detail(state: &AppState, index: usize) -> Option<Detail> {
    let entry = state.visible_entry(index)?;
    state.item(&entry.name)?.data().cloned()
}

fn open_overlay(state: &mut AppState, detail: Detail) -> Vec<Effect> {
    let id = detail.id;
    let mut selection = Selection::new(detail);
    let mut effects = Vec::new();
    for slot in SpriteSlot::ALL {
        if let Some(url) = selection.sprite_url(slot) {
            *selection.sprite_mut(slot) = DataResource::Loading;
            effects.push(Effect::LoadSprite { id, slot, url });
        }
    }
    state.selection = Some(selection);
    state.search.active = false;
    effects
}

fn pending_sprite(
    state: &mut AppState,
    id: u32,
    slot: SpriteSlot,
) -> Option<&mut DataResource<crate::sprite::Sprite>> {
    let selection = state.selection.as_mut()?;
    if selection.detail.id != id {
        return None;
    }
    let resource = selection.sprite_mut(slot);
    resource.is_loading().then_some(resource)
}

fn move_cursor(state: &mut AppState, delta: i64) -> DispatchResult<Effect> {
    if state.filtered.is_empty() {
        return DispatchResult::unchanged();
    }
    let last = state.filtered.len() as i64 - 1;
    let next = (state.cursor as i64 + delta).clamp(0, last);
    set_cursor(state, next as usize)
}

fn set_cursor(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if state.filtered.is_empty() {
        return DispatchResult::unchanged();
    }
    let bounded = index.min(state.filtered.len() - 1);
    if bounded == state.cursor {
        return DispatchResult::unchanged();
    }
    state.cursor = bounded;
    DispatchResult::changed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CatalogError;
    use crate::state::{SpriteUrls, Summary};

    fn summaries(names: &[&str]) -> Vec<Summary> {
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                Summary::new(
                    *name,
                    format!("https://pokeapi.co/api/v2/pokemon/{}/", idx + 1),
                )
            })
            .collect()
    }

    fn detail(id: u32, name: &str) -> Detail {
        Detail {
            id,
            name: name.into(),
            height: 7,
            weight: 69,
            base_experience: Some(64),
            sprites: SpriteUrls {
                front_default: Some(format!("https://img/{id}.png")),
                front_shiny: None,
                artwork: Some(format!("https://img/art/{id}.png")),
            },
            types: vec!["grass".into(), "poison".into()],
            stats: Vec::new(),
            abilities: Vec::new(),
        }
    }

    fn loaded_state(names: &[&str]) -> AppState {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        reducer(&mut state, Action::CatalogDidLoad(summaries(names)));
        state
    }

    #[test]
    fn test_init_requests_first_page() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::Init);

        assert!(result.changed);
        assert!(state.catalog.is_loading());
        assert_eq!(
            result.effects,
            vec![Effect::LoadCatalog {
                limit: 150,
                offset: 0
            }]
        );
    }

    #[test]
    fn test_catalog_load_mounts_one_presenter_per_entry() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        let result = reducer(
            &mut state,
            Action::CatalogDidLoad(summaries(&["bulbasaur", "ivysaur"])),
        );

        assert_eq!(state.filtered, vec![0, 1]);
        assert!(state.item("bulbasaur").unwrap().is_loading());
        assert_eq!(
            result.effects,
            vec![
                Effect::LoadItemDetail {
                    name: "bulbasaur".into(),
                    key: "1".into(),
                    mount: 1,
                },
                Effect::LoadItemDetail {
                    name: "ivysaur".into(),
                    key: "2".into(),
                    mount: 2,
                },
            ]
        );
    }

    #[test]
    fn test_catalog_error_sets_failed_phase() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        let result = reducer(
            &mut state,
            Action::CatalogDidError(CatalogError::RequestFailed { status: 500 }),
        );

        assert!(result.changed);
        assert!(result.effects.is_empty());
        assert_eq!(
            state.catalog.error(),
            Some("request failed with status 500")
        );
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_item_activation_requires_resolved_detail() {
        let mut state = loaded_state(&["bulbasaur"]);

        let result = reducer(&mut state, Action::ItemActivate(0));
        assert!(!result.changed);
        assert!(state.selection.is_none());

        reducer(
            &mut state,
            Action::ItemDetailDidLoad {
                name: "bulbasaur".into(),
                mount: 1,
                detail: detail(1, "bulbasaur"),
            },
        );
        let result = reducer(&mut state, Action::ItemActivate(0));
        assert!(result.changed);
        assert!(state.overlay_open());
        assert_eq!(result.effects.len(), 2);
        assert!(state.selection.as_ref().unwrap().shiny.is_empty());
    }

    #[test]
    fn test_filtering_out_loading_item_cancels_fetch() {
        let mut state = loaded_state(&["bulbasaur", "charmander"]);
        reducer(&mut state, Action::SearchStart);
        let result = reducer(&mut state, Action::SearchInput('c'));

        assert_eq!(state.filtered, vec![1]);
        assert!(state.item("bulbasaur").is_none());
        assert_eq!(
            result.effects,
            vec![Effect::CancelItemDetail {
                name: "bulbasaur".into()
            }]
        );

        // A late result for the torn-down card is discarded.
        let result = reducer(
            &mut state,
            Action::ItemDetailDidLoad {
                name: "bulbasaur".into(),
                mount: 1,
                detail: detail(1, "bulbasaur"),
            },
        );
        assert!(!result.changed);
        assert!(state.item("bulbasaur").is_none());
    }

    #[test]
    fn test_remount_refetches() {
        let mut state = loaded_state(&["bulbasaur", "charmander"]);
        reducer(&mut state, Action::SearchInput('c'));
        let result = reducer(&mut state, Action::SearchBackspace);

        assert_eq!(state.filtered, vec![0, 1]);
        assert_eq!(
            result.effects,
            vec![Effect::LoadItemDetail {
                name: "bulbasaur".into(),
                key: "1".into(),
                mount: 3,
            }]
        );
    }

    #[test]
    fn test_result_from_previous_mount_ignored_after_remount() {
        let mut state = loaded_state(&["bulbasaur", "charmander"]);
        reducer(&mut state, Action::SearchInput('c'));
        reducer(&mut state, Action::SearchBackspace);
        assert_eq!(state.mount_of("bulbasaur"), Some(3));

        // Queued before the first mount was torn down.
        let result = reducer(
            &mut state,
            Action::ItemDetailDidError {
                name: "bulbasaur".into(),
                mount: 1,
                error: CatalogError::RequestFailed { status: 503 },
            },
        );
        assert!(!result.changed);
        assert!(state.item("bulbasaur").unwrap().is_loading());

        let result = reducer(
            &mut state,
            Action::ItemDetailDidLoad {
                name: "bulbasaur".into(),
                mount: 3,
                detail: detail(1, "bulbasaur"),
            },
        );
        assert!(result.changed);
        assert!(state.item("bulbasaur").unwrap().is_loaded());
    }

    #[test]
    fn test_cursor_moves_by_rows_and_clamps() {
        let names: Vec<String> = (0..10).map(|i| format!("mon-{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut state = loaded_state(&refs);
        state.terminal_size = (crate::state::CARD_WIDTH * 3, 40);

        reducer(&mut state, Action::CursorMove { cols: 0, rows: 1 });
        assert_eq!(state.cursor, 3);
        reducer(&mut state, Action::CursorMove { cols: 1, rows: 0 });
        assert_eq!(state.cursor, 4);
        reducer(&mut state, Action::CursorMove { cols: 0, rows: 5 });
        assert_eq!(state.cursor, 9);
        let result = reducer(&mut state, Action::CursorMove { cols: 1, rows: 0 });
        assert!(!result.changed);
        reducer(&mut state, Action::CursorJumpTop);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_stale_sprite_result_ignored() {
        let mut state = loaded_state(&["bulbasaur"]);
        reducer(
            &mut state,
            Action::ItemDetailDidLoad {
                name: "bulbasaur".into(),
                mount: 1,
                detail: detail(1, "bulbasaur"),
            },
        );
        reducer(&mut state, Action::ItemActivate(0));
        let result = reducer(&mut state, Action::OverlayClose);
        assert_eq!(result.effects, vec![Effect::CancelSprites]);

        let result = reducer(
            &mut state,
            Action::OverlaySpriteDidError {
                id: 1,
                slot: SpriteSlot::Artwork,
                error: "late".into(),
            },
        );
        assert!(!result.changed);
        assert!(state.selection.is_none());
    }

    #[test]
    fn test_tick_only_while_loading() {
        let mut state = AppState::default();
        assert!(!reducer(&mut state, Action::Tick).changed);

        reducer(&mut state, Action::Init);
        assert!(reducer(&mut state, Action::Tick).changed);
        assert_eq!(state.tick, 1);
    }
}
