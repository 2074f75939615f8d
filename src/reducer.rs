use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::pager::Pager;
use crate::state::{AppState, CardSlot, SearchState, View};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.types_loading = true;
            state.message = None;
            DispatchResult::changed_with(Effect::LoadTypes)
        }

        Action::TypesDidLoad(types) => {
            state.types_loading = false;
            state.types = types;
            state.type_selected = 0;
            DispatchResult::changed()
        }

        Action::TypesDidError(error) => {
            state.types_loading = false;
            state.message = Some(format!("Type list error: {error}"));
            DispatchResult::changed()
        }

        Action::TypeSelect(index) => {
            if !state.set_type_selected(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::TypeOpen => {
            let Some(type_ref) = state.selected_type().cloned() else {
                return DispatchResult::unchanged();
            };
            state.current_type = Some(type_ref.name.clone());
            state.members_loading = true;
            state.message = None;
            DispatchResult::changed_with(Effect::LoadMembers {
                type_name: type_ref.name,
                url: type_ref.url,
            })
        }

        Action::MembersDidLoad { type_name, entries } => {
            if state.current_type.as_deref() != Some(&type_name) {
                return DispatchResult::unchanged();
            }
            state.members_loading = false;
            // Page index and size only live for one category's browsing
            // session; a new selection starts from a fresh pager.
            state.pager = Pager::default();
            state.pager.set_entries(entries);
            state.entry_search = SearchState::default();
            state.view = View::Entries;
            changed_with(repaginate(state))
        }

        Action::MembersDidError { type_name, error } => {
            if state.current_type.as_deref() != Some(&type_name) {
                return DispatchResult::unchanged();
            }
            state.members_loading = false;
            state.message = Some(format!("{type_name} error: {error}"));
            DispatchResult::changed()
        }

        Action::SelectionMove(delta) => match state.view {
            View::Types => {
                let mut index = state.type_selected as i16 + delta;
                if index < 0 {
                    index = 0;
                }
                if !state.set_type_selected(index as usize) {
                    return DispatchResult::unchanged();
                }
                DispatchResult::changed()
            }
            View::Entries => {
                let mut index = state.card_selected as i16 + delta;
                if index < 0 {
                    index = 0;
                }
                if !state.set_card_selected(index as usize) {
                    return DispatchResult::unchanged();
                }
                changed_with(sprite_refresh(state))
            }
            View::Detail => DispatchResult::unchanged(),
        },

        Action::CardOpen => {
            if state.view != View::Entries {
                return DispatchResult::unchanged();
            }
            let Some(card) = state.selected_card() else {
                return DispatchResult::unchanged();
            };
            let name = card.entry.name.clone();
            let url = card.entry.url.clone();
            state.view = View::Detail;
            state.detail = None;
            state.detail_request = Some(name.clone());
            state.detail_loading = true;
            state.sprite = None;
            state.sprite_loading = false;
            DispatchResult::changed_with(Effect::LoadDetail { name, url })
        }

        Action::CardDidLoad {
            generation,
            slot,
            record,
        } => {
            // A response from a page that has since been re-rendered.
            if generation != state.generation {
                return DispatchResult::unchanged();
            }
            let Some(card) = state.cards.get_mut(slot) else {
                return DispatchResult::unchanged();
            };
            card.record = Some(record);
            card.failed = false;
            if state.selected_slot_index() == Some(slot) {
                return changed_with(sprite_refresh(state));
            }
            DispatchResult::changed()
        }

        Action::CardDidError {
            generation,
            slot,
            error: _,
        } => {
            if generation != state.generation {
                return DispatchResult::unchanged();
            }
            let Some(card) = state.cards.get_mut(slot) else {
                return DispatchResult::unchanged();
            };
            card.failed = true;
            DispatchResult::changed()
        }

        Action::PageNext => {
            if state.view != View::Entries || !state.pager.next_page() {
                return DispatchResult::unchanged();
            }
            changed_with(repaginate(state))
        }

        Action::PagePrev => {
            if state.view != View::Entries || !state.pager.prev_page() {
                return DispatchResult::unchanged();
            }
            changed_with(repaginate(state))
        }

        Action::PageSizeNext => cycle_page_size(state, 1),
        Action::PageSizePrev => cycle_page_size(state, -1),

        Action::PageSizeSet(size) => {
            if state.view != View::Entries || !state.pager.set_page_size(size) {
                return DispatchResult::unchanged();
            }
            changed_with(repaginate(state))
        }

        Action::DetailDidLoad { name, record } => {
            if state.view != View::Detail || state.detail_request.as_deref() != Some(&name) {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            state.detail = Some(record);
            changed_with(sprite_refresh(state))
        }

        Action::DetailDidError { name, error } => {
            if state.detail_request.as_deref() != Some(&name) {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            state.message = Some(format!("{name} load error: {error}"));
            DispatchResult::changed()
        }

        Action::SpriteDidLoad { name, sprite } => {
            let target = state.sprite_target().map(|(target_name, _)| target_name);
            if target.as_deref() != Some(&name) {
                return DispatchResult::unchanged();
            }
            state.sprite = Some((name, sprite));
            state.sprite_loading = false;
            DispatchResult::changed()
        }

        Action::SpriteDidError { name: _, error: _ } => {
            state.sprite_loading = false;
            DispatchResult::changed()
        }

        Action::SearchStart => {
            let Some(search) = state.active_search_mut() else {
                return DispatchResult::unchanged();
            };
            if search.active {
                return DispatchResult::unchanged();
            }
            search.active = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            let Some(search) = state.active_search_mut() else {
                return DispatchResult::unchanged();
            };
            if !search.active && search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            search.active = false;
            search.query.clear();
            after_filter_change(state)
        }

        Action::SearchSubmit => {
            let Some(search) = state.active_search_mut() else {
                return DispatchResult::unchanged();
            };
            if !search.active {
                return DispatchResult::unchanged();
            }
            search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            let Some(search) = state.active_search_mut() else {
                return DispatchResult::unchanged();
            };
            if !search.active {
                return DispatchResult::unchanged();
            }
            search.query.push(ch);
            after_filter_change(state)
        }

        Action::SearchBackspace => {
            let Some(search) = state.active_search_mut() else {
                return DispatchResult::unchanged();
            };
            if !search.active {
                return DispatchResult::unchanged();
            }
            search.query.pop();
            after_filter_change(state)
        }

        Action::PlayCry => {
            if state.view != View::Detail {
                return DispatchResult::unchanged();
            }
            let Some(record) = state.detail.as_ref() else {
                return DispatchResult::unchanged();
            };
            DispatchResult::changed_with(Effect::PlayCry {
                name: record.name.clone(),
                url: record.cry_url(),
            })
        }

        Action::CryDidPlay => DispatchResult::unchanged(),

        Action::CryDidError(error) => {
            state.message = Some(format!("Cry error: {error}"));
            DispatchResult::changed()
        }

        Action::GoBack => match state.view {
            View::Types => DispatchResult::unchanged(),
            View::Entries => {
                state.view = View::Types;
                DispatchResult::changed()
            }
            View::Detail => {
                state.view = View::Entries;
                state.detail = None;
                state.detail_request = None;
                state.detail_loading = false;
                state.sprite = None;
                changed_with(sprite_refresh(state))
            }
        },

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn changed_with(effects: Vec<Effect>) -> DispatchResult<Effect> {
    if effects.is_empty() {
        DispatchResult::changed()
    } else {
        DispatchResult::changed_with_many(effects)
    }
}

/// Rebuilds the card slots for the pager's current page under a fresh
/// generation and issues one independent record load per slot.
fn repaginate(state: &mut AppState) -> Vec<Effect> {
    state.generation = state.generation.wrapping_add(1);
    state.cards = state
        .pager
        .visible_slice()
        .iter()
        .cloned()
        .map(CardSlot::new)
        .collect();
    state.card_selected = 0;
    state.sprite = None;
    state.sprite_loading = false;
    state
        .cards
        .iter()
        .enumerate()
        .map(|(slot, card)| Effect::LoadCard {
            generation: state.generation,
            slot,
            name: card.entry.name.clone(),
            url: card.entry.url.clone(),
        })
        .collect()
}

fn sprite_refresh(state: &mut AppState) -> Vec<Effect> {
    let Some((name, url)) = state.sprite_target() else {
        state.sprite_loading = false;
        return Vec::new();
    };
    if state
        .sprite
        .as_ref()
        .map(|(have, _)| have == &name)
        .unwrap_or(false)
    {
        return Vec::new();
    }
    state.sprite_loading = true;
    vec![Effect::LoadSprite { name, url }]
}

fn cycle_page_size(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    if state.view != View::Entries || !state.pager.cycle_page_size(step) {
        return DispatchResult::unchanged();
    }
    changed_with(repaginate(state))
}

fn after_filter_change(state: &mut AppState) -> DispatchResult<Effect> {
    match state.view {
        View::Types => {
            state.clamp_type_selected();
            DispatchResult::changed()
        }
        View::Entries => {
            state.clamp_card_selected();
            changed_with(sprite_refresh(state))
        }
        View::Detail => DispatchResult::changed(),
    }
}
