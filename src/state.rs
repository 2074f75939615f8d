use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::pager::Pager;
use crate::sprite::SpriteData;

pub const CRY_URL_BASE: &str = "https://play.pokemonshowdown.com/audio/cries";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// A Pokemon type together with the URL of its member list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub url: String,
}

/// One member of a type's entry list, in API response order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryRef {
    pub name: String,
    pub url: String,
}

/// The full record behind an entry. Never cached; fetched per render.
///
/// `stats` carries the base stat values exactly in the order the API
/// returned them. The detail view reads HP/Attack/Defense from the first
/// three positions, which is the source API's ordering contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    pub sprite_front: Option<String>,
    pub sprite_alt: Option<String>,
    pub stats: Vec<u16>,
    pub height: u16,
    pub weight: u16,
}

impl EntryRecord {
    pub fn cry_url(&self) -> String {
        format!("{CRY_URL_BASE}/{}.mp3", self.name.to_lowercase())
    }
}

/// The three mutually exclusive screens. Being an enum, exactly one is
/// ever active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum View {
    #[default]
    Types,
    Entries,
    Detail,
}

impl View {
    /// Fixed two-level back mapping: Detail returns to the entry list,
    /// everything else lands on the type list.
    pub fn back(self) -> View {
        match self {
            View::Detail => View::Entries,
            View::Entries | View::Types => View::Types,
        }
    }
}

/// One card of the visible page. Slots are rebuilt wholesale on every
/// repagination; their requests carry the generation current at rebuild
/// time so a stale completion can never touch a newer slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardSlot {
    pub entry: EntryRef,
    pub record: Option<EntryRecord>,
    pub failed: bool,
}

impl CardSlot {
    pub fn new(entry: EntryRef) -> Self {
        Self {
            entry,
            record: None,
            failed: false,
        }
    }
}

/// Case-insensitive substring match; an empty query matches everything.
pub fn matches_query(label: &str, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || label.to_lowercase().contains(&query)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub view: View,

    pub types: Vec<TypeRef>,
    pub type_selected: usize,
    pub type_search: SearchState,

    pub current_type: Option<String>,
    pub pager: Pager,
    pub cards: Vec<CardSlot>,
    pub generation: u64,
    pub card_selected: usize,
    pub entry_search: SearchState,

    pub detail_request: Option<String>,
    pub detail: Option<EntryRecord>,

    pub sprite: Option<(String, SpriteData)>,

    pub types_loading: bool,
    pub members_loading: bool,
    pub detail_loading: bool,
    pub sprite_loading: bool,
    pub message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terminal_size: (80, 24),
            view: View::Types,
            types: Vec::new(),
            type_selected: 0,
            type_search: SearchState::default(),
            current_type: None,
            pager: Pager::default(),
            cards: Vec::new(),
            generation: 0,
            card_selected: 0,
            entry_search: SearchState::default(),
            detail_request: None,
            detail: None,
            sprite: None,
            types_loading: false,
            members_loading: false,
            detail_loading: false,
            sprite_loading: false,
            message: None,
        }
    }
}

impl AppState {
    /// Indices into `types` that pass the type search filter.
    pub fn filtered_type_indices(&self) -> Vec<usize> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, type_ref)| matches_query(&type_ref.name, &self.type_search.query))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn selected_type(&self) -> Option<&TypeRef> {
        let indices = self.filtered_type_indices();
        indices
            .get(self.type_selected)
            .and_then(|idx| self.types.get(*idx))
    }

    pub fn set_type_selected(&mut self, index: usize) -> bool {
        let len = self.filtered_type_indices().len();
        if len == 0 {
            self.type_selected = 0;
            return false;
        }
        let bounded = index.min(len - 1);
        if bounded != self.type_selected {
            self.type_selected = bounded;
            return true;
        }
        false
    }

    /// Slot indices of the current page that pass the entry search filter.
    /// The filter only ever sees the rendered page; entries on other
    /// pages are out of its reach.
    pub fn visible_card_indices(&self) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| matches_query(&card.entry.name, &self.entry_search.query))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn selected_slot_index(&self) -> Option<usize> {
        self.visible_card_indices().get(self.card_selected).copied()
    }

    pub fn selected_card(&self) -> Option<&CardSlot> {
        self.selected_slot_index().and_then(|idx| self.cards.get(idx))
    }

    pub fn set_card_selected(&mut self, index: usize) -> bool {
        let len = self.visible_card_indices().len();
        if len == 0 {
            self.card_selected = 0;
            return false;
        }
        let bounded = index.min(len - 1);
        if bounded != self.card_selected {
            self.card_selected = bounded;
            return true;
        }
        false
    }

    pub fn clamp_card_selected(&mut self) {
        let len = self.visible_card_indices().len();
        if self.card_selected >= len {
            self.card_selected = 0;
        }
    }

    pub fn clamp_type_selected(&mut self) {
        let len = self.filtered_type_indices().len();
        if self.type_selected >= len {
            self.type_selected = 0;
        }
    }

    /// The search box belonging to the active view, if it has one.
    pub fn active_search(&self) -> Option<&SearchState> {
        match self.view {
            View::Types => Some(&self.type_search),
            View::Entries => Some(&self.entry_search),
            View::Detail => None,
        }
    }

    pub fn active_search_mut(&mut self) -> Option<&mut SearchState> {
        match self.view {
            View::Types => Some(&mut self.type_search),
            View::Entries => Some(&mut self.entry_search),
            View::Detail => None,
        }
    }

    pub fn search_active(&self) -> bool {
        self.active_search().map(|search| search.active).unwrap_or(false)
    }

    /// The sprite the UI wants on screen right now: the detail record's
    /// front sprite, or the selected card's once its record arrived.
    pub fn sprite_target(&self) -> Option<(String, String)> {
        let record = match self.view {
            View::Detail => self.detail.as_ref(),
            View::Entries => self.selected_card().and_then(|card| card.record.as_ref()),
            View::Types => None,
        }?;
        let url = record.sprite_front.clone()?;
        Some((record.name.clone(), url))
    }

    pub fn current_sprite(&self) -> Option<&SpriteData> {
        let (target, _) = self.sprite_target()?;
        let (name, sprite) = self.sprite.as_ref()?;
        (name == &target).then_some(sprite)
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Browse")
                .entry("view", ron_string(&self.view))
                .entry("type", ron_string(&self.current_type))
                .entry("entries", ron_string(&self.pager.len()))
                .entry("page", ron_string(&self.pager.page_index()))
                .entry("page_size", ron_string(&self.pager.page_size()))
                .entry("selected", ron_string(&self.card_selected))
                .entry("generation", ron_string(&self.generation)),
            DebugSection::new("Search")
                .entry("type_query", ron_string(&self.type_search.query))
                .entry("entry_query", ron_string(&self.entry_search.query))
                .entry("active", ron_string(&self.search_active())),
            DebugSection::new("Status")
                .entry("types_loading", ron_string(&self.types_loading))
                .entry("members_loading", ron_string(&self.members_loading))
                .entry("detail_loading", ron_string(&self.detail_loading))
                .entry("sprite_loading", ron_string(&self.sprite_loading))
                .entry("message", ron_string(&self.message)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_maps_detail_to_entries_and_everything_else_to_types() {
        assert_eq!(View::Detail.back(), View::Entries);
        assert_eq!(View::Entries.back(), View::Types);
        assert_eq!(View::Types.back(), View::Types);
    }

    #[test]
    fn query_matching_is_case_insensitive_substring() {
        assert!(matches_query("charmander", "CHAR"));
        assert!(matches_query("Charizard", "char"));
        assert!(!matches_query("squirtle", "char"));
        assert!(matches_query("anything", ""));
        assert!(matches_query("anything", "  "));
    }

    #[test]
    fn cry_url_uses_the_lowercased_name() {
        let record = EntryRecord {
            name: "Pikachu".to_string(),
            sprite_front: None,
            sprite_alt: None,
            stats: Vec::new(),
            height: 4,
            weight: 60,
        };
        assert_eq!(
            record.cry_url(),
            "https://play.pokemonshowdown.com/audio/cries/pikachu.mp3"
        );
    }
}
