use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::{EntryRecord, EntryRef, TypeRef};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    TypesDidLoad(Vec<TypeRef>),
    TypesDidError(String),
    TypeSelect(usize),
    TypeOpen,

    MembersDidLoad { type_name: String, entries: Vec<EntryRef> },
    MembersDidError { type_name: String, error: String },

    SelectionMove(i16),
    CardOpen,
    CardDidLoad { generation: u64, slot: usize, record: EntryRecord },
    CardDidError { generation: u64, slot: usize, error: String },

    PageNext,
    PagePrev,
    PageSizeNext,
    PageSizePrev,
    PageSizeSet(usize),

    DetailDidLoad { name: String, record: EntryRecord },
    DetailDidError { name: String, error: String },

    SpriteDidLoad { name: String, sprite: SpriteData },
    SpriteDidError { name: String, error: String },

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    PlayCry,
    CryDidPlay,
    CryDidError(String),

    GoBack,
    UiTerminalResize(u16, u16),
    Quit,
}
