use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Rect;
use ratatui::Terminal;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use typedex::action::Action;
use typedex::effect::Effect;
use typedex::reducer::reducer;
use typedex::sprite_backend::{self, SpriteBackend};
use typedex::state::{AppState, View};
use typedex::ui::TypedexUi;
use typedex::{api, audio, sprite};

#[derive(Parser, Debug)]
#[command(name = "typedex")]
#[command(about = "Browse Pokemon by type in the terminal")]
struct Args {
    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum TypedexComponentId {
    Types,
    Entries,
    Detail,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum TypedexContext {
    Types,
    Entries,
    Detail,
    Search,
}

impl EventRoutingState<TypedexComponentId, TypedexContext> for AppState {
    fn focused(&self) -> Option<TypedexComponentId> {
        if self.search_active() {
            return Some(TypedexComponentId::Search);
        }
        match self.view {
            View::Types => Some(TypedexComponentId::Types),
            View::Entries => Some(TypedexComponentId::Entries),
            View::Detail => Some(TypedexComponentId::Detail),
        }
    }

    fn modal(&self) -> Option<TypedexComponentId> {
        if self.search_active() {
            Some(TypedexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: TypedexComponentId) -> TypedexContext {
        match id {
            TypedexComponentId::Types => TypedexContext::Types,
            TypedexComponentId::Entries => TypedexContext::Entries,
            TypedexComponentId::Detail => TypedexContext::Detail,
            TypedexComponentId::Search => TypedexContext::Search,
        }
    }

    fn default_context(&self) -> TypedexContext {
        TypedexContext::Types
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let debug = DebugSession::new(args.debug);

    let state = debug
        .load_state_or_else_async(|| async { Ok::<AppState, io::Error>(AppState::default()) })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = SpriteBackend::new(stdout, sprite_backend::overlay_handle());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(TypedexUi::new()));
    let mut bus: EventBus<AppState, Action, TypedexComponentId, TypedexContext> = EventBus::new();
    let keybindings: Keybindings<TypedexContext> = Keybindings::new();

    let ui_types = Rc::clone(&ui);
    bus.register(TypedexComponentId::Types, move |event, state| {
        ui_types.borrow_mut().handle_types_event(&event.kind, state)
    });

    let ui_entries = Rc::clone(&ui);
    bus.register(TypedexComponentId::Entries, move |event, state| {
        ui_entries
            .borrow_mut()
            .handle_entries_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(TypedexComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(TypedexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            crossterm::event::KeyCode::Char('/')
                if !state.search_active() && state.view != View::Detail =>
            {
                HandlerResponse::action(Action::SearchStart)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            &mut bus,
            &keybindings,
            |frame, area, state, _render_ctx, event_ctx| {
                let active = match state.view {
                    View::Types => TypedexComponentId::Types,
                    View::Entries => TypedexComponentId::Entries,
                    View::Detail => TypedexComponentId::Detail,
                };
                for id in [
                    TypedexComponentId::Types,
                    TypedexComponentId::Entries,
                    TypedexComponentId::Detail,
                ] {
                    if id == active {
                        event_ctx.set_component_area(id, area);
                    } else {
                        event_ctx.component_areas.remove(&id);
                    }
                }
                if state.search_active() {
                    let header = Rect {
                        x: area.x,
                        y: area.y,
                        width: area.width,
                        height: 3.min(area.height),
                    };
                    event_ctx.set_component_area(TypedexComponentId::Search, header);
                } else {
                    event_ctx
                        .component_areas
                        .remove(&TypedexComponentId::Search);
                }
                ui.borrow_mut().render(frame, area, state);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadTypes => {
            ctx.tasks().spawn(TaskKey::new("types"), async {
                match api::fetch_type_list().await {
                    Ok(types) => Action::TypesDidLoad(types),
                    Err(err) => Action::TypesDidError(err),
                }
            });
        }
        Effect::LoadMembers { type_name, url } => {
            let key = format!("members_{type_name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_type_members(&url).await {
                    Ok(entries) => Action::MembersDidLoad { type_name, entries },
                    Err(error) => Action::MembersDidError { type_name, error },
                }
            });
        }
        Effect::LoadCard {
            generation,
            slot,
            name,
            url,
        } => {
            let key = format!("card_{generation}_{slot}_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_entry_record(&url).await {
                    Ok(record) => Action::CardDidLoad {
                        generation,
                        slot,
                        record,
                    },
                    Err(error) => Action::CardDidError {
                        generation,
                        slot,
                        error,
                    },
                }
            });
        }
        Effect::LoadDetail { name, url } => {
            let key = format!("detail_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_entry_record(&url).await {
                    Ok(record) => Action::DetailDidLoad { name, record },
                    Err(error) => Action::DetailDidError { name, error },
                }
            });
        }
        Effect::LoadSprite { name, url } => {
            let key = format!("sprite_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_bytes(&url).await {
                    Ok(bytes) => match sprite::decode_sprite(&bytes) {
                        Ok(data) => Action::SpriteDidLoad { name, sprite: data },
                        Err(error) => Action::SpriteDidError { name, error },
                    },
                    Err(error) => Action::SpriteDidError { name, error },
                }
            });
        }
        Effect::PlayCry { name, url } => {
            ctx.tasks().spawn(TaskKey::new("cry"), async move {
                match api::fetch_bytes(&url).await {
                    Ok(bytes) => {
                        match tokio::task::spawn_blocking(move || audio::play_clip(bytes)).await {
                            Ok(Ok(())) => Action::CryDidPlay,
                            Ok(Err(error)) => Action::CryDidError(error),
                            Err(error) => Action::CryDidError(error.to_string()),
                        }
                    }
                    Err(error) => Action::CryDidError(format!("{name}: {error}")),
                }
            });
        }
    }
}
