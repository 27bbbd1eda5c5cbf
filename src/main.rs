//! Pokédex TUI - browse the PokeAPI catalog

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pokedex::action::Action;
use pokedex::api::{CatalogClient, DEFAULT_BASE_URL};
use pokedex::components::{
    overlay_area, CatalogView, CatalogViewProps, Component, DetailOverlay, DetailOverlayProps,
};
use pokedex::effect::Effect;
use pokedex::logging;
use pokedex::reducer::reducer;
use pokedex::sprite::Sprite;
use pokedex::state::{AppState, PageRequest, SpriteSlot, DEFAULT_PAGE_LIMIT, SPINNER_TICK_MS};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tracing::{debug, info, warn};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

static CLIENT: OnceLock<CatalogClient> = OnceLock::new();

fn client() -> &'static CatalogClient {
    CLIENT.get_or_init(CatalogClient::default)
}

/// Pokédex TUI - search the catalog and inspect any entry
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse the PokeAPI catalog in the terminal")]
struct Args {
    /// Base URL of the PokeAPI v2 service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Number of catalog entries to load (minimum 1)
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
    limit: u32,

    /// Offset of the first catalog entry
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Directory for pokedex.log; logging is off when unset
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum PokedexComponentId {
    Catalog,
    Overlay,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum PokedexContext {
    Catalog,
    Search,
    Overlay,
}

impl EventRoutingState<PokedexComponentId, PokedexContext> for AppState {
    fn focused(&self) -> Option<PokedexComponentId> {
        if self.overlay_open() {
            Some(PokedexComponentId::Overlay)
        } else {
            Some(PokedexComponentId::Catalog)
        }
    }

    fn modal(&self) -> Option<PokedexComponentId> {
        if self.overlay_open() {
            Some(PokedexComponentId::Overlay)
        } else {
            None
        }
    }

    fn binding_context(&self, id: PokedexComponentId) -> PokedexContext {
        match id {
            PokedexComponentId::Overlay => PokedexContext::Overlay,
            PokedexComponentId::Catalog if self.search.active => PokedexContext::Search,
            PokedexComponentId::Catalog => PokedexContext::Catalog,
        }
    }

    fn default_context(&self) -> PokedexContext {
        PokedexContext::Catalog
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        base_url,
        limit,
        offset,
        log_dir,
        debug: debug_args,
    } = Args::parse();

    let _log_guard = logging::init_logger(log_dir.as_deref())?;
    info!(%base_url, limit, offset, "starting pokedex");
    if CLIENT.set(CatalogClient::new(base_url)).is_err() {
        warn!("catalog client already initialised");
    }

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let page = PageRequest { limit, offset };
    let mut state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(page))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // No resize event arrives at startup; lay the grid out for the real size.
    let size = terminal.size()?;
    state.set_terminal_size(size.width, size.height);
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    // ===== Cleanup =====
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
    info!("exiting");
    Ok(())
}

struct PokedexUi {
    catalog: CatalogView,
    overlay: DetailOverlay,
}

impl PokedexUi {
    fn new() -> Self {
        Self {
            catalog: CatalogView::new(),
            overlay: DetailOverlay::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        event_ctx.set_component_area(PokedexComponentId::Catalog, area);
        let props = CatalogViewProps {
            state,
            is_focused: render_ctx.is_focused() && !state.overlay_open(),
        };
        self.catalog.render(frame, area, props);

        if let Some(selection) = &state.selection {
            event_ctx.set_component_area(PokedexComponentId::Overlay, overlay_area(area));
            let props = DetailOverlayProps {
                selection,
                area,
                tick: state.tick,
                is_focused: render_ctx.is_focused(),
            };
            self.overlay.render(frame, area, props);
        } else {
            event_ctx
                .component_areas
                .remove(&PokedexComponentId::Overlay);
        }
    }

    fn handle_catalog_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = CatalogViewProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .catalog
            .handle_event(event, props)
            .into_iter()
            .collect();
        handler_response(actions)
    }

    fn handle_overlay_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let Some(selection) = &state.selection else {
            return HandlerResponse::ignored();
        };
        let (width, height) = state.terminal_size;
        let props = DetailOverlayProps {
            selection,
            area: Rect::new(0, 0, width, height),
            tick: state.tick,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .overlay
            .handle_event(event, props)
            .into_iter()
            .collect();
        // The overlay is modal: swallow everything else.
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
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
    let ui = Rc::new(RefCell::new(PokedexUi::new()));
    let mut bus: EventBus<AppState, Action, PokedexComponentId, PokedexContext> =
        EventBus::new();
    let keybindings: Keybindings<PokedexContext> = Keybindings::new();

    let ui_catalog = Rc::clone(&ui);
    bus.register(PokedexComponentId::Catalog, move |event, state| {
        ui_catalog
            .borrow_mut()
            .handle_catalog_event(&event.kind, state)
    });

    let ui_overlay = Rc::clone(&ui);
    bus.register(PokedexComponentId::Overlay, move |event, state| {
        ui_overlay
            .borrow_mut()
            .handle_overlay_event(&event.kind, state)
    });

    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
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
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn detail_task(name: &str) -> TaskKey {
    TaskKey::new(format!("detail_{name}"))
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    debug!(?effect, "effect");
    match effect {
        Effect::LoadCatalog { limit, offset } => {
            ctx.tasks().spawn(TaskKey::new("catalog"), async move {
                match client().list_summaries(limit, offset).await {
                    Ok(summaries) => {
                        info!(count = summaries.len(), "catalog loaded");
                        Action::CatalogDidLoad(summaries)
                    }
                    Err(error) => Action::CatalogDidError(error),
                }
            });
        }
        Effect::LoadItemDetail { name, key, mount } => {
            ctx.tasks().spawn(detail_task(&name), async move {
                match client().get_detail(&key).await {
                    Ok(detail) => Action::ItemDetailDidLoad {
                        name,
                        mount,
                        detail,
                    },
                    Err(error) => Action::ItemDetailDidError { name, mount, error },
                }
            });
        }
        Effect::CancelItemDetail { name } => {
            ctx.tasks().cancel(&detail_task(&name));
        }
        Effect::LoadSprite { id, slot, url } => {
            ctx.tasks().spawn(TaskKey::new(slot.task_name()), async move {
                let error = match client().fetch_bytes(&url).await {
                    Ok(bytes) => {
                        let max_side = slot.max_side();
                        match tokio::task::spawn_blocking(move || Sprite::decode(&bytes, max_side))
                            .await
                        {
                            Ok(Ok(sprite)) => {
                                return Action::OverlaySpriteDidLoad { id, slot, sprite }
                            }
                            Ok(Err(error)) => error,
                            Err(error) => error.to_string(),
                        }
                    }
                    Err(error) => error.to_string(),
                };
                warn!(id, ?slot, %error, "sprite unavailable");
                Action::OverlaySpriteDidError { id, slot, error }
            });
        }
        Effect::CancelSprites => {
            for slot in SpriteSlot::ALL {
                ctx.tasks().cancel(&TaskKey::new(slot.task_name()));
            }
        }
    }
}
