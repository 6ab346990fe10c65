use crate::audio::AudioFeedback;
use crate::config::WebConfig;
use crate::storage::LocalStore;
use gloo::timers::callback::Interval;
use memoro_core as game;
use std::time::Duration;
use web_time::Instant;
use yew::prelude::*;

type Engine = game::MemoryGame<LocalStore, AudioFeedback>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Click(usize),
    ChangeDifficulty(game::Difficulty),
    PlayAgain,
    Dismiss,
    ToggleMute,
    Tick,
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    index: usize,
    name: AttrValue,
    artwork: AttrValue,
    #[prop_or_default]
    locked: bool,
    callback: Callback<usize>,
}

#[function_component(CardView)]
fn card_component(props: &CardProps) -> Html {
    let CardProps {
        index,
        name,
        artwork,
        locked,
        callback,
    } = props.clone();

    let onclick = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        log::trace!("card {} clicked", index);
        callback.emit(index);
    });

    let picture = if artwork.starts_with(game::PLACEHOLDER_ARTWORK_PREFIX) {
        html! { <div class="placeholder">{"?"}</div> }
    } else {
        html! { <img src={artwork} alt={name.clone()} draggable="false"/> }
    };

    html! {
        <button class={classes!("card", locked.then_some("locked"))} disabled={locked} {onclick}>
            {picture}
            <span>{name}</span>
        </button>
    }
}

#[derive(Properties, PartialEq)]
struct OverlayProps {
    #[prop_or_default]
    children: Html,
}

/// Dims the page and shows its children in a panel attached to the body.
#[function_component(Overlay)]
fn overlay(props: &OverlayProps) -> Html {
    let panel = html! {
        <div class="end-screen">
            <article>{props.children.clone()}</article>
        </div>
    };
    create_portal(panel, gloo::utils::body().into())
}

/// Seed from `Math.random`, one 32-bit half at a time.
fn random_seed() -> u64 {
    let half = || (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    (half() << 32) | half()
}

#[derive(Properties, Clone, PartialEq)]
struct DifficultyPickerProps {
    value: game::Difficulty,
    callback: Callback<game::Difficulty>,
}

#[function_component(DifficultyPicker)]
fn difficulty_picker(props: &DifficultyPickerProps) -> Html {
    let callback = props.callback.clone();
    let onchange = Callback::from(move |e: Event| {
        let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
        callback.emit(game::Difficulty::parse_or_default(&select.value()));
    });

    html! {
        <select {onchange}>
            {
                for game::Difficulty::ALL.iter().map(|&level| html! {
                    <option value={level.as_str()} selected={level == props.value}>
                        {format!("{} ({} cards)", level, level.card_count())}
                    </option>
                })
            }
        </select>
    }
}

#[derive(Properties, Clone, Debug, Default, PartialEq)]
pub(crate) struct GameProps {
    #[prop_or_default]
    pub seed: Option<u64>,
    #[prop_or_default]
    pub difficulty: Option<game::Difficulty>,
}

pub(crate) struct GameView {
    game: Engine,
    provider: game::CatalogProvider,
    last_tick: Instant,
    _ticker: Interval,
}

impl GameView {
    fn create_ticker(ctx: &Context<Self>, tick_ms: u32) -> Interval {
        let link = ctx.link().clone();
        Interval::new(tick_ms.max(1), move || link.send_message(Msg::Tick))
    }

    /// Fills a loading session from the catalog. A no-op otherwise.
    fn load_pending_board(&mut self) {
        if let Err(err) = self.game.load_board(&mut self.provider) {
            log::error!("could not load board: {}", err);
        }
    }

    fn status_line(&self) -> String {
        let session = self.game.session();
        match self.game.phase() {
            game::Phase::Loading => "Loading cards...".to_string(),
            _ => format!(
                "Score: {} / {}    Best: {}",
                session.current_score(),
                session.difficulty().card_count(),
                self.game.high_score()
            ),
        }
    }

    fn view_end_screen(&self, ctx: &Context<Self>, outcome: game::Outcome) -> Html {
        let session = self.game.session();
        let title = match outcome {
            game::Outcome::Won => "You caught them all!",
            game::Outcome::Lost => "You clicked a card twice",
        };
        let final_score = session.final_score().unwrap_or_default();
        let picked = session.pending_difficulty().unwrap_or(session.difficulty());

        let cb_play_again = ctx.link().callback(|_: MouseEvent| Msg::PlayAgain);
        let cb_dismiss = ctx.link().callback(|_: MouseEvent| Msg::Dismiss);
        let cb_difficulty = ctx.link().callback(Msg::ChangeDifficulty);

        html! {
            <Overlay>
                <h2>{title}</h2>
                <p>{format!("Final score: {}", final_score)}</p>
                <p>{format!("Best score: {}", self.game.high_score())}</p>
                <DifficultyPicker value={picked} callback={cb_difficulty}/>
                <button onclick={cb_play_again}>{"Play again"}</button>
                <button onclick={cb_dismiss}>{"Close"}</button>
            </Overlay>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let config = WebConfig::load();
        let seed = ctx.props().seed.unwrap_or_else(random_seed);
        log::debug!("game seed: {}", seed);

        let feedback = AudioFeedback::new(config.audio.clone());
        let mut engine = Engine::new(LocalStore, feedback, config.game, seed);
        if let Some(difficulty) = ctx.props().difficulty {
            if let Err(err) = engine.change_difficulty(difficulty) {
                log::warn!("could not start at {}: {}", difficulty, err);
            }
        }

        let mut view = Self {
            game: engine,
            provider: game::CatalogProvider::new(seed.rotate_left(32)),
            last_tick: Instant::now(),
            _ticker: GameView::create_ticker(ctx, config.tick_ms),
        };
        view.load_pending_board();
        view
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let updated = match msg {
            Click(index) => match self.game.click(index) {
                Ok(outcome) => {
                    log::debug!("click on {}: {:?}", index, outcome);
                    true
                }
                Err(err) => {
                    log::debug!("click on {} ignored: {}", index, err);
                    false
                }
            },
            ChangeDifficulty(difficulty) => match self.game.change_difficulty(difficulty) {
                Ok(outcome) => outcome != game::DifficultyOutcome::NoChange,
                Err(err) => {
                    log::debug!("difficulty change ignored: {}", err);
                    false
                }
            },
            PlayAgain => match self.game.play_again() {
                Ok(()) => true,
                Err(err) => {
                    log::debug!("play again ignored: {}", err);
                    false
                }
            },
            Dismiss => self.game.dismiss().is_ok(),
            ToggleMute => {
                let muted = self.game.toggle_mute();
                log::debug!("muted: {}", muted);
                true
            }
            Tick => {
                let now = Instant::now();
                let elapsed: Duration = now.duration_since(self.last_tick);
                self.last_tick = now;
                self.game.tick(elapsed) > 0
            }
        };

        if self.game.board_request().is_some() {
            self.load_pending_board();
            return true;
        }
        updated
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let session = self.game.session();
        let locked = session.is_locked();

        let board_class = classes!(
            "board",
            match session.last_result() {
                Some(game::ClickResult::Success) => Some("success"),
                Some(game::ClickResult::Error) => Some("error"),
                None => None,
            },
            locked.then_some("locked")
        );

        let cb_mute = ctx.link().callback(|_: MouseEvent| Msg::ToggleMute);
        let cb_difficulty = ctx.link().callback(Msg::ChangeDifficulty);
        let cb_click = ctx.link().callback(Msg::Click);

        html! {
            <div class="memoro">
                <nav>
                    <aside>{self.status_line()}</aside>
                    <DifficultyPicker value={session.difficulty()} callback={cb_difficulty}/>
                    <button onclick={cb_mute}>{if self.game.is_muted() { "Unmute" } else { "Mute" }}</button>
                </nav>
                <div class={board_class}>
                    {
                        for session.board().iter().enumerate().map(|(index, card)| html! {
                            <CardView
                                key={card.id()}
                                {index}
                                name={AttrValue::from(card.name().to_string())}
                                artwork={AttrValue::from(card.artwork().as_str().to_string())}
                                {locked}
                                callback={cb_click.clone()}
                            />
                        })
                    }
                </div>
                {
                    match self.game.phase() {
                        game::Phase::Terminal(outcome) => self.view_end_screen(ctx, outcome),
                        _ => html! {},
                    }
                }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        let canceled = self.game.teardown();
        log::debug!("canceled {} pending timers", canceled);
    }
}
