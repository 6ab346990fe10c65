use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use core::time::Duration;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickResult {
    Success,
    Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    /// A repeated card was clicked; input is locked until the loss commits.
    TerminalPending,
    Terminal(Outcome),
}

impl Phase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Revealed,
    Won,
    Repeated,
}

impl ClickOutcome {
    pub const fn ends_game(self) -> bool {
        matches!(self, Self::Won | Self::Repeated)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DifficultyOutcome {
    NoChange,
    /// A new session was started and is waiting for its board.
    Reloading,
    /// Stored for the next game; the end screen stays as it is.
    Deferred,
}

/// Board wanted by a loading session. Answer it with [`MemoryGame::install_board`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoardRequest {
    pub session: SessionId,
    pub difficulty: Difficulty,
}

/// One playthrough, from board request to the next board request.
///
/// Only [`MemoryGame`] builds or changes one, so the score always matches the
/// history and the lock always matches the phase.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    id: SessionId,
    board: Board,
    loading: bool,
    history: BTreeSet<CardId>,
    current_score: Score,
    difficulty: Difficulty,
    pending_difficulty: Option<Difficulty>,
    last_result: Option<ClickResult>,
    terminal: Option<Outcome>,
    final_score: Option<Score>,
    guard: Guard,
}

impl Session {
    fn loading(id: SessionId, difficulty: Difficulty) -> Self {
        Self {
            id,
            board: Board::default(),
            loading: true,
            history: BTreeSet::new(),
            current_score: 0,
            difficulty,
            pending_difficulty: None,
            last_result: None,
            terminal: None,
            final_score: None,
            guard: Guard::Open,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Ids revealed since the last reset.
    pub fn history(&self) -> &BTreeSet<CardId> {
        &self.history
    }

    pub fn current_score(&self) -> Score {
        self.current_score
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn pending_difficulty(&self) -> Option<Difficulty> {
        self.pending_difficulty
    }

    pub fn last_result(&self) -> Option<ClickResult> {
        self.last_result
    }

    pub fn terminal(&self) -> Option<Outcome> {
        self.terminal
    }

    /// Score frozen at the moment the game ended.
    pub fn final_score(&self) -> Option<Score> {
        self.final_score
    }

    pub fn guard(&self) -> Guard {
        self.guard
    }

    pub fn is_locked(&self) -> bool {
        self.guard.is_locked()
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if let Some(outcome) = self.terminal {
            Phase::Terminal(outcome)
        } else if self.guard.is_locked() {
            Phase::TerminalPending
        } else {
            Phase::Ready
        }
    }
}

fn history_score(history: &BTreeSet<CardId>) -> Score {
    Score::try_from(history.len()).unwrap_or(Score::MAX)
}

/// The game state machine: the only writer of the current [`Session`].
///
/// Every entry point takes `&mut self` and runs to completion, so a lock set
/// inside one call is visible to the very next one. Deferred feedback lives in
/// the scheduler and only runs from [`MemoryGame::tick`].
pub struct MemoryGame<S, F> {
    session: Session,
    high_score: Score,
    config: GameConfig,
    scheduler: FeedbackScheduler,
    flash_timer: Option<TimerId>,
    feedback: Feedback<F>,
    store: S,
    rng: SmallRng,
}

impl<S: Store, F: FeedbackSink> MemoryGame<S, F> {
    /// Restores preferences from `store` and starts loading the first board.
    pub fn new(store: S, sink: F, config: GameConfig, seed: u64) -> Self {
        let prefs = Preferences::load(&store);
        log::info!(
            "starting at {} with high score {}{}",
            prefs.difficulty,
            prefs.high_score,
            if prefs.muted { ", muted" } else { "" }
        );

        Self {
            session: Session::loading(SessionId::new(1), prefs.difficulty),
            high_score: prefs.high_score,
            config,
            scheduler: FeedbackScheduler::new(),
            flash_timer: None,
            feedback: Feedback::new(sink, prefs.muted),
            store,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn high_score(&self) -> Score {
        self.high_score
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &FeedbackScheduler {
        &self.scheduler
    }

    pub fn is_muted(&self) -> bool {
        self.feedback.is_muted()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &F {
        self.feedback.sink()
    }

    pub fn board_request(&self) -> Option<BoardRequest> {
        self.session.loading.then_some(BoardRequest {
            session: self.session.id,
            difficulty: self.session.difficulty,
        })
    }

    /// Hands a generated board to the session that asked for it.
    pub fn install_board(&mut self, request: BoardRequest, board: Board) -> Result<()> {
        if request.session != self.session.id || !self.session.loading {
            log::debug!("dropping board for superseded session {}", request.session);
            return Err(GameError::StaleBoard);
        }

        let expected = self.session.difficulty.card_count();
        if board.len() != usize::from(expected) {
            log::error!(
                "board for session {} has {} cards, expected {}",
                request.session,
                board.len(),
                expected
            );
            return Err(GameError::BoardSizeMismatch {
                expected,
                actual: board.len(),
            });
        }

        if let Err(err) = board.validate() {
            log::error!("refusing board for session {}: {}", request.session, err);
            return Err(err);
        }

        let session = &mut self.session;
        session.board = board;
        session.loading = false;
        session.history.clear();
        session.current_score = 0;
        session.guard.release();
        log::info!(
            "session {} ready with {} cards ({})",
            session.id,
            session.board.len(),
            session.difficulty
        );

        for card in self.session.board.iter() {
            self.feedback.preload_card_cue(card.name());
        }
        Ok(())
    }

    /// Generates and installs the pending board, if any.
    pub fn load_board<P: CardProvider + ?Sized>(&mut self, provider: &mut P) -> Result<()> {
        let Some(request) = self.board_request() else {
            return Ok(());
        };
        let board = RandomBoardGenerator::new(self.rng.random()).generate(request.difficulty, provider);
        self.install_board(request, board)
    }

    pub fn click(&mut self, index: usize) -> Result<ClickOutcome> {
        self.session.guard.enter(Entry::Click)?;
        if self.session.loading {
            return Err(GameError::NotReady);
        }

        let card = self
            .session
            .board
            .get(index)
            .ok_or(GameError::InvalidIndex(index))?;
        let id = card.id();
        let name = card.name().to_string();

        if let Some(timer) = self.flash_timer.take() {
            self.scheduler.cancel(timer);
        }

        let outcome = if self.session.history.contains(&id) {
            self.repeat(name)
        } else {
            self.reveal(index, id, name)
        };
        Ok(outcome)
    }

    fn repeat(&mut self, card_name: String) -> ClickOutcome {
        let session = &mut self.session;
        session.guard.lock();
        session.final_score = Some(session.current_score);
        session.last_result = Some(ClickResult::Error);
        session.history.clear();
        session.board.shuffle(&mut self.rng);
        log::info!(
            "session {}: {} was already picked, final score {}",
            session.id,
            card_name,
            session.current_score
        );

        let id = session.id;
        let timing = self.config.timing;
        self.feedback.cue(Cue::Error);
        self.flash_timer = Some(self.scheduler.schedule(
            id,
            timing.error_flash(),
            ScheduledAction::ClearLastResult,
        ));
        self.scheduler.schedule(
            id,
            timing.defeat_cue_delay(),
            ScheduledAction::CardCue {
                name: card_name,
                defeat: true,
            },
        );
        self.scheduler
            .schedule(id, timing.loss_commit_delay(), ScheduledAction::Cue(Cue::Lose));
        self.scheduler
            .schedule(id, timing.loss_commit_delay(), ScheduledAction::CommitLoss);

        ClickOutcome::Repeated
    }

    fn reveal(&mut self, index: usize, id: CardId, card_name: String) -> ClickOutcome {
        let session = &mut self.session;
        session.history.insert(id);
        if let Some(card) = session.board.card_mut(index) {
            card.reveal();
        }
        session.board.shuffle(&mut self.rng);
        session.current_score = history_score(&session.history);
        session.last_result = Some(ClickResult::Success);

        let score = session.current_score;
        let won = score == session.difficulty.card_count();
        if won {
            session.guard.lock();
            session.final_score = Some(score);
            session.terminal = Some(Outcome::Won);
            log::info!("session {}: all {} cards remembered", session.id, score);
        }

        if score > self.high_score {
            self.high_score = score;
            save_high_score(&mut self.store, score);
        }

        let session_id = self.session.id;
        self.feedback.card_cue(&card_name, false);
        self.flash_timer = Some(self.scheduler.schedule(
            session_id,
            self.config.timing.success_flash(),
            ScheduledAction::ClearLastResult,
        ));

        if won {
            self.feedback.cue(Cue::Win);
            ClickOutcome::Won
        } else {
            ClickOutcome::Revealed
        }
    }

    pub fn change_difficulty(&mut self, difficulty: Difficulty) -> Result<DifficultyOutcome> {
        if self.session.guard.is_locked() && self.session.terminal.is_some() {
            log::debug!("difficulty {} deferred to the next game", difficulty);
            self.session.pending_difficulty = Some(difficulty);
            return Ok(DifficultyOutcome::Deferred);
        }
        self.session.guard.enter(Entry::ChangeDifficulty)?;

        if difficulty == self.session.difficulty {
            return Ok(DifficultyOutcome::NoChange);
        }

        save_difficulty(&mut self.store, difficulty);
        self.start_session(difficulty);
        Ok(DifficultyOutcome::Reloading)
    }

    /// Starts over, applying a difficulty picked on the end screen.
    pub fn play_again(&mut self) -> Result<()> {
        if self.session.terminal.is_none() {
            self.session.guard.enter(Entry::PlayAgain)?;
        }

        let difficulty = match self.session.pending_difficulty.take() {
            Some(pending) => {
                if pending != self.session.difficulty {
                    save_difficulty(&mut self.store, pending);
                }
                pending
            }
            None => self.session.difficulty,
        };
        self.start_session(difficulty);
        Ok(())
    }

    /// Closes the end screen without starting a new game.
    pub fn dismiss(&mut self) -> Result<()> {
        if self.session.terminal.is_none() {
            self.session.guard.enter(Entry::Dismiss)?;
            return Err(GameError::NotTerminal);
        }

        let session = &mut self.session;
        session.terminal = None;
        session.final_score = None;
        session.guard.release();
        Ok(())
    }

    /// Not gameplay, so never blocked by the guard. Returns the new mute state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.feedback.is_muted();
        self.feedback.set_muted(muted);
        save_muted(&mut self.store, muted);
        self.feedback.cue(Cue::Click);
        muted
    }

    /// Moves the feedback clock forward and runs whatever came due.
    /// Returns how many scheduled actions ran.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        self.scheduler.advance(elapsed);

        let mut fired = 0;
        while let Some(due) = self.scheduler.pop_due() {
            if due.session != self.session.id {
                log::debug!("dropping {:?} of superseded session {}", due.id, due.session);
                continue;
            }
            self.apply(due.action);
            fired += 1;
        }
        fired
    }

    /// Cancels all outstanding feedback, e.g. when the host goes away.
    pub fn teardown(&mut self) -> usize {
        self.flash_timer = None;
        self.scheduler.cancel_all()
    }

    fn apply(&mut self, action: ScheduledAction) {
        match action {
            ScheduledAction::Cue(cue) => self.feedback.cue(cue),
            ScheduledAction::CardCue { name, defeat } => self.feedback.card_cue(&name, defeat),
            ScheduledAction::CommitLoss => {
                let session = &mut self.session;
                session.current_score = 0;
                session.terminal = Some(Outcome::Lost);
                log::info!("session {} lost", session.id);
            }
            ScheduledAction::ClearLastResult => {
                self.flash_timer = None;
                self.session.last_result = None;
            }
        }
    }

    fn start_session(&mut self, difficulty: Difficulty) {
        let previous = self.session.id;
        self.scheduler.cancel_session(previous);
        self.flash_timer = None;

        let id = previous.next();
        log::info!("session {} replaces {} at {}", id, previous, difficulty);
        self.session = Session::loading(id, difficulty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    type TestGame = MemoryGame<MemoryStore, RecordingFeedback>;

    fn game_with(store: MemoryStore) -> TestGame {
        let mut game = MemoryGame::new(store, RecordingFeedback::new(), GameConfig::default(), 17);
        game.load_board(&mut CatalogProvider::new(3)).unwrap();
        game
    }

    fn game_at(difficulty: Difficulty) -> TestGame {
        let mut store = MemoryStore::new();
        store.set_string(DIFFICULTY_KEY, difficulty.as_str()).unwrap();
        game_with(store)
    }

    fn click_id(game: &mut TestGame, id: CardId) -> Result<ClickOutcome> {
        let index = game.session().board().position_of(id).unwrap();
        game.click(index)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn new_game_loads_stored_difficulty() {
        let mut store = MemoryStore::new();
        store.set_string(DIFFICULTY_KEY, "hard").unwrap();
        let game = MemoryGame::new(store, SilentFeedback, GameConfig::default(), 1);

        assert_eq!(game.phase(), Phase::Loading);
        assert_eq!(
            game.board_request(),
            Some(BoardRequest {
                session: game.session().id(),
                difficulty: Difficulty::Hard,
            })
        );
    }

    #[test]
    fn installed_board_preloads_its_card_cues() {
        let game = game_at(Difficulty::Easy);

        let mut preloaded = game.sink().preloaded.clone();
        let mut names: Vec<_> = game.session().board().iter().map(|card| card.name().to_string()).collect();
        preloaded.sort_unstable();
        names.sort_unstable();
        assert_eq!(preloaded, names);
        assert!(game.sink().events.is_empty());
    }

    #[test]
    fn clicks_are_rejected_while_loading() {
        let mut game = MemoryGame::new(MemoryStore::new(), SilentFeedback, GameConfig::default(), 1);

        assert_eq!(game.click(0), Err(GameError::NotReady));
    }

    #[test]
    fn out_of_range_click_is_rejected() {
        let mut game = game_at(Difficulty::Easy);

        assert_eq!(game.click(8), Err(GameError::InvalidIndex(8)));
        assert_eq!(game.session().current_score(), 0);
    }

    #[test]
    fn distinct_clicks_count_up_and_raise_high_score() {
        let mut game = game_at(Difficulty::Medium);

        for (k, id) in (0..5).enumerate() {
            assert_eq!(click_id(&mut game, id), Ok(ClickOutcome::Revealed));
            assert_eq!(usize::from(game.session().current_score()), k + 1);
        }

        assert_eq!(game.high_score(), 5);
        assert_eq!(game.store().get_int(HIGH_SCORE_KEY), Ok(Some(5)));
        assert_eq!(game.session().last_result(), Some(ClickResult::Success));
        assert_eq!(game.session().board().revealed_count(), 5);
    }

    #[test]
    fn every_click_reshuffles_the_board() {
        let mut game = game_at(Difficulty::Hard);
        let before: Vec<_> = game.session().board().ids().collect();

        game.click(0).unwrap();

        let after: Vec<_> = game.session().board().ids().collect();
        assert_ne!(before, after);
        let mut sorted = after.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<CardId>>());
    }

    #[test]
    fn repeated_card_locks_before_any_timer_fires() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 4).unwrap();
        click_id(&mut game, 7).unwrap();

        assert_eq!(click_id(&mut game, 4), Ok(ClickOutcome::Repeated));

        let session = game.session();
        assert!(session.is_locked());
        assert_eq!(game.phase(), Phase::TerminalPending);
        assert_eq!(session.final_score(), Some(2));
        assert_eq!(session.current_score(), 2);
        assert_eq!(session.last_result(), Some(ClickResult::Error));
        assert!(session.history().is_empty());
        assert_eq!(session.terminal(), None);
    }

    #[test]
    fn locked_session_ignores_clicks_and_difficulty_changes() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 1).unwrap();
        click_id(&mut game, 1).unwrap();
        let snapshot = game.session().clone();

        assert_eq!(game.click(0), Err(GameError::Locked));
        assert_eq!(game.change_difficulty(Difficulty::Easy), Err(GameError::Locked));
        assert_eq!(game.play_again(), Err(GameError::Locked));
        assert_eq!(game.dismiss(), Err(GameError::Locked));
        assert_eq!(game.session(), &snapshot);
    }

    #[test]
    fn loss_commits_after_the_feedback_delays() {
        let mut game = game_at(Difficulty::Medium);
        let name = {
            let board = game.session().board();
            board[board.position_of(3).unwrap()].name().to_string()
        };
        click_id(&mut game, 3).unwrap();
        click_id(&mut game, 3).unwrap();

        game.tick(ms(499));
        assert_eq!(game.session().last_result(), None);
        assert!(!game.sink().events.iter().any(|event| matches!(event, FeedbackEvent::CardCue { defeat: true, .. })));

        game.tick(ms(1));
        assert!(game.sink().events.contains(&FeedbackEvent::CardCue {
            name: name.clone(),
            defeat: true,
        }));
        assert_eq!(game.session().terminal(), None);

        game.tick(ms(1000));
        assert_eq!(game.phase(), Phase::Terminal(Outcome::Lost));
        assert_eq!(game.session().current_score(), 0);
        assert_eq!(game.session().final_score(), Some(1));
        assert_eq!(game.high_score(), 1);
        assert!(game.scheduler().is_empty());

        assert_eq!(
            game.sink().events,
            [
                FeedbackEvent::CardCue {
                    name: name.clone(),
                    defeat: false,
                },
                FeedbackEvent::Cue(Cue::Error),
                FeedbackEvent::CardCue { name, defeat: true },
                FeedbackEvent::Cue(Cue::Lose),
            ]
        );
    }

    #[test]
    fn clicking_every_card_once_wins() {
        let mut game = game_at(Difficulty::Easy);

        for id in 0..7 {
            assert_eq!(click_id(&mut game, id), Ok(ClickOutcome::Revealed));
        }
        assert_eq!(click_id(&mut game, 7), Ok(ClickOutcome::Won));

        assert_eq!(game.phase(), Phase::Terminal(Outcome::Won));
        assert_eq!(game.session().current_score(), 8);
        assert_eq!(game.session().final_score(), Some(8));
        assert!(game.session().is_locked());
        assert_eq!(game.sink().cues().collect::<Vec<_>>(), [Cue::Win]);
        assert_eq!(game.click(0), Err(GameError::Locked));
    }

    #[test]
    fn play_again_cancels_timers_of_the_old_session() {
        let mut game = game_at(Difficulty::Easy);
        for id in 0..8 {
            click_id(&mut game, id).unwrap();
        }
        let old = game.session().id();
        assert_eq!(game.scheduler().pending_for(old), 1);

        game.play_again().unwrap();
        assert_eq!(game.scheduler().pending_for(old), 0);
        game.load_board(&mut CatalogProvider::new(4)).unwrap();

        let session = game.session();
        assert_ne!(session.id(), old);
        assert_eq!(session.current_score(), 0);
        assert!(session.history().is_empty());
        assert!(!session.is_locked());
        assert_eq!(session.final_score(), None);
        assert_eq!(session.terminal(), None);
        assert_eq!(game.high_score(), 8);
    }

    #[test]
    fn flash_timer_from_a_replaced_session_does_not_clear_the_new_one() {
        let mut game = game_at(Difficulty::Easy);
        click_id(&mut game, 0).unwrap();

        assert_eq!(game.change_difficulty(Difficulty::Hard), Ok(DifficultyOutcome::Reloading));
        game.load_board(&mut CatalogProvider::new(4)).unwrap();
        game.tick(ms(300));
        click_id(&mut game, 0).unwrap();

        // the first session's flash would have fired at 700ms
        game.tick(ms(500));
        assert_eq!(game.session().last_result(), Some(ClickResult::Success));

        game.tick(ms(200));
        assert_eq!(game.session().last_result(), None);
    }

    #[test]
    fn new_click_restarts_the_flash() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 0).unwrap();
        game.tick(ms(600));
        click_id(&mut game, 1).unwrap();

        game.tick(ms(500));
        assert_eq!(game.session().last_result(), Some(ClickResult::Success));
        assert_eq!(game.scheduler().len(), 1);
    }

    #[test]
    fn difficulty_change_restarts_and_persists() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 2).unwrap();

        assert_eq!(game.change_difficulty(Difficulty::Medium), Ok(DifficultyOutcome::NoChange));
        assert_eq!(game.session().current_score(), 1);

        assert_eq!(game.change_difficulty(Difficulty::Easy), Ok(DifficultyOutcome::Reloading));
        assert_eq!(game.phase(), Phase::Loading);
        assert_eq!(game.session().current_score(), 0);
        assert_eq!(
            game.store().get_string(DIFFICULTY_KEY),
            Ok(Some("easy".to_string()))
        );

        game.load_board(&mut CatalogProvider::new(8)).unwrap();
        assert_eq!(game.session().board().len(), 8);
    }

    #[test]
    fn end_screen_difficulty_is_applied_on_play_again() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 5).unwrap();
        click_id(&mut game, 5).unwrap();
        game.tick(ms(5000));
        assert_eq!(game.phase(), Phase::Terminal(Outcome::Lost));

        assert_eq!(game.change_difficulty(Difficulty::Hard), Ok(DifficultyOutcome::Deferred));
        assert_eq!(game.session().pending_difficulty(), Some(Difficulty::Hard));
        assert_eq!(game.phase(), Phase::Terminal(Outcome::Lost));
        assert_eq!(game.session().difficulty(), Difficulty::Medium);

        game.play_again().unwrap();
        assert_eq!(game.board_request().map(|request| request.difficulty), Some(Difficulty::Hard));
        assert_eq!(game.session().pending_difficulty(), None);
        assert_eq!(
            game.store().get_string(DIFFICULTY_KEY),
            Ok(Some("hard".to_string()))
        );
    }

    #[test]
    fn stale_board_is_rejected() {
        let mut game = MemoryGame::new(MemoryStore::new(), SilentFeedback, GameConfig::default(), 1);
        let stale = game.board_request().unwrap();
        game.change_difficulty(Difficulty::Easy).unwrap();

        let board = RandomBoardGenerator::new(1).generate(Difficulty::Medium, &mut CatalogProvider::new(1));
        assert_eq!(game.install_board(stale, board), Err(GameError::StaleBoard));
        assert_eq!(game.phase(), Phase::Loading);
    }

    #[test]
    fn wrong_sized_board_is_rejected() {
        let mut game = MemoryGame::new(MemoryStore::new(), SilentFeedback, GameConfig::default(), 1);
        let request = game.board_request().unwrap();

        let board = RandomBoardGenerator::new(1).generate(Difficulty::Easy, &mut CatalogProvider::new(1));
        assert_eq!(
            game.install_board(request, board),
            Err(GameError::BoardSizeMismatch {
                expected: 12,
                actual: 8
            })
        );
    }

    #[test]
    fn board_with_duplicate_ids_is_rejected() {
        let mut game = MemoryGame::new(MemoryStore::new(), SilentFeedback, GameConfig::default(), 1);
        let request = game.board_request().unwrap();
        let cards: Vec<_> = (0..12)
            .map(|i| serde_json::json!({"id": i % 6, "name": "x", "artwork": "y", "revealed": false}))
            .collect();
        let board: Board = serde_json::from_value(serde_json::json!({ "cards": cards })).unwrap();

        assert_eq!(game.install_board(request, board), Err(GameError::DuplicateCardId(0)));
        assert_eq!(game.phase(), Phase::Loading);
    }

    #[test]
    fn dismiss_unlocks_without_touching_score() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 0).unwrap();
        click_id(&mut game, 1).unwrap();
        click_id(&mut game, 0).unwrap();
        game.tick(ms(5000));

        game.dismiss().unwrap();

        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.session().current_score(), 0);
        assert_eq!(game.session().final_score(), None);
        // the revealed flag survives but only history decides repeats
        assert_eq!(click_id(&mut game, 0), Ok(ClickOutcome::Revealed));
        assert_eq!(game.session().current_score(), 1);
    }

    #[test]
    fn dismiss_outside_end_screen_is_an_error() {
        let mut game = game_at(Difficulty::Easy);

        assert_eq!(game.dismiss(), Err(GameError::NotTerminal));
    }

    #[test]
    fn mute_is_persisted_and_never_locked() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 0).unwrap();
        click_id(&mut game, 0).unwrap();

        assert!(game.toggle_mute());
        assert_eq!(game.store().get_bool(SOUND_MUTED_KEY), Ok(Some(true)));
        game.tick(ms(5000));
        assert_eq!(game.phase(), Phase::Terminal(Outcome::Lost));
        assert!(!game.sink().cues().any(|cue| cue == Cue::Lose));

        assert!(!game.toggle_mute());
        assert_eq!(game.sink().cues().last(), Some(Cue::Click));
    }

    #[test]
    fn high_score_survives_sessions_and_restarts() {
        let mut store = MemoryStore::new();
        store.set_int(HIGH_SCORE_KEY, 3).unwrap();
        let mut game = game_with(store);
        assert_eq!(game.high_score(), 3);

        click_id(&mut game, 0).unwrap();
        click_id(&mut game, 1).unwrap();
        assert_eq!(game.high_score(), 3);
        click_id(&mut game, 2).unwrap();
        click_id(&mut game, 3).unwrap();
        assert_eq!(game.high_score(), 4);

        click_id(&mut game, 3).unwrap();
        game.tick(ms(5000));
        game.play_again().unwrap();
        game.load_board(&mut CatalogProvider::new(1)).unwrap();
        click_id(&mut game, 0).unwrap();

        assert_eq!(game.high_score(), 4);
        assert_eq!(game.store().get_int(HIGH_SCORE_KEY), Ok(Some(4)));
    }

    #[test]
    fn teardown_cancels_pending_commit() {
        let mut game = game_at(Difficulty::Medium);
        click_id(&mut game, 0).unwrap();
        click_id(&mut game, 0).unwrap();

        assert_eq!(game.teardown(), 4);
        assert_eq!(game.tick(ms(5000)), 0);
        assert_eq!(game.phase(), Phase::TerminalPending);
    }

    #[test]
    fn failing_cue_does_not_change_state() {
        let sink = RecordingFeedback {
            failing: vec![Cue::Error, Cue::Lose, Cue::Click],
            ..Default::default()
        };
        let mut game = MemoryGame::new(MemoryStore::new(), sink, GameConfig::default(), 5);
        game.load_board(&mut CatalogProvider::new(5)).unwrap();

        click_id(&mut game, 0).unwrap();
        click_id(&mut game, 0).unwrap();
        game.tick(ms(5000));

        assert_eq!(game.phase(), Phase::Terminal(Outcome::Lost));
        assert_eq!(game.session().final_score(), Some(1));
    }
}
