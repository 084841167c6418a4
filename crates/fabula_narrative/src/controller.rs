//! The surface front-ends drive.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fabula_core::{FabulaConfig, GameState, Scene};
use fabula_interface::{ImageDriver, StoryDriver};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::illustration::IllustrationResolver;
use crate::session::ConversationSession;

/// Runs one adventure at a time and publishes its [`GameState`].
///
/// Scene requests are serialized through an async mutex around the session.
/// Illustrations are resolved on detached tasks and written into the state
/// whenever they complete. With `illustration.discard_stale` set, results
/// belonging to a superseded scene are dropped instead.
pub struct GameController {
    story: Arc<dyn StoryDriver>,
    illustrations: IllustrationResolver,
    config: FabulaConfig,
    session: Mutex<Option<ConversationSession>>,
    state: Arc<watch::Sender<GameState>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for GameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameController")
            .field("story_model", &self.story.model_name())
            .field("illustrations", &self.illustrations)
            .field("status", self.state.borrow().status())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl GameController {
    /// Create a controller in the start state.
    pub fn new(
        story: Arc<dyn StoryDriver>,
        images: Arc<dyn ImageDriver>,
        config: &FabulaConfig,
    ) -> Self {
        let (state, _) = watch::channel(GameState::start());
        Self {
            story,
            illustrations: IllustrationResolver::new(images, config),
            config: config.clone(),
            session: Mutex::new(None),
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> GameState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state.subscribe()
    }

    /// Whether an adventure is in progress.
    pub async fn is_active(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(ConversationSession::is_active)
    }

    /// Start a fresh adventure, replacing any previous one.
    #[instrument(skip(self))]
    pub async fn start_game(&self, theme: &str) {
        let mut session = self.session.lock().await;
        let generation = self.enter_loading();

        let mut fresh = ConversationSession::new(Arc::clone(&self.story), &self.config);
        match fresh.start(theme).await {
            Ok(scene) => {
                *session = Some(fresh);
                self.show_scene(scene, generation);
            }
            Err(e) => {
                warn!(error = %e, "Adventure failed to start");
                *session = None;
                self.state.send_replace(GameState::failed(e.user_message()));
            }
        }
    }

    /// Continue the adventure with a choice.
    ///
    /// Does nothing, and sends nothing, when no adventure is in progress.
    #[instrument(skip(self))]
    pub async fn make_choice(&self, choice: &str) {
        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut().filter(|s| s.is_active()) else {
            debug!("No adventure in progress, ignoring choice");
            return;
        };

        let previous = self.state();
        let generation = self.enter_loading();

        match session.advance(choice).await {
            Ok(Some(scene)) => self.show_scene(scene, generation),
            Ok(None) => {
                self.state.send_replace(previous);
            }
            Err(e) => {
                warn!(error = %e, "Scene request failed");
                self.state.send_replace(GameState::failed(e.user_message()));
            }
        }
    }

    /// Discard the adventure and return to the start state.
    #[instrument(skip(self))]
    pub async fn reset_game(&self) {
        let mut session = self.session.lock().await;
        *session = None;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(GameState::start());
        info!("Game reset");
    }

    fn enter_loading(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(GameState::loading());
        generation
    }

    fn show_scene(&self, scene: Scene, generation: u64) {
        let description = scene.description().clone();
        self.state.send_replace(GameState::playing(scene));

        let resolver = self.illustrations.clone();
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let discard_stale = self.config.illustration.discard_stale;

        tokio::spawn(async move {
            let Some(reference) = resolver.request_illustration(&description).await else {
                return;
            };

            if discard_stale && current.load(Ordering::SeqCst) != generation {
                debug!(generation, "Dropping illustration for superseded scene");
                return;
            }

            state.send_modify(|state| state.set_image_ref(reference));
        });
    }
}
