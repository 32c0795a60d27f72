//! Session context
//!
//! Owns the game state and the collaborators that react to it. Front ends
//! construct one `Session` per play session and drive it every frame.

use crate::ads::{AdProvider, RewardResponse};
use crate::audio::{AudioSink, Silent, SoundEffect};
use crate::config::GameConfig;
use crate::sim::{GameEvent, GameState, TickInput, Viewport, tick};

pub struct Session {
    pub state: GameState,
    audio: Box<dyn AudioSink>,
    ads: Option<Box<dyn AdProvider>>,
    /// Rewarded ad is showing; extra slots are granted when it finishes
    relief_pending: bool,
}

impl Session {
    /// Session with silent audio and no ad provider
    pub fn new(config: GameConfig, viewport: Viewport, seed: u64) -> Self {
        Self {
            state: GameState::new(config, viewport, seed),
            audio: Box::new(Silent),
            ads: None,
            relief_pending: false,
        }
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_ads(mut self, ads: impl AdProvider + 'static) -> Self {
        self.ads = Some(Box::new(ads));
        self
    }

    pub fn relief_pending(&self) -> bool {
        self.relief_pending
    }

    /// Tick the game and route the resulting events. Returns them for the
    /// renderer/HUD.
    pub fn frame(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        tick(&mut self.state, input, dt);
        self.flush()
    }

    /// Extra-slots relief: via a rewarded ad when a provider exists,
    /// otherwise granted directly
    pub fn request_extra_slots(&mut self) -> Vec<GameEvent> {
        if self.relief_pending || !self.state.extra_slots_available() {
            return Vec::new();
        }

        let response = match self.ads.as_mut() {
            Some(ads) => ads.show_rewarded(),
            None => RewardResponse::Granted,
        };

        match response {
            RewardResponse::Granted => {
                self.state.grant_extra_slots();
            }
            RewardResponse::Pending => {
                log::info!("Waiting for rewarded ad");
                self.relief_pending = true;
            }
            RewardResponse::Declined => {
                log::warn!("Rewarded ad unavailable, no extra slots granted");
            }
        }
        self.flush()
    }

    /// The rewarded ad finished and earned its reward
    pub fn reward_granted(&mut self) -> Vec<GameEvent> {
        if !self.relief_pending {
            log::warn!("Reward granted with no pending request");
            return Vec::new();
        }
        self.relief_pending = false;
        self.state.grant_extra_slots();
        self.flush()
    }

    /// The rewarded ad was closed early or failed
    pub fn reward_declined(&mut self) {
        self.relief_pending = false;
    }

    fn flush(&mut self) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        for event in &events {
            self.dispatch(event);
        }
        events
    }

    fn dispatch(&mut self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.audio.play(effect);
        }

        match event {
            GameEvent::Paused => self.audio.set_muted(true),
            GameEvent::Resumed | GameEvent::Restarted => self.audio.set_muted(false),
            GameEvent::ShowInterstitial { level } => {
                if let Some(ads) = self.ads.as_mut() {
                    log::info!("Showing interstitial before level {}", level);
                    ads.show_interstitial();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::DirectGrant;
    use crate::sim::GamePhase;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        sounds: Vec<SoundEffect>,
        muted: bool,
        interstitials: u32,
    }

    struct RecordingAudio(Rc<RefCell<Log>>);

    impl AudioSink for RecordingAudio {
        fn play(&mut self, effect: SoundEffect) {
            self.0.borrow_mut().sounds.push(effect);
        }
        fn set_muted(&mut self, muted: bool) {
            self.0.borrow_mut().muted = muted;
        }
    }

    struct ScriptedAds {
        log: Rc<RefCell<Log>>,
        response: RewardResponse,
    }

    impl AdProvider for ScriptedAds {
        fn show_interstitial(&mut self) {
            self.log.borrow_mut().interstitials += 1;
        }
        fn show_rewarded(&mut self) -> RewardResponse {
            self.response
        }
    }

    fn started(session: &mut Session) {
        session.state.start_game();
        session.state.drain_events();
    }

    fn fill_two_slots(session: &mut Session) {
        for id in session.state.screws.ids().into_iter().take(2) {
            let screw = session.state.screws.get_mut(id).unwrap();
            session.state.slots.try_place(screw);
        }
    }

    #[test]
    fn test_pause_mutes_audio() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3)
            .with_audio(RecordingAudio(log.clone()));
        started(&mut session);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        session.frame(&pause, 0.016);
        assert!(log.borrow().muted);
        session.frame(&pause, 0.016);
        assert!(!log.borrow().muted);
    }

    #[test]
    fn test_tap_plays_unscrew() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3)
            .with_audio(RecordingAudio(log.clone()));
        started(&mut session);

        let id = session.state.screws.ids()[0];
        let tap = TickInput {
            tap: Some(session.state.screws.get(id).unwrap().pos),
            ..Default::default()
        };
        session.frame(&tap, 0.016);
        assert_eq!(log.borrow().sounds, vec![SoundEffect::Unscrew]);
    }

    #[test]
    fn test_extra_slots_without_provider_grants_directly() {
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3);
        started(&mut session);
        fill_two_slots(&mut session);

        let events = session.request_extra_slots();
        assert!(events.contains(&GameEvent::ExtraSlotsGranted { released: 2 }));
        assert!(session.state.slots.is_empty());
        assert_eq!(session.state.screws.len(), 4);
    }

    #[test]
    fn test_direct_grant_provider_rewards_immediately() {
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3)
            .with_ads(DirectGrant);
        started(&mut session);
        fill_two_slots(&mut session);

        let events = session.request_extra_slots();
        assert!(!session.relief_pending());
        assert!(events.contains(&GameEvent::ExtraSlotsGranted { released: 2 }));
    }

    #[test]
    fn test_pending_reward_grants_later() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3)
            .with_ads(ScriptedAds {
                log,
                response: RewardResponse::Pending,
            });
        started(&mut session);
        fill_two_slots(&mut session);

        assert!(session.request_extra_slots().is_empty());
        assert!(session.relief_pending());
        assert_eq!(session.state.slots.occupied_count(), 2);

        session.reward_granted();
        assert!(!session.relief_pending());
        assert!(session.state.slots.is_empty());
    }

    #[test]
    fn test_extra_slots_lifts_game_over() {
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3);
        started(&mut session);
        fill_two_slots(&mut session);
        session.state.health = 0;
        session.state.check_game_over();
        assert_eq!(session.state.phase, GamePhase::GameOver);

        session.request_extra_slots();
        assert_eq!(session.state.phase, GamePhase::Playing);
        assert_eq!(session.state.health, 1);
    }

    #[test]
    fn test_no_rewarded_ad_once_time_is_up() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3)
            .with_ads(ScriptedAds {
                log,
                response: RewardResponse::Pending,
            });
        started(&mut session);
        fill_two_slots(&mut session);
        session.state.time_remaining = 0.0;
        session.state.check_game_over();

        assert!(session.request_extra_slots().is_empty());
        assert!(!session.relief_pending());
        assert_eq!(session.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_interstitial_forwarded_to_provider() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = Session::new(GameConfig::default(), Viewport::new(400.0, 700.0), 3)
            .with_ads(ScriptedAds {
                log: log.clone(),
                response: RewardResponse::Granted,
            });
        started(&mut session);
        for screw in session.state.screws.iter_mut() {
            screw.in_slot = true;
        }
        session.state.check_level_complete();
        session.frame(&TickInput::default(), 0.016);
        assert_eq!(log.borrow().interstitials, 1);
    }
}
