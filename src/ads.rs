//! Ad/monetization collaborator
//!
//! The host page may provide an ad SDK. Without one, relief actions are
//! granted directly.

/// Result of asking for a rewarded ad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardResponse {
    /// Reward earned immediately
    Granted,
    /// Ad is showing; the reward arrives later via `Session::reward_granted`
    Pending,
    /// No ad could be shown and no reward is due
    Declined,
}

pub trait AdProvider {
    /// Show a between-levels interstitial
    fn show_interstitial(&mut self);

    /// Ask for a rewarded ad that grants extra slots
    fn show_rewarded(&mut self) -> RewardResponse;
}

/// Provider that shows nothing and always rewards
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectGrant;

impl AdProvider for DirectGrant {
    fn show_interstitial(&mut self) {}

    fn show_rewarded(&mut self) -> RewardResponse {
        RewardResponse::Granted
    }
}
