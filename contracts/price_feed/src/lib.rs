#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod constants {
    pub const FEED_VERSION: u32 = 0;
}

pub use self::price_feed::{PriceFeed, PriceFeedRef};

/// Reference aggregator-style price feed.
///
/// Each `update_answer` opens a new round; readers fetch the most recent one
/// through `latest_round_data` as
/// `(round_id, answer, started_at, updated_at, answered_in_round)`.
/// Timestamps are block timestamps in milliseconds.
#[ink::contract]
mod price_feed {
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    /// `(answer, started_at, updated_at)` of a stored round.
    type Round = (i128, u64, u64);

    /// `(round_id, answer, started_at, updated_at, answered_in_round)`.
    pub type RoundData = (u128, i128, u64, u64, u128);

    #[ink(storage)]
    pub struct PriceFeed {
        owner: AccountId,
        decimals: u8,
        description: String,
        latest_round: u128,
        rounds: Mapping<u128, Round>,
    }

    #[ink(event)]
    pub struct AnswerUpdated {
        #[ink(topic)]
        round_id: u128,
        current: i128,
        updated_at: u64,
    }

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        NotOwner,
        RoundNotFound,
    }

    impl PriceFeed {
        /// Deploys the feed with round 1 holding `initial_answer`.
        #[ink(constructor)]
        pub fn new(decimals: u8, initial_answer: i128) -> Self {
            let mut feed = Self {
                owner: Self::env().caller(),
                decimals,
                description: String::from("reference price feed"),
                latest_round: 0,
                rounds: Mapping::default(),
            };
            feed.push_round(initial_answer);
            feed
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            self.decimals
        }

        #[ink(message)]
        pub fn description(&self) -> String {
            self.description.clone()
        }

        #[ink(message)]
        pub fn version(&self) -> u32 {
            crate::constants::FEED_VERSION
        }

        #[ink(message)]
        pub fn latest_round_data(&self) -> RoundData {
            let (answer, started_at, updated_at) =
                self.rounds.get(self.latest_round).unwrap_or_default();
            (self.latest_round, answer, started_at, updated_at, self.latest_round)
        }

        #[ink(message)]
        pub fn get_round_data(&self, round_id: u128) -> Result<RoundData, Error> {
            let (answer, started_at, updated_at) =
                self.rounds.get(round_id).ok_or(Error::RoundNotFound)?;
            Ok((round_id, answer, started_at, updated_at, round_id))
        }

        #[ink(message)]
        pub fn latest_answer(&self) -> i128 {
            self.latest_round_data().1
        }

        #[ink(message)]
        pub fn latest_round(&self) -> u128 {
            self.latest_round
        }

        #[ink(message)]
        pub fn update_answer(&mut self, answer: i128) -> Result<(), Error> {
            self.only_owner()?;
            self.push_round(answer);
            Ok(())
        }

        /// Overwrites a round with explicit timestamps, moving the head to
        /// it. Lets a test network present stale or back-dated answers.
        #[ink(message)]
        pub fn update_round_data(
            &mut self,
            round_id: u128,
            answer: i128,
            started_at: u64,
            updated_at: u64,
        ) -> Result<(), Error> {
            self.only_owner()?;
            self.latest_round = round_id;
            self.rounds.insert(round_id, &(answer, started_at, updated_at));
            self.env().emit_event(AnswerUpdated {
                round_id,
                current: answer,
                updated_at,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn get_owner(&self) -> AccountId {
            self.owner
        }

        fn push_round(&mut self, answer: i128) {
            let now = self.env().block_timestamp();
            self.latest_round = self.latest_round.saturating_add(1);
            self.rounds.insert(self.latest_round, &(answer, now, now));
            self.env().emit_event(AnswerUpdated {
                round_id: self.latest_round,
                current: answer,
                updated_at: now,
            });
        }

        fn only_owner(&self) -> Result<(), Error> {
            if self.env().caller() != self.owner {
                return Err(Error::NotOwner);
            }
            Ok(())
        }
    }

}
