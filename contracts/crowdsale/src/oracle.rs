use crate::errors::Error;
use ink::env::call::{build_call, ExecutionInput, Selector};
use ink::env::DefaultEnvironment;
use ink::primitives::AccountId;

/// Aggregator round layout: `(round_id, answer, started_at, updated_at, answered_in_round)`.
pub type RoundData = (u128, i128, u64, u64, u128);

/// A single reading from a price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub round_id: u128,
    pub answer: i128,
    pub decimals: u8,
    /// Block timestamp (ms) at which the answer was written.
    pub updated_at: u64,
    pub answered_in_round: u128,
}

impl Quote {
    pub fn from_round(decimals: u8, round: RoundData) -> Self {
        let (round_id, answer, _started_at, updated_at, answered_in_round) = round;
        Self {
            round_id,
            answer,
            decimals,
            updated_at,
            answered_in_round,
        }
    }

    /// The answer as an unsigned value, or `OracleUnavailable` when the
    /// quote is degenerate or older than `max_age` milliseconds at `now`.
    pub fn usable_answer(&self, now: u64, max_age: u64) -> Result<u128, Error> {
        if self.answer <= 0 || self.updated_at == 0 {
            return Err(Error::OracleUnavailable);
        }
        if self.answered_in_round < self.round_id {
            return Err(Error::OracleUnavailable);
        }
        if now.saturating_sub(self.updated_at) > max_age {
            return Err(Error::OracleUnavailable);
        }
        Ok(self.answer.unsigned_abs())
    }
}

/// Read-only access to an external price feed.
pub trait QuoteSource {
    fn latest_quote(&self) -> Result<Quote, Error>;
}

/// Cross-contract handle on an aggregator-style feed.
pub struct FeedRef {
    feed: AccountId,
}

impl FeedRef {
    pub fn new(feed: AccountId) -> Self {
        Self { feed }
    }

    fn decimals(&self) -> Result<u8, Error> {
        let result = build_call::<DefaultEnvironment>()
            .call(self.feed)
            .exec_input(ExecutionInput::new(Selector::new(ink::selector_bytes!(
                "decimals"
            ))))
            .returns::<u8>()
            .try_invoke();

        match result {
            Ok(Ok(decimals)) => Ok(decimals),
            _ => Err(Error::OracleUnavailable),
        }
    }

    fn latest_round_data(&self) -> Result<RoundData, Error> {
        let result = build_call::<DefaultEnvironment>()
            .call(self.feed)
            .exec_input(ExecutionInput::new(Selector::new(ink::selector_bytes!(
                "latest_round_data"
            ))))
            .returns::<RoundData>()
            .try_invoke();

        match result {
            Ok(Ok(round)) => Ok(round),
            _ => Err(Error::OracleUnavailable),
        }
    }
}

impl QuoteSource for FeedRef {
    fn latest_quote(&self) -> Result<Quote, Error> {
        let decimals = self.decimals()?;
        let round = self.latest_round_data()?;
        Ok(Quote::from_round(decimals, round))
    }
}
