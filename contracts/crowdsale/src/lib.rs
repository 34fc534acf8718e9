#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod asset;
pub mod errors;
pub mod fixed_point;
pub mod oracle;
pub mod pricing;

pub mod constants {
    /// Multiplier used by `OracleRate` until the operator changes it.
    pub const DEFAULT_RATE: u128 = 1;

    /// Oldest acceptable price feed answer: one hour in milliseconds.
    pub const DEFAULT_MAX_QUOTE_AGE_MS: u64 = 3_600_000;

    /// Largest decimal count accepted for the sale token or a stable asset.
    pub const MAX_DECIMALS: u8 = 36;
}

pub use self::crowdsale::{Crowdsale, CrowdsaleRef};

/// # Crowdsale: token sale ledger
///
/// Sells a locally held reserve of sale tokens for either the chain's native
/// currency or an approved stable-value asset.
///
/// ```text
///   buyer ──native value──► [Crowdsale] ──allocation──► balances[buyer]
///     │                         │  ▲
///     │                         │  └── latest_round_data() ── [price_feed]
///     └──approve──► [stable_token] ◄── transfer_from(buyer, treasury)
/// ```
///
/// ## Pricing
///
/// `price` is an 18-decimal fixed-point amount of payment per whole sale
/// token. Payments are normalized to 18 decimals and the allocation in raw
/// token units is `floor(payment * 10^token_decimals / price)`.
///
/// Native payments use one of two explicit modes:
/// - `Direct`: the native amount is itself in price units.
/// - `OracleRate`: the native amount is valued through the price feed and
///   multiplied by `rate` before dividing by `price`.
///
/// Stable-asset payments are always priced directly after normalization from
/// the asset's own decimal count.
///
/// ## Atomicity
///
/// Every message computes and validates before it writes, and external calls
/// happen before the commit, so a failed message leaves storage as it was.
#[ink::contract]
mod crowdsale {
    use crate::asset::{AssetLedger, AssetRef};
    use crate::constants::*;
    use crate::errors::Error;
    use crate::fixed_point;
    use crate::oracle::{FeedRef, QuoteSource};
    use crate::pricing::{self, PricingMode};
    use ink::storage::Mapping;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct Crowdsale {
        // ── Access control ───────────────────────────────────────────────────
        operator: AccountId,
        /// Receiver of stable-asset payments.
        treasury: AccountId,

        // ── Pricing ──────────────────────────────────────────────────────────
        /// Payment units (18 decimals) per whole sale token.
        price: Balance,
        rate: u128,
        pricing_mode: PricingMode,
        price_feed: Option<AccountId>,
        max_quote_age: u64,

        // ── Sale token ───────────────────────────────────────────────────────
        token_decimals: u8,
        initial_reserve: Balance,
        reserve: Balance,
        tokens_sold: Balance,
        balances: Mapping<AccountId, Balance>,

        // ── Accepted payments ────────────────────────────────────────────────
        /// Asset ledger → its decimal count.
        stable_assets: Mapping<AccountId, u8>,
        wei_raised: Balance,
        stable_raised: Mapping<AccountId, Balance>,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct TokensPurchased {
        #[ink(topic)]
        buyer: AccountId,
        /// `None` for native currency.
        #[ink(topic)]
        asset: Option<AccountId>,
        payment: Balance,
        tokens: Balance,
    }

    #[ink(event)]
    pub struct PriceChanged {
        previous: Balance,
        updated: Balance,
    }

    #[ink(event)]
    pub struct RateChanged {
        previous: u128,
        updated: u128,
    }

    #[ink(event)]
    pub struct PricingModeChanged {
        mode: PricingMode,
    }

    #[ink(event)]
    pub struct NativeWithdrawn {
        #[ink(topic)]
        recipient: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct StableWithdrawn {
        #[ink(topic)]
        asset: AccountId,
        recipient: AccountId,
        amount: Balance,
    }

    /// Emitted when an asset is accepted (`Some(decimals)`) or delisted (`None`).
    #[ink(event)]
    pub struct StableAssetListed {
        #[ink(topic)]
        asset: AccountId,
        decimals: Option<u8>,
    }

    #[ink(event)]
    pub struct PriceFeedSet {
        feed: Option<AccountId>,
    }

    #[ink(event)]
    pub struct TreasurySet {
        #[ink(topic)]
        treasury: AccountId,
    }

    /// Storage writes of one successful allocation, computed before any of
    /// them is applied.
    struct Allocation {
        buyer: AccountId,
        tokens: Balance,
        reserve: Balance,
        tokens_sold: Balance,
        buyer_balance: Balance,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl Crowdsale {
        /// Deploy the sale. The caller becomes the operator.
        ///
        /// # Parameters
        /// - `treasury`       : receiver of stable-asset payments.
        /// - `price_feed`     : feed used by `OracleRate`; may be set later.
        /// - `initial_price`  : 18-decimal payment per whole token, non-zero.
        /// - `token_decimals` : decimals of the sale token's raw unit.
        /// - `initial_reserve`: raw sale tokens available for purchase.
        #[ink(constructor)]
        pub fn new(
            treasury: AccountId,
            price_feed: Option<AccountId>,
            initial_price: Balance,
            token_decimals: u8,
            initial_reserve: Balance,
        ) -> Result<Self, Error> {
            if initial_price == 0 {
                return Err(Error::ZeroPrice);
            }
            if token_decimals > MAX_DECIMALS {
                return Err(Error::InvalidDecimals);
            }

            Ok(Self {
                operator: Self::env().caller(),
                treasury,
                price: initial_price,
                rate: DEFAULT_RATE,
                pricing_mode: PricingMode::Direct,
                price_feed,
                max_quote_age: DEFAULT_MAX_QUOTE_AGE_MS,
                token_decimals,
                initial_reserve,
                reserve: initial_reserve,
                tokens_sold: 0,
                balances: Mapping::default(),
                stable_assets: Mapping::default(),
                wei_raised: 0,
                stable_raised: Mapping::default(),
            })
        }

        // =====================================================================
        // PURCHASES
        // =====================================================================

        /// Buy with the value attached to the call. Returns the allocation.
        #[ink(message, payable)]
        pub fn buy_tokens_with_native_currency(&mut self) -> Result<Balance, Error> {
            let buyer = self.env().caller();
            let payment = self.env().transferred_value();
            let feed = self.price_feed.map(FeedRef::new);
            self.purchase_native(buyer, payment, feed.as_ref())
        }

        /// Buy with `amount` of `asset`, pulled from the caller's allowance
        /// into the treasury. Returns the allocation.
        #[ink(message)]
        pub fn buy_tokens_with_stable_coin(
            &mut self,
            amount: Balance,
            asset: AccountId,
        ) -> Result<Balance, Error> {
            let buyer = self.env().caller();
            let mut ledger = AssetRef::new(asset);
            self.purchase_stable(buyer, amount, asset, &mut ledger)
        }

        /// Allocation a native payment of `payment` would receive right now.
        #[ink(message)]
        pub fn preview_native_purchase(&self, payment: Balance) -> Result<Balance, Error> {
            let feed = self.price_feed.map(FeedRef::new);
            self.native_allocation(payment, feed.as_ref())
        }

        /// Allocation `amount` of `asset` would receive right now.
        #[ink(message)]
        pub fn preview_stable_purchase(
            &self,
            amount: Balance,
            asset: AccountId,
        ) -> Result<Balance, Error> {
            self.stable_allocation(amount, asset)
        }

        // =====================================================================
        // ADMIN FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn change_token_price(&mut self, new_price: Balance) -> Result<(), Error> {
            self.only_operator()?;
            if new_price == 0 {
                return Err(Error::ZeroPrice);
            }
            let previous = self.price;
            self.price = new_price;
            self.env().emit_event(PriceChanged {
                previous,
                updated: new_price,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn change_token_rate(&mut self, new_rate: u128) -> Result<(), Error> {
            self.only_operator()?;
            if new_rate == 0 {
                return Err(Error::ZeroRate);
            }
            let previous = self.rate;
            self.rate = new_rate;
            self.env().emit_event(RateChanged {
                previous,
                updated: new_rate,
            });
            Ok(())
        }

        /// Select the native-currency allocation formula.
        #[ink(message)]
        pub fn change_pricing_mode(&mut self, mode: PricingMode) -> Result<(), Error> {
            self.only_operator()?;
            self.pricing_mode = mode;
            self.env().emit_event(PricingModeChanged { mode });
            Ok(())
        }

        /// Send the whole native balance to the operator. Returns the amount.
        #[ink(message)]
        pub fn withdraw_native_currency(&mut self) -> Result<Balance, Error> {
            self.only_operator()?;
            let amount = self.env().balance();

            self.env()
                .transfer(self.operator, amount)
                .map_err(|_| Error::TransferFailed)?;

            self.env().emit_event(NativeWithdrawn {
                recipient: self.operator,
                amount,
            });
            Ok(amount)
        }

        /// Send every unit of `asset` held by the sale to the operator.
        #[ink(message)]
        pub fn withdraw_stable_asset(&mut self, asset: AccountId) -> Result<Balance, Error> {
            self.only_operator()?;
            let mut ledger = AssetRef::new(asset);
            self.sweep_asset(asset, &mut ledger)
        }

        #[ink(message)]
        pub fn add_stable_asset(&mut self, asset: AccountId, decimals: u8) -> Result<(), Error> {
            self.only_operator()?;
            if decimals > MAX_DECIMALS {
                return Err(Error::InvalidDecimals);
            }
            self.stable_assets.insert(asset, &decimals);
            self.env().emit_event(StableAssetListed {
                asset,
                decimals: Some(decimals),
            });
            Ok(())
        }

        #[ink(message)]
        pub fn remove_stable_asset(&mut self, asset: AccountId) -> Result<(), Error> {
            self.only_operator()?;
            self.stable_assets.remove(asset);
            self.env().emit_event(StableAssetListed {
                asset,
                decimals: None,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn set_price_feed(&mut self, feed: Option<AccountId>) -> Result<(), Error> {
            self.only_operator()?;
            self.price_feed = feed;
            self.env().emit_event(PriceFeedSet { feed });
            Ok(())
        }

        #[ink(message)]
        pub fn set_max_quote_age(&mut self, max_age_ms: u64) -> Result<(), Error> {
            self.only_operator()?;
            if max_age_ms == 0 {
                return Err(Error::ZeroQuoteAge);
            }
            self.max_quote_age = max_age_ms;
            Ok(())
        }

        #[ink(message)]
        pub fn set_treasury(&mut self, treasury: AccountId) -> Result<(), Error> {
            self.only_operator()?;
            self.treasury = treasury;
            self.env().emit_event(TreasurySet { treasury });
            Ok(())
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn get_token_price(&self) -> Balance {
            self.price
        }

        #[ink(message)]
        pub fn get_token_rate(&self) -> u128 {
            self.rate
        }

        #[ink(message)]
        pub fn get_pricing_mode(&self) -> PricingMode {
            self.pricing_mode
        }

        /// Cumulative native currency accepted by purchases.
        #[ink(message)]
        pub fn wei_raised(&self) -> Balance {
            self.wei_raised
        }

        #[ink(message)]
        pub fn get_stable_raised(&self, asset: AccountId) -> Balance {
            self.stable_raised.get(asset).unwrap_or(0)
        }

        #[ink(message)]
        pub fn get_tokens_sold(&self) -> Balance {
            self.tokens_sold
        }

        #[ink(message)]
        pub fn get_token_reserve(&self) -> Balance {
            self.reserve
        }

        #[ink(message)]
        pub fn get_initial_reserve(&self) -> Balance {
            self.initial_reserve
        }

        #[ink(message)]
        pub fn get_token_decimals(&self) -> u8 {
            self.token_decimals
        }

        /// Sale tokens allocated to `account`.
        #[ink(message)]
        pub fn balance_of(&self, account: AccountId) -> Balance {
            self.balances.get(account).unwrap_or(0)
        }

        /// Decimals of `asset` if it is accepted as payment.
        #[ink(message)]
        pub fn is_supported_asset(&self, asset: AccountId) -> Option<u8> {
            self.stable_assets.get(asset)
        }

        #[ink(message)]
        pub fn get_operator(&self) -> AccountId {
            self.operator
        }

        #[ink(message)]
        pub fn get_treasury(&self) -> AccountId {
            self.treasury
        }

        #[ink(message)]
        pub fn get_price_feed_address(&self) -> Option<AccountId> {
            self.price_feed
        }

        #[ink(message)]
        pub fn get_max_quote_age(&self) -> u64 {
            self.max_quote_age
        }

        /// Validated native price from the feed, in the feed's own decimals.
        #[ink(message)]
        pub fn get_latest_price_of_native(&self) -> Result<u128, Error> {
            let feed = self.price_feed.map(FeedRef::new);
            self.latest_price(feed.as_ref())
        }

        /// `floor(numerator * 10^precision / denominator)`.
        #[ink(message)]
        pub fn divider(
            &self,
            numerator: u128,
            denominator: u128,
            precision: u8,
        ) -> Result<u128, Error> {
            fixed_point::divider(numerator, denominator, precision)
        }

        // =====================================================================
        // CORE
        // =====================================================================

        fn purchase_native<Q: QuoteSource>(
            &mut self,
            buyer: AccountId,
            payment: Balance,
            feed: Option<&Q>,
        ) -> Result<Balance, Error> {
            let tokens = self.native_allocation(payment, feed)?;
            let allocation = self.plan_allocation(buyer, tokens)?;
            let raised = self
                .wei_raised
                .checked_add(payment)
                .ok_or(Error::Overflow)?;

            self.wei_raised = raised;
            self.commit(allocation);

            self.env().emit_event(TokensPurchased {
                buyer,
                asset: None,
                payment,
                tokens,
            });
            Ok(tokens)
        }

        fn purchase_stable<L: AssetLedger>(
            &mut self,
            buyer: AccountId,
            amount: Balance,
            asset: AccountId,
            ledger: &mut L,
        ) -> Result<Balance, Error> {
            let tokens = self.stable_allocation(amount, asset)?;
            let allocation = self.plan_allocation(buyer, tokens)?;
            let raised = self
                .get_stable_raised(asset)
                .checked_add(amount)
                .ok_or(Error::Overflow)?;

            ledger.transfer_from(buyer, self.treasury, amount)?;

            self.stable_raised.insert(asset, &raised);
            self.commit(allocation);

            self.env().emit_event(TokensPurchased {
                buyer,
                asset: Some(asset),
                payment: amount,
                tokens,
            });
            Ok(tokens)
        }

        fn native_allocation<Q: QuoteSource>(
            &self,
            payment: Balance,
            feed: Option<&Q>,
        ) -> Result<Balance, Error> {
            if payment == 0 {
                return Err(Error::ZeroPayment);
            }

            let tokens = match self.pricing_mode {
                PricingMode::Direct => {
                    pricing::direct_allocation(payment, self.price, self.token_decimals)?
                }
                PricingMode::OracleRate => {
                    let feed = feed.ok_or(Error::OracleNotConfigured)?;
                    let quote = feed.latest_quote()?;
                    let answer =
                        quote.usable_answer(self.env().block_timestamp(), self.max_quote_age)?;
                    pricing::oracle_allocation(
                        payment,
                        answer,
                        quote.decimals,
                        self.rate,
                        self.price,
                        self.token_decimals,
                    )?
                }
            };

            if tokens == 0 {
                return Err(Error::ZeroAllocation);
            }
            Ok(tokens)
        }

        fn stable_allocation(&self, amount: Balance, asset: AccountId) -> Result<Balance, Error> {
            let decimals = self
                .stable_assets
                .get(asset)
                .ok_or(Error::UnsupportedAsset)?;
            if amount == 0 {
                return Err(Error::ZeroPayment);
            }

            let tokens =
                pricing::stable_allocation(amount, decimals, self.price, self.token_decimals)?;
            if tokens == 0 {
                return Err(Error::ZeroAllocation);
            }
            Ok(tokens)
        }

        fn plan_allocation(&self, buyer: AccountId, tokens: Balance) -> Result<Allocation, Error> {
            let reserve = self
                .reserve
                .checked_sub(tokens)
                .ok_or(Error::InsufficientReserve)?;
            let tokens_sold = self
                .tokens_sold
                .checked_add(tokens)
                .ok_or(Error::Overflow)?;
            let buyer_balance = self
                .balance_of(buyer)
                .checked_add(tokens)
                .ok_or(Error::Overflow)?;

            Ok(Allocation {
                buyer,
                tokens,
                reserve,
                tokens_sold,
                buyer_balance,
            })
        }

        fn commit(&mut self, allocation: Allocation) {
            debug_assert_eq!(allocation.reserve + allocation.tokens, self.reserve);
            self.reserve = allocation.reserve;
            self.tokens_sold = allocation.tokens_sold;
            self.balances
                .insert(allocation.buyer, &allocation.buyer_balance);
        }

        fn sweep_asset<L: AssetLedger>(
            &mut self,
            asset: AccountId,
            ledger: &mut L,
        ) -> Result<Balance, Error> {
            let held = ledger.balance_of(self.env().account_id())?;
            if held > 0 {
                ledger.transfer(self.operator, held)?;
            }

            self.env().emit_event(StableWithdrawn {
                asset,
                recipient: self.operator,
                amount: held,
            });
            Ok(held)
        }

        fn latest_price<Q: QuoteSource>(&self, feed: Option<&Q>) -> Result<u128, Error> {
            let feed = feed.ok_or(Error::OracleNotConfigured)?;
            feed.latest_quote()?
                .usable_answer(self.env().block_timestamp(), self.max_quote_age)
        }

        // =====================================================================
        // ACCESS CONTROL
        // =====================================================================

        fn only_operator(&self) -> Result<(), Error> {
            if self.env().caller() != self.operator {
                return Err(Error::Unauthorized);
            }
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
