#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! Stable-value asset ledger accepted by the crowdsale as an alternate
//! payment instrument. Plain allowance semantics: the owner approves a
//! spender, the spender calls `transfer_from`.

pub mod constants {
    /// Decimals of the reference USD-pegged asset.
    pub const DEFAULT_DECIMALS: u8 = 6;
}

pub use self::stable_token::{StableToken, StableTokenRef};

#[ink::contract]
mod stable_token {
    use ink::storage::Mapping;

    #[ink(storage)]
    pub struct StableToken {
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        total_supply: Balance,
        decimals: u8,
    }

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    /// Variant order is part of the cross-contract interface; callers decode
    /// it positionally.
    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        InsufficientBalance,
        InsufficientAllowance,
        ZeroTransfer,
    }

    impl StableToken {
        /// Mints `initial_supply` to the deployer.
        #[ink(constructor)]
        pub fn new(initial_supply: Balance, decimals: u8) -> Self {
            let caller = Self::env().caller();
            let mut balances = Mapping::default();
            balances.insert(caller, &initial_supply);

            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: initial_supply,
            });

            Self {
                balances,
                allowances: Mapping::default(),
                total_supply: initial_supply,
                decimals,
            }
        }

        #[ink(constructor)]
        pub fn with_default_decimals(initial_supply: Balance) -> Self {
            Self::new(initial_supply, crate::constants::DEFAULT_DECIMALS)
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            self.decimals
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            let caller = self.env().caller();
            let allowance = self.allowance(from, caller);

            if allowance < value {
                return Err(Error::InsufficientAllowance);
            }

            self.process_transfer(from, to, value)?;
            self.allowances.insert((from, caller), &(allowance - value));
            Ok(())
        }

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            self.process_transfer(from, to, value)
        }

        fn process_transfer(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            if value == 0 {
                return Err(Error::ZeroTransfer);
            }

            let from_bal = self.balance_of(from);
            if from_bal < value {
                return Err(Error::InsufficientBalance);
            }

            self.balances.insert(from, &(from_bal - value));
            let to_bal = self.balance_of(to);
            // Supply is fixed at construction, so no balance can exceed it.
            self.balances.insert(to, &(to_bal + value));

            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value,
            });
            Ok(())
        }
    }

}
