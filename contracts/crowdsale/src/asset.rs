use crate::errors::Error;
use ink::env::call::{build_call, ExecutionInput, Selector};
use ink::env::DefaultEnvironment;
use ink::primitives::AccountId;

type Balance = u128;

/// Error layout of the asset ledger's messages, decoded variant-for-variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum LedgerError {
    InsufficientBalance,
    InsufficientAllowance,
    ZeroTransfer,
}

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance => Error::InsufficientBalance,
            LedgerError::InsufficientAllowance => Error::InsufficientAllowance,
            LedgerError::ZeroTransfer => Error::AssetCallFailed,
        }
    }
}

/// Operations the sale needs from a stable-value asset ledger.
pub trait AssetLedger {
    fn balance_of(&self, owner: AccountId) -> Result<Balance, Error>;

    /// Moves `amount` from `from` to `to` using the allowance `from` granted
    /// to the caller.
    fn transfer_from(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), Error>;

    fn transfer(&mut self, to: AccountId, amount: Balance) -> Result<(), Error>;
}

/// Cross-contract handle on a deployed asset ledger.
pub struct AssetRef {
    asset: AccountId,
}

impl AssetRef {
    pub fn new(asset: AccountId) -> Self {
        Self { asset }
    }

    fn settle(
        result: Result<ink::MessageResult<Result<(), LedgerError>>, ink::env::Error>,
    ) -> Result<(), Error> {
        match result {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(err))) => Err(err.into()),
            _ => Err(Error::AssetCallFailed),
        }
    }
}

impl AssetLedger for AssetRef {
    fn balance_of(&self, owner: AccountId) -> Result<Balance, Error> {
        let result = build_call::<DefaultEnvironment>()
            .call(self.asset)
            .exec_input(
                ExecutionInput::new(Selector::new(ink::selector_bytes!("balance_of")))
                    .push_arg(owner),
            )
            .returns::<Balance>()
            .try_invoke();

        match result {
            Ok(Ok(balance)) => Ok(balance),
            _ => Err(Error::AssetCallFailed),
        }
    }

    fn transfer_from(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), Error> {
        let result = build_call::<DefaultEnvironment>()
            .call(self.asset)
            .exec_input(
                ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer_from")))
                    .push_arg(from)
                    .push_arg(to)
                    .push_arg(amount),
            )
            .returns::<Result<(), LedgerError>>()
            .try_invoke();

        Self::settle(result)
    }

    fn transfer(&mut self, to: AccountId, amount: Balance) -> Result<(), Error> {
        let result = build_call::<DefaultEnvironment>()
            .call(self.asset)
            .exec_input(
                ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer")))
                    .push_arg(to)
                    .push_arg(amount),
            )
            .returns::<Result<(), LedgerError>>()
            .try_invoke();

        Self::settle(result)
    }
}
