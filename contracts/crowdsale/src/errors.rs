/// Failure modes of the sale ledger. Any error aborts the whole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Caller is not the operator.
    Unauthorized,
    /// The token reserve cannot cover the allocation.
    InsufficientReserve,
    /// The asset ledger rejected `transfer_from` for lack of allowance.
    InsufficientAllowance,
    /// The asset ledger rejected a transfer for lack of balance.
    InsufficientBalance,
    /// A fixed-point division had a zero denominator.
    DivisionByZero,
    /// The price feed returned no usable quote.
    OracleUnavailable,
    /// No price feed has been configured.
    OracleNotConfigured,
    /// A native currency transfer was refused by the host.
    TransferFailed,
    /// The asset is not accepted as payment.
    UnsupportedAsset,
    /// The asset ledger call failed for a reason other than balance or allowance.
    AssetCallFailed,
    /// A decimal count too large for 128-bit fixed-point scaling.
    InvalidDecimals,
    ZeroPayment,
    /// The payment is too small to buy a single raw token unit.
    ZeroAllocation,
    ZeroPrice,
    ZeroRate,
    ZeroQuoteAge,
    Overflow,
}
