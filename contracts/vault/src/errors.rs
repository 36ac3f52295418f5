use soroban_sdk::contracterror;

/// Errors returned by every fallible vault entry point.
///
/// Codes are stable: off-chain clients match on the numeric value carried in
/// `Error(Contract, #code)`. New variants are appended, never renumbered.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VaultError {
    // Validation
    ZeroAmount = 1,
    BelowMinDeposit = 2,
    ExceedsMaxDeposit = 3,
    ExceedsMaxTVL = 4,
    InvalidRatio = 5,
    InvalidFee = 6,
    InvalidLimits = 7,
    ArithmeticOverflow = 8,
    NegativeAmount = 9,

    // Liquidity
    InsufficientLiquidity = 20,

    // Slippage
    SlippageExceeded = 30,

    // Timing
    HarvestTooSoon = 40,

    // State
    NotPaused = 50,
    AlreadyPaused = 51,
    AlreadyActive = 52,
    VaultPaused = 53,
    NotInitialized = 54,
    AlreadyInitialized = 55,
    Reentrancy = 56,

    // Authorization
    Unauthorized = 60,
    InsufficientAllowance = 61,
    InsufficientShares = 62,
    NoPendingOwner = 63,

    // Integration
    AdapterOperationFailed = 70,
}
