//! Decimal type utilities for precise financial calculations

use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Monetary amount with exact precision
pub type Amount = Decimal;

/// Annual interest rate in percent (e.g. `12.5` for 12.5%)
pub type InterestRate = Decimal;

/// Precision helpers for common operations
pub mod precision {
    use super::*;

    /// Minor units kept on ledger balances
    pub const AMOUNT_PRECISION: u32 = 2;

    /// Decimal places kept on interest rates
    pub const RATE_PRECISION: u32 = 4;

    /// Round an amount to ledger precision
    pub fn round_amount(amount: Amount) -> Amount {
        amount.round_dp(AMOUNT_PRECISION)
    }

    /// Round an interest rate to stored precision
    pub fn round_rate(rate: InterestRate) -> InterestRate {
        rate.round_dp(RATE_PRECISION)
    }
}
