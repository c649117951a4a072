//! Account-related types for the SUB ledger
//!
//! This module defines the Account structure: a balance, a running score, and
//! the withdrawal caps that apply when the account is limited.

use super::error::LedgerError;
use chrono::NaiveTime;
use rust_decimal::Decimal;

/// Score every new account starts with
pub const INITIAL_SCORE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Default daily withdrawal cap
pub const DEFAULT_MAX_DAY_DRAW: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Score gained per unit deposited (0.1)
const DEPOSIT_SCORE_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Score lost per unit withdrawn (0.15)
const WITHDRAW_SCORE_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Start of the night window (inclusive)
pub fn night_start() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default()
}

/// End of the night window (exclusive)
pub fn night_end() -> NaiveTime {
    NaiveTime::from_hms_opt(4, 0, 0).unwrap_or_default()
}

/// Whether `time` falls in the night window (21:00 up to, not including, 04:00)
pub fn is_night(time: NaiveTime) -> bool {
    time >= night_start() || time < night_end()
}

/// A person's account at one bank
///
/// Owned exclusively by its Person; created when the person opens an account at a
/// bank and dropped when it is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Current balance, never negative after a withdrawal
    pub balance: Decimal,

    /// Reputation number
    ///
    /// Rises by 0.1 per unit deposited and falls by 0.15 per unit withdrawn.
    /// Unbounded in both directions.
    pub score: Decimal,

    /// Cap for any single limited withdrawal
    pub max_day_draw: Decimal,

    /// Cap for a limited withdrawal during the night window, half the day cap
    pub max_night_draw: Decimal,

    /// Whether the caps are enforced for this account
    pub is_limited: bool,
}

impl Account {
    /// Create an account with the given opening balance
    ///
    /// # Returns
    ///
    /// A new Account with:
    /// - balance = `opening_balance`
    /// - score = 100
    /// - max_day_draw = 100,000 and max_night_draw = 50,000
    /// - is_limited = false
    pub fn new(opening_balance: Decimal) -> Self {
        Account {
            balance: opening_balance,
            score: INITIAL_SCORE,
            max_day_draw: DEFAULT_MAX_DAY_DRAW,
            max_night_draw: DEFAULT_MAX_DAY_DRAW / Decimal::TWO,
            is_limited: false,
        }
    }

    /// Credit `amount` to the account
    ///
    /// `amount` must be non-negative; callers clamp negative requests to zero.
    ///
    /// # Returns
    ///
    /// * `Ok(Decimal)` - The new balance
    /// * `Err(LedgerError)` - If the balance or score would overflow
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, LedgerError> {
        let new_balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit"))?;

        let new_score = amount
            .checked_mul(DEPOSIT_SCORE_RATE)
            .and_then(|gain| self.score.checked_add(gain))
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit score"))?;

        self.balance = new_balance;
        self.score = new_score;

        Ok(self.balance)
    }

    /// Debit `amount` from the account
    ///
    /// When `apply_limit` is set, the night cap applies inside the night window and
    /// the day cap applies at any hour. `now` is the local time of the attempt.
    ///
    /// # Returns
    ///
    /// * `Ok(Decimal)` - The new balance
    /// * `Err(LedgerError)` - The account is left unchanged
    ///
    /// # Errors
    ///
    /// - `InsufficientFunds` if `amount` exceeds the balance
    /// - `NightLimitExceeded` if limited, at night, and above the night cap
    /// - `DayLimitExceeded` if limited and above the day cap
    pub fn withdraw(
        &mut self,
        amount: Decimal,
        apply_limit: bool,
        now: NaiveTime,
    ) -> Result<Decimal, LedgerError> {
        let new_balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("withdrawal"))?;

        if new_balance < Decimal::ZERO {
            return Err(LedgerError::insufficient_funds(self.balance, amount));
        }

        if apply_limit {
            if is_night(now) && amount > self.max_night_draw {
                return Err(LedgerError::night_limit_exceeded(
                    amount,
                    self.max_night_draw,
                ));
            }

            if amount > self.max_day_draw {
                return Err(LedgerError::day_limit_exceeded(amount, self.max_day_draw));
            }
        }

        let new_score = amount
            .checked_mul(WITHDRAW_SCORE_RATE)
            .and_then(|loss| self.score.checked_sub(loss))
            .ok_or_else(|| LedgerError::arithmetic_overflow("withdrawal score"))?;

        self.balance = new_balance;
        self.score = new_score;

        Ok(self.balance)
    }

    pub fn set_limited(&mut self, limited: bool) {
        self.is_limited = limited;
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}
