//! Per-user balance view, derived on demand and never stored.
use serde::{Deserialize, Serialize};

use crate::Amount;

/// Balance, income and expense of one user.
///
/// `balance` is always `income - expense`: it is derived from the two totals
/// instead of being summed separately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub balance: Amount,
    pub income: Amount,
    /// Absolute value of the sum of negative amounts.
    pub expense: Amount,
}

impl Summary {
    pub fn new(income: Amount, expense: Amount) -> Self {
        Self {
            balance: income - expense,
            income,
            expense,
        }
    }

    /// Folds a set of amounts into a summary. Zero counts as income.
    #[cfg(test)]
    pub(crate) fn from_amounts<I: IntoIterator<Item = Amount>>(amounts: I) -> Self {
        let (income, expense) = amounts
            .into_iter()
            .map(Amount::cents)
            .fold((0, 0), |(income, expense), cents| {
                if cents >= 0 {
                    (income + cents, expense)
                } else {
                    (income, expense - cents)
                }
            });
        Self::new(Amount::new(income), Amount::new(expense))
    }
}
