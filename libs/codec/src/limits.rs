//! Resource limits and costs, both summable component-wise

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Resource ceilings an operation may consume
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limits {
    /// Fee in mutez
    #[serde(with = "crate::json::string")]
    pub fee: u64,
    /// Gas limit in gas units
    #[serde(with = "crate::json::string")]
    pub gas_limit: u64,
    /// Storage limit in bytes
    #[serde(with = "crate::json::string")]
    pub storage_limit: u64,
}

impl Limits {
    /// Limits with only a fee set
    #[must_use]
    pub const fn with_fee(fee: u64) -> Self {
        Self {
            fee,
            gas_limit: 0,
            storage_limit: 0,
        }
    }
}

impl Add for Limits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            fee: self.fee.saturating_add(rhs.fee),
            gas_limit: self.gas_limit.saturating_add(rhs.gas_limit),
            storage_limit: self.storage_limit.saturating_add(rhs.storage_limit),
        }
    }
}

impl AddAssign for Limits {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Limits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Costs actually paid by an applied operation, for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Costs {
    /// Fee paid to the baker, in mutez
    #[serde(with = "crate::json::string")]
    pub fee: u64,
    /// Total burn (not included in fee), in mutez
    #[serde(with = "crate::json::string")]
    pub burn: u64,
    /// Gas consumed
    #[serde(with = "crate::json::string")]
    pub gas_used: u64,
    /// New storage allocated, in bytes
    #[serde(with = "crate::json::string")]
    pub storage_used: u64,
    /// Burn for storage, in mutez
    #[serde(with = "crate::json::string")]
    pub storage_burn: u64,
    /// Burn for allocating a new account, in mutez
    #[serde(with = "crate::json::string")]
    pub allocation_burn: u64,
}

impl Add for Costs {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            fee: self.fee.saturating_add(rhs.fee),
            burn: self.burn.saturating_add(rhs.burn),
            gas_used: self.gas_used.saturating_add(rhs.gas_used),
            storage_used: self.storage_used.saturating_add(rhs.storage_used),
            storage_burn: self.storage_burn.saturating_add(rhs.storage_burn),
            allocation_burn: self.allocation_burn.saturating_add(rhs.allocation_burn),
        }
    }
}

impl AddAssign for Costs {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Costs {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_identity() {
        assert_eq!(Limits::default() + Limits::with_fee(1), Limits::with_fee(1));
        assert_eq!(Limits::with_fee(1) + Limits::default(), Limits::with_fee(1));
    }

    #[test]
    fn test_limits_sum() {
        let all = [
            Limits {
                fee: 1,
                gas_limit: 10,
                storage_limit: 100,
            },
            Limits {
                fee: 2,
                gas_limit: 20,
                storage_limit: 0,
            },
        ];
        let total: Limits = all.into_iter().sum();
        assert_eq!(
            total,
            Limits {
                fee: 3,
                gas_limit: 30,
                storage_limit: 100
            }
        );
        assert_eq!(std::iter::empty::<Limits>().sum::<Limits>(), Limits::default());
    }

    #[test]
    fn test_costs_add_assign() {
        let mut c = Costs::default();
        c += Costs {
            fee: 5,
            burn: 6,
            gas_used: 7,
            storage_used: 8,
            storage_burn: 9,
            allocation_burn: 10,
        };
        c += Costs {
            fee: 1,
            ..Costs::default()
        };
        assert_eq!(c.fee, 6);
        assert_eq!(c.allocation_burn, 10);
    }

    #[test]
    fn test_limits_json_strings() {
        let json = serde_json::to_string(&Limits::with_fee(1420)).unwrap();
        assert_eq!(json, r#"{"fee":"1420","gas_limit":"0","storage_limit":"0"}"#);
        let back: Limits =
            serde_json::from_str(r#"{"fee":1420,"gas_limit":"0","storage_limit":0}"#).unwrap();
        assert_eq!(back, Limits::with_fee(1420));
    }
}
