//! 金额类型
//!
//! 以最小货币单位（分）保存，避免浮点累加误差；运算饱和，不会溢出

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

/// 金额（单位：分）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// 单项费用上限（一亿元）
    pub const MAX_FEE: Money = Money(100_000_000 * 100);

    /// 从分构造
    pub const fn from_minor(minor: u64) -> Self {
        Money(minor)
    }

    /// 从元构造
    pub const fn from_major(major: u64) -> Self {
        Money(major.saturating_mul(100))
    }

    /// 返回元（浮点，仅用于展示和序列化）
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// 从浮点金额转换，四舍五入到分；负数、非有限值或超过 `MAX_FEE` 返回 None
    pub fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let minor = (value * 100.0).round();
        if minor > Money::MAX_FEE.0 as f64 {
            return None;
        }
        Some(Money(minor as u64))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₱{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// 对外以元为单位的数字交换（与后端保持一致）
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_major_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("金额不合法: {}", value)))
    }
}
