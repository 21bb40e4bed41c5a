//! Product configuration models

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    LoanAccount,
    CardAccount,
    CreditAccount,
    PaymentAccount,
}

/// Product as configured for a customer profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDto {
    /// Product ID
    pub product_id: String,
    /// Product family
    pub product_type: ProductType,
    /// Whether the product is activated for the profile
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Named product-scoped configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamName {
    LoanAmountRange,
    LoanTenureRange,
    InterestRateRange,
    Country,
    Currency,
}

impl ParamName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamName::LoanAmountRange => "LOAN_AMOUNT_RANGE",
            ParamName::LoanTenureRange => "LOAN_TENURE_RANGE",
            ParamName::InterestRateRange => "INTEREST_RATE_RANGE",
            ParamName::Country => "COUNTRY",
            ParamName::Currency => "CURRENCY",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerRange {
    pub min: i64,
    pub max: i64,
}

impl IntegerRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies within the range, bounds included
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Inclusive decimal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl DecimalRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies within the range, bounds included
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Value of a product parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamValue {
    RangeIntegers(IntegerRange),
    RangeDecimals(DecimalRange),
    StringList { values: Vec<String> },
}

impl ParamValue {
    pub fn string_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::StringList {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn as_integer_range(&self) -> Option<&IntegerRange> {
        match self {
            ParamValue::RangeIntegers(range) => Some(range),
            _ => None,
        }
    }

    /// Decimal view of the range; integer ranges widen losslessly
    pub fn as_decimal_range(&self) -> Option<DecimalRange> {
        match self {
            ParamValue::RangeDecimals(range) => Some(*range),
            ParamValue::RangeIntegers(range) => {
                Some(DecimalRange::new(Decimal::from(range.min), Decimal::from(range.max)))
            }
            _ => None,
        }
    }

    /// First entry of a string list parameter
    pub fn first_string(&self) -> Option<&str> {
        match self {
            ParamValue::StringList { values } => values.first().map(String::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ranges_are_inclusive() {
        let range = IntegerRange::new(1, 99999);
        assert!(range.contains(1));
        assert!(range.contains(99999));
        assert!(!range.contains(0));
        assert!(!range.contains(100000));

        let rates = DecimalRange::new(dec!(1.5), dec!(99999));
        assert!(rates.contains(dec!(1.5)));
        assert!(rates.contains(dec!(12.5)));
        assert!(!rates.contains(dec!(1.49)));
    }

    #[test]
    fn param_value_accessors() {
        let ints = ParamValue::RangeIntegers(IntegerRange::new(1, 10));
        assert_eq!(ints.as_integer_range(), Some(&IntegerRange::new(1, 10)));
        assert_eq!(ints.as_decimal_range(), Some(DecimalRange::new(dec!(1), dec!(10))));
        assert_eq!(ints.first_string(), None);

        let list = ParamValue::string_list(["IND", "PAK"]);
        assert_eq!(list.first_string(), Some("IND"));
        assert_eq!(list.as_integer_range(), None);
        assert_eq!(ParamValue::string_list(Vec::<String>::new()).first_string(), None);
    }

    #[test]
    fn param_value_json_shape() {
        let value: ParamValue =
            serde_json::from_str(r#"{"type":"range_integers","min":1,"max":99999}"#).unwrap();
        assert_eq!(value, ParamValue::RangeIntegers(IntegerRange::new(1, 99999)));

        let value: ParamValue =
            serde_json::from_str(r#"{"type":"string_list","values":["INR"]}"#).unwrap();
        assert_eq!(value.first_string(), Some("INR"));
    }
}
