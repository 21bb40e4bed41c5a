//! Validation of loan account requests against product configuration
//!
//! Each check takes the parameter value exactly as the product service
//! returned it, so the caller decides when (and whether) a parameter is
//! fetched at all.

use common::decimal::InterestRate;
use common::error::{CmsStatusCode, Error, Result};
use common::model::currency::Currency;
use common::model::product::{IntegerRange, ParamName, ParamValue, ProductDto, ProductType};

pub const TENURE_OUT_OF_RANGE: &str = "Loan Tenure is out of the allowed range for the product";
pub const INTEREST_RATE_OUT_OF_RANGE: &str = "Loan Interest Rate is out of the allowed range for the product";

/// Reject products that are not loan account products
pub fn ensure_loan_product(product: &ProductDto) -> Result<()> {
    if product.product_type != ProductType::LoanAccount {
        return Err(Error::bad_request_with_message(
            CmsStatusCode::InvalidProductType,
            format!("Product {} is not a loan account product", product.product_id),
        ));
    }
    Ok(())
}

/// Approved amount must fall within `LOAN_AMOUNT_RANGE`
pub fn validate_approved_amount(approved_amount: i64, range: &ParamValue) -> Result<()> {
    let range = expect_integer_range(ParamName::LoanAmountRange, range)?;
    if !range.contains(approved_amount) {
        return Err(Error::bad_request(CmsStatusCode::ProductApprovedLimitOutOfRange));
    }
    Ok(())
}

/// Tenure must fall within `LOAN_TENURE_RANGE`
pub fn validate_tenure(tenure: i64, range: &ParamValue) -> Result<()> {
    let range = expect_integer_range(ParamName::LoanTenureRange, range)?;
    if !range.contains(tenure) {
        return Err(Error::bad_request_with_message(CmsStatusCode::BadRequest, TENURE_OUT_OF_RANGE));
    }
    Ok(())
}

/// Interest rate must fall within `INTEREST_RATE_RANGE`
pub fn validate_interest_rate(interest_rate: InterestRate, range: &ParamValue) -> Result<()> {
    let range = range
        .as_decimal_range()
        .ok_or_else(|| invalid_param(ParamName::InterestRateRange, "expected a numeric range"))?;
    if !range.contains(interest_rate) {
        return Err(Error::bad_request_with_message(
            CmsStatusCode::BadRequest,
            INTEREST_RATE_OUT_OF_RANGE,
        ));
    }
    Ok(())
}

/// Country code configured on the product
pub fn country_from_param(value: &ParamValue) -> Result<String> {
    value
        .first_string()
        .map(str::to_string)
        .ok_or_else(|| invalid_param(ParamName::Country, "expected a non-empty string list"))
}

/// Currency configured on the product
pub fn currency_from_param(value: &ParamValue) -> Result<Currency> {
    value
        .first_string()
        .ok_or_else(|| invalid_param(ParamName::Currency, "expected a non-empty string list"))?
        .parse()
}

fn expect_integer_range(name: ParamName, value: &ParamValue) -> Result<&IntegerRange> {
    value
        .as_integer_range()
        .ok_or_else(|| invalid_param(name, "expected an integer range"))
}

fn invalid_param(name: ParamName, detail: &str) -> Error {
    Error::bad_request_with_message(
        CmsStatusCode::InvalidProductParam,
        format!("Product parameter {} is invalid: {}", name, detail),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::product::DecimalRange;
    use common::decimal::dec;

    fn ints(min: i64, max: i64) -> ParamValue {
        ParamValue::RangeIntegers(IntegerRange::new(min, max))
    }

    #[test]
    fn product_type_gate() {
        let mut product = ProductDto {
            product_id: "P".to_string(),
            product_type: ProductType::LoanAccount,
            active: true,
        };
        assert!(ensure_loan_product(&product).is_ok());

        product.product_type = ProductType::CardAccount;
        let err = ensure_loan_product(&product).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::InvalidProductType));
    }

    #[test]
    fn approved_amount_bounds() {
        assert!(validate_approved_amount(99999, &ints(1, 99999)).is_ok());
        assert!(validate_approved_amount(1, &ints(1, 99999)).is_ok());

        let err = validate_approved_amount(0, &ints(1, 99999)).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::ProductApprovedLimitOutOfRange));
    }

    #[test]
    fn tenure_failure_message() {
        let err = validate_tenure(0, &ints(1, 99999)).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::BadRequest));
        assert_eq!(err.to_string(), TENURE_OUT_OF_RANGE);
    }

    #[test]
    fn interest_rate_accepts_decimal_and_integer_ranges() {
        let decimals = ParamValue::RangeDecimals(DecimalRange::new(dec!(1.5), dec!(99999)));
        assert!(validate_interest_rate(dec!(12.5), &decimals).is_ok());

        let err = validate_interest_rate(dec!(0), &decimals).unwrap_err();
        assert_eq!(err.to_string(), INTEREST_RATE_OUT_OF_RANGE);

        assert!(validate_interest_rate(dec!(12.5), &ints(1, 20)).is_ok());
    }

    #[test]
    fn wrong_param_shape_is_invalid_param() {
        let list = ParamValue::string_list(["IND"]);
        let err = validate_approved_amount(10, &list).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::InvalidProductParam));

        let err = validate_interest_rate(dec!(10), &list).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::InvalidProductParam));

        let err = country_from_param(&ints(1, 2)).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::InvalidProductParam));
    }

    #[test]
    fn country_and_currency_take_first_entry() {
        assert_eq!(country_from_param(&ParamValue::string_list(["IND", "PAK"])).unwrap(), "IND");
        assert_eq!(currency_from_param(&ParamValue::string_list(["INR"])).unwrap(), Currency::INR);

        let err = currency_from_param(&ParamValue::string_list(Vec::<String>::new())).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::InvalidProductParam));

        let err = currency_from_param(&ParamValue::string_list(["ZZZ"])).unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::InvalidProductParam));
    }
}
