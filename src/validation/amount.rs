//! Amount/Asset validator.
use crate::domain::AssetService;
use crate::error::DispatchError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses and range-checks a monetary amount against the asset's precision.
///
/// - `amount` must parse as a finite decimal; sign-violations fail
///   `BAD_REQUEST` with `"<field>.amount should be positive"` (or
///   `"non-negative"` when `fee_semantics` is set).
/// - `asset` must resolve via `asset_service`; otherwise
///   `BAD_REQUEST "<field>.asset is not supported"`.
/// - The number of fractional digits in `amount` must not exceed the
///   asset's precision; otherwise `BAD_REQUEST`.
///
/// Returns the parsed amount and the validated asset code.
pub async fn validate_amount_asset(
    field: &str,
    amount: &str,
    asset: &str,
    asset_service: &dyn AssetService,
    fee_semantics: bool,
) -> Result<(Decimal, String), DispatchError> {
    let parsed = Decimal::from_str(amount).map_err(|_| {
        DispatchError::BadRequest(format!("{field}.amount is not a valid decimal"))
    })?;

    let sign_ok = if fee_semantics {
        parsed >= Decimal::ZERO
    } else {
        parsed > Decimal::ZERO
    };
    if !sign_ok {
        let qualifier = if fee_semantics { "non-negative" } else { "positive" };
        return Err(DispatchError::BadRequest(format!(
            "{field}.amount should be {qualifier}"
        )));
    }

    let precision = asset_service
        .precision(asset)
        .await
        .ok_or_else(|| DispatchError::BadRequest(format!("{field}.asset is not supported")))?;

    if parsed.scale() > precision {
        return Err(DispatchError::BadRequest(format!(
            "{field}.amount has more fractional digits than asset precision {precision}"
        )));
    }

    Ok((parsed, asset.to_string()))
}
