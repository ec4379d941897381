//! Refund accounting: sum refund payments, detect duplicates, recalculate
//! aggregates.
use crate::domain::{RefundPayment, Refunds};
use rust_decimal::{Decimal, RoundingStrategy};

/// Replaces the payment with a matching `id`, or appends it, preserving
/// insertion order. Returns a fresh aggregate rather than mutating in
/// place — the handler assigns it back, avoiding aliasing hazards from
/// editing `payments` in place.
pub fn upsert_payment(agg: &Refunds, payment: RefundPayment) -> Refunds {
    let mut payments = agg.payments.clone();
    match payments.iter().position(|p| p.id == payment.id) {
        Some(idx) => payments[idx] = payment,
        None => payments.push(payment),
    }
    Refunds {
        payments,
        amount_refunded: agg.amount_refunded,
        amount_fee: agg.amount_fee,
    }
}

/// `Σ (payment.amount + payment.fee)`, rounded to `asset_precision` using
/// banker's rounding.
pub fn total_refunded(agg: &Refunds, asset_precision: u32) -> Decimal {
    let total: Decimal = agg.payments.iter().map(|p| p.amount + p.fee).sum();
    total.round_dp_with_strategy(asset_precision, RoundingStrategy::MidpointNearestEven)
}

/// `Σ payment.fee`, rounded to `asset_precision`.
pub fn total_fee(agg: &Refunds, asset_precision: u32) -> Decimal {
    let total: Decimal = agg.payments.iter().map(|p| p.fee).sum();
    total.round_dp_with_strategy(asset_precision, RoundingStrategy::MidpointNearestEven)
}

/// Recomputes `amount_refunded`/`amount_fee` from `payments` in place. Must
/// be called after every mutation so the derived totals never drift from
/// the underlying payment list.
pub fn recalculate(agg: &mut Refunds, asset_precision: u32) {
    agg.amount_refunded = total_refunded(agg, asset_precision);
    agg.amount_fee = total_fee(agg, asset_precision);
}
