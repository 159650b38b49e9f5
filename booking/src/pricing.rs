//! Convenience fee maths. All amounts are whole currency units.

use serde::Serialize;

/// 10% expressed in basis points.
pub const DEFAULT_FEE_BPS: u32 = 1_000;

/// `round(subtotal * bps / 10_000)`, halves rounded up.
pub fn convenience_fee(subtotal: u64, fee_bps: u32) -> u64 {
    let scaled = u128::from(subtotal) * u128::from(fee_bps);
    let fee = (scaled + 5_000) / 10_000;
    u64::try_from(fee).unwrap_or(u64::MAX)
}

pub fn total_with_fee(subtotal: u64, fee_bps: u32) -> u64 {
    subtotal.saturating_add(convenience_fee(subtotal, fee_bps))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: u64,
    pub convenience_fee: u64,
    pub total: u64,
}

impl PriceBreakdown {
    pub fn new(subtotal: u64, fee_bps: u32) -> Self {
        let fee = convenience_fee(subtotal, fee_bps);
        Self {
            subtotal,
            convenience_fee: fee,
            total: subtotal.saturating_add(fee),
        }
    }
}
