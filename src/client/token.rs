// Decimal amount to fixed-point 256-bit conversion.
//
// Token contracts take amounts as a 256-bit integer split into two 128-bit
// words (low, high). Conversion multiplies the decimal amount by 10^decimals
// and truncates; no rounding.

use thiserror::Error;

/// Decimals of the reward token contract.
pub const TOKEN_DECIMALS: u32 = 18;

const LOW_64: u128 = u64::MAX as u128;

/// A 256-bit unsigned integer as two 128-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uint256 {
    pub low: u128,
    pub high: u128,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid decimal amount {0:?}")]
    Invalid(String),

    #[error("amount {0:?} does not fit in 256 bits at {1} decimals")]
    Overflow(String, u32),
}

/// Parse a decimal string into its fixed-point integer at `decimals` places.
///
/// Fraction digits beyond `decimals` are truncated. Only plain decimal
/// notation is accepted; signs and exponents are not.
pub fn parse_amount_to_uint256(amount: &str, decimals: u32) -> Result<Uint256, AmountError> {
    let invalid = || AmountError::Invalid(amount.to_string());

    let trimmed = amount.trim();
    let (integer_part, fraction_part) = match trimmed.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (trimmed, ""),
    };

    if integer_part.is_empty() && fraction_part.is_empty() {
        return Err(invalid());
    }
    if !integer_part.bytes().all(|b| b.is_ascii_digit())
        || !fraction_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let kept_fraction = &fraction_part[..fraction_part.len().min(decimals as usize)];
    let padding = decimals as usize - kept_fraction.len();

    let mut value = Uint256::default();
    let digits = integer_part
        .bytes()
        .chain(kept_fraction.bytes())
        .map(|b| (b - b'0') as u128)
        .chain(std::iter::repeat(0).take(padding));
    for digit in digits {
        value = mul10_add(value, digit)
            .ok_or_else(|| AmountError::Overflow(amount.to_string(), decimals))?;
    }
    Ok(value)
}

/// value * 10 + digit over the 256-bit pair, with carry out of the low word.
fn mul10_add(value: Uint256, digit: u128) -> Option<Uint256> {
    let a = value.low & LOW_64;
    let b = value.low >> 64;
    let t0 = a * 10 + digit;
    let t1 = b * 10 + (t0 >> 64);
    let low = (t0 & LOW_64) | ((t1 & LOW_64) << 64);
    let carry = t1 >> 64;
    let high = value.high.checked_mul(10)?.checked_add(carry)?;
    Some(Uint256 { low, high })
}
