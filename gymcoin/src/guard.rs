//! Pre-flight checks run before any mutating ledger call.
//!
//! These are advisory. The chain is the final authority and can still reject
//! a transaction that passed here (for example when the balance moves between
//! the check and the submission); such rejections are surfaced unchanged.

use alloy_primitives::{Address, U256};

use crate::address::parse_address;
use crate::error::{GymError, Result};
use crate::units::TokenAmount;

/// Parse `amount` and require it to be strictly positive.
pub fn check_amount(amount: &str) -> Result<TokenAmount> {
    let parsed = TokenAmount::parse(amount)?;
    if parsed.is_zero() {
        return Err(GymError::InvalidAmount(format!(
            "{:?}: amount must be greater than zero",
            amount.trim()
        )));
    }
    Ok(parsed)
}

fn covers_balance(parsed: TokenAmount, available: U256) -> Result<TokenAmount> {
    let requested = parsed.base_units();
    if requested > available {
        return Err(GymError::InsufficientBalance {
            requested,
            available,
        });
    }
    Ok(parsed)
}

/// Check that the sender can pay `wei_cost` for buying `amount`.
pub fn check_buy(amount: &str, sender_eth_balance: U256, wei_cost: U256) -> Result<TokenAmount> {
    let parsed = check_amount(amount)?;
    if wei_cost > sender_eth_balance {
        return Err(GymError::InsufficientFunds {
            required: wei_cost,
            available: sender_eth_balance,
        });
    }
    Ok(parsed)
}

/// Check that `amount` does not exceed the cached token balance.
pub fn check_sell(amount: &str, cached_token_balance: U256) -> Result<TokenAmount> {
    covers_balance(check_amount(amount)?, cached_token_balance)
}

/// Check amount, recipient format and cached balance for a transfer.
pub fn check_transfer(
    amount: &str,
    cached_token_balance: U256,
    recipient: &str,
) -> Result<(TokenAmount, Address)> {
    let parsed = check_amount(amount)?;
    let to = check_recipient(recipient)?;
    Ok((covers_balance(parsed, cached_token_balance)?, to))
}

/// Parse a transfer recipient, rejecting anything that is not a 20-byte address.
pub fn check_recipient(recipient: &str) -> Result<Address> {
    parse_address(recipient.trim()).map_err(|_| GymError::InvalidRecipient(recipient.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{to_base_units, wei_cost};

    const RECIPIENT: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn tokens(s: &str) -> U256 {
        to_base_units(s).unwrap()
    }

    #[test]
    fn test_invalid_amounts_rejected_by_every_check() {
        for bad in ["0", "0.0", "-5", "abc", ""] {
            assert!(matches!(
                check_buy(bad, U256::MAX, U256::ZERO).unwrap_err(),
                GymError::InvalidAmount(_)
            ));
            assert!(matches!(
                check_sell(bad, U256::MAX).unwrap_err(),
                GymError::InvalidAmount(_)
            ));
            assert!(matches!(
                check_transfer(bad, U256::MAX, RECIPIENT).unwrap_err(),
                GymError::InvalidAmount(_)
            ));
        }
    }

    #[test]
    fn test_check_buy_scenario() {
        // rate=1, divisor=10^7, 1000 tokens -> 10^14 wei.
        let cost = wei_cost(tokens("1000"), U256::from(1u64), U256::from(10_000_000u64)).unwrap();
        let short = U256::from(90_000_000_000_000u64);
        let err = check_buy("1000", short, cost).unwrap_err();
        assert!(matches!(
            err,
            GymError::InsufficientFunds { required, available } if required == cost && available == short
        ));

        let exact = U256::from(100_000_000_000_000u64);
        let ok = check_buy("1000", exact, cost).unwrap();
        assert_eq!(ok.base_units(), tokens("1000"));
    }

    #[test]
    fn test_check_buy_fails_iff_cost_exceeds_balance() {
        let balance = U256::from(1_000u64);
        for cost in [0u64, 1, 999, 1_000, 1_001, 50_000] {
            let result = check_buy("100", balance, U256::from(cost));
            assert_eq!(result.is_err(), cost > 1_000, "cost {cost}");
        }
    }

    #[test]
    fn test_check_sell_boundary_is_inclusive() {
        let balance = tokens("10");
        assert!(check_sell("10", balance).is_ok());
        assert!(check_sell("9.999999999999999999", balance).is_ok());
        assert!(matches!(
            check_sell("10.000000000000000001", balance).unwrap_err(),
            GymError::InsufficientBalance { .. }
        ));
    }

    #[test]
    fn test_check_transfer_ok() {
        let (amount, to) = check_transfer("2.5", tokens("2.5"), RECIPIENT).unwrap();
        assert_eq!(amount.to_string(), "2.5");
        assert_eq!(to.to_checksum(None), RECIPIENT);
    }

    #[test]
    fn test_check_transfer_invalid_recipient() {
        for bad in ["0x1234", "not an address", "", "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d35"] {
            assert!(matches!(
                check_transfer("1", tokens("5"), bad).unwrap_err(),
                GymError::InvalidRecipient(_)
            ));
        }
    }

    #[test]
    fn test_check_transfer_insufficient_balance() {
        assert!(matches!(
            check_transfer("6", tokens("5"), RECIPIENT).unwrap_err(),
            GymError::InsufficientBalance { .. }
        ));
    }

    #[test]
    fn test_check_transfer_accepts_never_used_address() {
        // Format validation only: a fresh lowercase address passes.
        let fresh = "0x00000000000000000000000000000000000000aa";
        assert!(check_transfer("1", tokens("1"), fresh).is_ok());
    }
}
