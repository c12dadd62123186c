//! Share computation for a single expense
//!
//! Turns an expense's split rule into per-participant owed amounts, applying
//! the configured [`SplitPolicy`] to fixed and percentage splits whose entries
//! don't add up.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{MemberId, Rate};
use crate::expense::{Expense, SplitMethod};
use crate::report::AnomalyKind;

/// What to do with fixed/percentage splits that don't reconcile with the total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Take split amounts verbatim and let paid and owed drift apart
    #[default]
    Tolerate,
    /// Rescale shares proportionally so they add up to the expense amount
    Normalize,
    /// Skip expenses whose split amounts don't reconcile
    Reject,
}

/// An owed amount for one participant
#[derive(Debug, Clone, PartialEq)]
pub struct Share<'a> {
    pub member: &'a MemberId,
    pub amount: Decimal,
}

/// Computes what each enabled participant owes for `expense`
///
/// An empty vector means nothing is owed: either nobody is enabled or, under
/// `Normalize`, the split amounts total zero. The caller still credits the payer.
///
/// # Errors
///
/// Returns the anomaly that makes the whole expense inert: a rejected split
/// mismatch, or arithmetic overflow.
pub fn compute_shares<'a>(
    expense: &'a Expense,
    policy: SplitPolicy,
    tolerance: Decimal,
) -> Result<Vec<Share<'a>>, AnomalyKind> {
    let participants: Vec<_> = expense.participants().collect();
    if participants.is_empty() {
        return Ok(Vec::new());
    }

    if policy == SplitPolicy::Reject {
        match expense.split_mismatch(tolerance) {
            Ok(None) => {}
            Ok(Some((expected, actual))) => {
                return Err(AnomalyKind::SplitMismatch { expected, actual })
            }
            Err(_) => return Err(AnomalyKind::ArithmeticOverflow),
        }
    }

    let mut shares = Vec::with_capacity(participants.len());
    match expense.split_method {
        SplitMethod::Equal => {
            let count = Decimal::from(participants.len() as u64);
            let each = expense
                .amount
                .checked_div(count)
                .ok_or(AnomalyKind::ArithmeticOverflow)?;
            for detail in &participants {
                if let Some(member) = detail.participant() {
                    shares.push(Share { member, amount: each });
                }
            }
            // Equal shares already reconcile, nothing to normalise
            return Ok(shares);
        }
        SplitMethod::Fixed => {
            for detail in &participants {
                if let Some(member) = detail.participant() {
                    let amount = detail.split_amount.unwrap_or(Decimal::ZERO);
                    shares.push(Share { member, amount });
                }
            }
        }
        SplitMethod::Percentage => {
            for detail in &participants {
                if let Some(member) = detail.participant() {
                    let rate = Rate::from_percentage(detail.split_amount.unwrap_or(Decimal::ZERO));
                    let amount = rate
                        .checked_apply(expense.amount)
                        .ok_or(AnomalyKind::ArithmeticOverflow)?;
                    shares.push(Share { member, amount });
                }
            }
        }
    }

    if policy == SplitPolicy::Normalize {
        normalize(&mut shares, expense.amount)?;
    }

    Ok(shares)
}

/// Rescales shares so they sum to `target`; zero-total splits owe nothing
fn normalize(shares: &mut Vec<Share<'_>>, target: Decimal) -> Result<(), AnomalyKind> {
    let total = shares
        .iter()
        .try_fold(Decimal::ZERO, |acc, share| acc.checked_add(share.amount))
        .ok_or(AnomalyKind::ArithmeticOverflow)?;

    if total.is_zero() {
        shares.clear();
        return Ok(());
    }

    if total == target {
        return Ok(());
    }

    for share in shares.iter_mut() {
        share.amount = share
            .amount
            .checked_mul(target)
            .and_then(|scaled| scaled.checked_div(total))
            .ok_or(AnomalyKind::ArithmeticOverflow)?;
    }

    Ok(())
}
