//! Greedy creditor/debtor matching.
//!
//! The single balance-netting primitive behind both the peer settlement
//! optimizer and the entity cashflow allocator. Parties with a positive net
//! receive money, parties with a negative net pay; the largest outstanding
//! debtor is repeatedly matched against the largest outstanding creditor.
//!
//! Guarantees:
//! - deterministic: both sides are ordered by magnitude descending, ties
//!   broken by id ascending;
//! - every emitted amount is at least `min_transfer`;
//! - at most `qualifying positions - 1` transfers;
//! - executing every transfer brings all nets below `min_transfer`.
//!
//! The exact minimum-transfer-count problem is NP-hard; this greedy
//! approximation is the specified behavior.

use crate::MoneyCents;

/// A party with a signed net amount: positive = is owed, negative = owes.
#[derive(Clone, Debug)]
pub(crate) struct NetPosition {
    pub id: String,
    pub net: MoneyCents,
}

/// One matched payment from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MatchedTransfer {
    pub from_id: String,
    pub to_id: String,
    pub amount: MoneyCents,
}

/// Matches debtors against creditors, largest first.
///
/// Positions whose magnitude is below `min_transfer` are ignored, and a
/// party drops out of the matching as soon as its remainder falls below
/// `min_transfer` (a floor of at least one cent always applies).
pub(crate) fn match_positions(
    positions: Vec<NetPosition>,
    min_transfer: MoneyCents,
) -> Vec<MatchedTransfer> {
    let floor = min_transfer.max(MoneyCents::new(1));

    let mut creditors: Vec<(String, MoneyCents)> = Vec::new();
    let mut debtors: Vec<(String, MoneyCents)> = Vec::new();
    for position in positions {
        let magnitude = position.net.abs();
        if magnitude < floor {
            continue;
        }
        if position.net.is_positive() {
            creditors.push((position.id, magnitude));
        } else {
            debtors.push((position.id, magnitude));
        }
    }

    fn by_magnitude_then_id(a: &(String, MoneyCents), b: &(String, MoneyCents)) -> std::cmp::Ordering {
        b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
    }
    creditors.sort_by(by_magnitude_then_id);
    debtors.sort_by(by_magnitude_then_id);

    let mut transfers = Vec::new();
    let (mut d, mut c) = (0, 0);
    while d < debtors.len() && c < creditors.len() {
        // Both remainders are >= floor here, so the transfer is too.
        let amount = debtors[d].1.min(creditors[c].1);
        transfers.push(MatchedTransfer {
            from_id: debtors[d].0.clone(),
            to_id: creditors[c].0.clone(),
            amount,
        });
        debtors[d].1 -= amount;
        creditors[c].1 -= amount;
        if debtors[d].1 < floor {
            d += 1;
        }
        if creditors[c].1 < floor {
            c += 1;
        }
    }
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(id: &str, net: i64) -> NetPosition {
        NetPosition {
            id: id.to_string(),
            net: MoneyCents::new(net),
        }
    }

    fn match_all(positions: Vec<NetPosition>) -> Vec<MatchedTransfer> {
        match_positions(positions, MoneyCents::new(1))
    }

    #[test]
    fn one_creditor_two_debtors() {
        let transfers = match_all(vec![
            position("a", 300_00),
            position("b", -100_00),
            position("c", -200_00),
        ]);

        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].from_id, "c");
        assert_eq!(transfers[0].to_id, "a");
        assert_eq!(transfers[0].amount, MoneyCents::new(200_00));
        assert_eq!(transfers[1].from_id, "b");
        assert_eq!(transfers[1].amount, MoneyCents::new(100_00));

        let total: MoneyCents = transfers.iter().map(|t| t.amount).sum();
        assert_eq!(total, MoneyCents::new(300_00));
    }

    #[test]
    fn transfer_count_is_bounded() {
        let transfers = match_all(vec![
            position("a", 50_00),
            position("b", 30_00),
            position("c", -40_00),
            position("d", -25_00),
            position("e", -15_00),
        ]);
        // Five nonzero positions allow at most four transfers.
        assert!(transfers.len() <= 4);
    }

    #[test]
    fn ties_break_by_id() {
        let first = match_all(vec![
            position("b", -50_00),
            position("a", -50_00),
            position("z", 100_00),
        ]);
        let second = match_all(vec![
            position("a", -50_00),
            position("z", 100_00),
            position("b", -50_00),
        ]);

        assert_eq!(first, second);
        assert_eq!(first[0].from_id, "a");
        assert_eq!(first[1].from_id, "b");
    }

    #[test]
    fn zero_positions_produce_no_transfers() {
        assert!(match_all(vec![position("a", 0), position("b", 0)]).is_empty());
    }

    #[test]
    fn amounts_below_the_floor_are_suppressed() {
        let transfers = match_positions(
            vec![position("a", 500_00), position("b", -499_50), position("c", -50)],
            MoneyCents::new(1_00),
        );

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from_id, "b");
        assert_eq!(transfers[0].amount, MoneyCents::new(499_50));
    }
}
