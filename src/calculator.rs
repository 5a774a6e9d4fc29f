//! Pack distribution module
//! Works out which whole packs to ship for an order, in two phases:
//! first the smallest shippable amount that covers the order, then the
//! fewest packs that add up to exactly that amount.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Pack size -> number of packs of that size to ship
pub type Breakdown = BTreeMap<u64, u64>;

/// Smallest bound used by the extended reachability scan
const EXTENDED_SEARCH_FLOOR: usize = 10_000;

/// Pack count marking an amount no combination of packs reaches
const UNREACHABLE: u32 = u32::MAX;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("no pack sizes available")]
    NoPackSizes,

    #[error("pack size {size} is too large")]
    PackSizeTooLarge { size: u64 },

    #[error("quantity {quantity} is too large to search")]
    QuantityTooLarge { quantity: i64 },

    #[error("amount {amount} is too large to solve")]
    AmountTooLarge { amount: usize },

    #[error("amount {target} cannot be assembled from the pack sizes (stalled at {stalled_at})")]
    UnreachableTarget { target: usize, stalled_at: usize },
}

impl CalculatorError {
    /// True when the error comes from the caller's input rather than a broken invariant
    pub fn is_input_error(&self) -> bool {
        !matches!(self, CalculatorError::UnreachableTarget { .. })
    }
}

/// Anything that can turn a quantity and a set of pack sizes into a breakdown
pub trait PackCalculator: Send + Sync {
    fn calculate(&self, quantity: i64, pack_sizes: &[u64]) -> Result<Breakdown, CalculatorError>;
}

/// Dynamic programming calculator
/// Rules, in order of priority:
/// 1. Only whole packs are shipped
/// 2. Ship the least number of items that fulfils the order
/// 3. Ship as few packs as possible
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicPackCalculator;

impl DynamicPackCalculator {
    pub fn new() -> Self {
        DynamicPackCalculator
    }
}

impl PackCalculator for DynamicPackCalculator {
    fn calculate(&self, quantity: i64, pack_sizes: &[u64]) -> Result<Breakdown, CalculatorError> {
        if quantity <= 0 {
            return Ok(Breakdown::new());
        }

        let sizes = normalize_pack_sizes(pack_sizes)?;
        let largest = match sizes.last() {
            Some(&largest) => largest,
            None => return Err(CalculatorError::NoPackSizes),
        };

        // The initial scan needs quantity + largest to be addressable
        let target_quantity = usize::try_from(quantity)
            .ok()
            .filter(|q| q.checked_add(largest).is_some())
            .ok_or(CalculatorError::QuantityTooLarge { quantity })?;

        let amount = find_minimum_amount(target_quantity, &sizes);
        debug!(quantity, amount, "minimum shippable amount found");

        let breakdown = find_minimum_packs(amount, &sizes)?;
        debug!(amount, packs = breakdown.values().sum::<u64>(), "minimum pack count found");
        Ok(breakdown)
    }
}

/// Drop zero sizes, then sort ascending and remove duplicates
fn normalize_pack_sizes(pack_sizes: &[u64]) -> Result<Vec<usize>, CalculatorError> {
    let mut sizes = pack_sizes
        .iter()
        .filter(|&&size| size > 0)
        .map(|&size| usize::try_from(size).map_err(|_| CalculatorError::PackSizeTooLarge { size }))
        .collect::<Result<Vec<_>, _>>()?;
    sizes.sort_unstable();
    sizes.dedup();
    Ok(sizes)
}

/// Find the smallest amount >= quantity that can be made from whole packs.
/// `pack_sizes` must be sorted ascending.
///
/// Tries the bound `quantity + largest` first, which always suffices for
/// positive sizes. If that fails, the search is repeated up to
/// `max(quantity * 2, 10000)`, and if that fails too a greedy fill is used.
/// The greedy result is not guaranteed minimal.
pub fn find_minimum_amount(quantity: usize, pack_sizes: &[usize]) -> usize {
    let largest = pack_sizes.last().copied().unwrap_or(0);

    if let Some(amount) = reachable_at_or_above(quantity, pack_sizes, quantity.saturating_add(largest)) {
        return amount;
    }

    let extended = quantity.saturating_mul(2).max(EXTENDED_SEARCH_FLOOR);
    warn!(quantity, bound = extended, "no reachable amount within initial bound, extending search");
    if let Some(amount) = reachable_at_or_above(quantity, pack_sizes, extended) {
        return amount;
    }

    warn!(quantity, "extended search found nothing, falling back to greedy fill");
    greedy_minimum_amount(quantity, pack_sizes)
}

/// Smallest amount in `[quantity, bound]` that is an exact sum of packs,
/// each size usable any number of times
pub fn reachable_at_or_above(quantity: usize, pack_sizes: &[usize], bound: usize) -> Option<usize> {
    if quantity > bound {
        return None;
    }

    // reachable[i] = true if amount i can be made exactly
    let mut reachable = vec![false; bound + 1];
    reachable[0] = true;

    for amount in 0..=bound {
        if amount > 0 {
            reachable[amount] = pack_sizes
                .iter()
                .any(|&size| size > 0 && size <= amount && reachable[amount - size]);
        }
        if amount >= quantity && reachable[amount] {
            return Some(amount);
        }
    }

    None
}

/// Greedy fallback: take as many of each size as fit, largest first,
/// then cover any remainder with one more of the smallest size
pub fn greedy_minimum_amount(quantity: usize, pack_sizes: &[usize]) -> usize {
    let mut remaining = quantity;
    let mut total = 0;

    for &size in pack_sizes.iter().rev().filter(|&&size| size > 0) {
        let packs = remaining / size;
        total += packs * size;
        remaining -= packs * size;
    }

    if remaining > 0 {
        if let Some(&smallest) = pack_sizes.iter().find(|&&size| size > 0) {
            total += smallest;
        }
    }

    total
}

/// Find the fewest packs that add up to exactly `target`.
///
/// Sizes are tried in the order given (ascending after normalisation) and
/// a table entry is only replaced on a strict improvement, so ties go to
/// the size tried first.
pub fn find_minimum_packs(target: usize, pack_sizes: &[usize]) -> Result<Breakdown, CalculatorError> {
    // Counts and useful sizes never exceed the target, so both tables fit in u32
    if u32::try_from(target).map_or(true, |target| target == u32::MAX) {
        return Err(CalculatorError::AmountTooLarge { amount: target });
    }

    // counts[i] = fewest packs to make i, last_size[i] = size of the last pack used
    let mut counts = vec![UNREACHABLE; target + 1];
    let mut last_size = vec![0u32; target + 1];
    counts[0] = 0;

    for amount in 1..=target {
        for &size in pack_sizes {
            if size == 0 || size > amount {
                continue;
            }
            let previous = counts[amount - size];
            if previous == UNREACHABLE {
                continue;
            }
            if previous + 1 < counts[amount] {
                counts[amount] = previous + 1;
                last_size[amount] = size as u32;
            }
        }
    }

    // Walk the last-pack pointers back down to zero
    let mut breakdown = Breakdown::new();
    let mut remaining = target;
    while remaining > 0 {
        if counts[remaining] == UNREACHABLE {
            return Err(CalculatorError::UnreachableTarget {
                target,
                stalled_at: remaining,
            });
        }
        let size = last_size[remaining] as usize;
        *breakdown.entry(size as u64).or_insert(0) += 1;
        remaining -= size;
    }

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use std::collections::HashMap;

    const STANDARD_SIZES: [u64; 5] = [250, 500, 1000, 2000, 5000];

    fn totals(breakdown: &Breakdown) -> (u64, u64) {
        let items = breakdown.iter().map(|(size, count)| size * count).sum();
        let packs = breakdown.values().sum();
        (items, packs)
    }

    /// Breadth-first search over pack counts: the first layer an amount
    /// shows up in is its fewest-packs count
    fn brute_force(quantity: usize, sizes: &[usize]) -> (usize, usize) {
        let limit = quantity + sizes.iter().copied().max().unwrap();
        let mut fewest: HashMap<usize, usize> = HashMap::from([(0, 0)]);
        let mut frontier = vec![0];
        let mut packs = 0;

        while !frontier.is_empty() {
            packs += 1;
            let mut next = Vec::new();
            for amount in frontier {
                for &size in sizes {
                    let total = amount + size;
                    if total <= limit && !fewest.contains_key(&total) {
                        fewest.insert(total, packs);
                        next.push(total);
                    }
                }
            }
            frontier = next;
        }

        let amount = fewest.keys().copied().filter(|&a| a >= quantity).min().unwrap();
        (amount, fewest[&amount])
    }

    #[test]
    fn test_standard_pack_sizes() {
        let calculator = DynamicPackCalculator::new();
        let cases = [
            (1, 250, 1),
            (250, 250, 1),
            (251, 500, 1),
            (501, 750, 2),
            (12001, 12250, 4),
        ];

        for (quantity, want_items, want_packs) in cases {
            let breakdown = calculator.calculate(quantity, &STANDARD_SIZES).unwrap();
            assert_eq!(
                totals(&breakdown),
                (want_items, want_packs),
                "quantity {} gave {:?}",
                quantity,
                breakdown
            );
        }
    }

    #[test]
    fn test_standard_breakdowns() {
        let calculator = DynamicPackCalculator::new();

        assert_eq!(calculator.calculate(1, &STANDARD_SIZES).unwrap(), Breakdown::from([(250, 1)]));
        assert_eq!(calculator.calculate(251, &STANDARD_SIZES).unwrap(), Breakdown::from([(500, 1)]));
        assert_eq!(
            calculator.calculate(501, &STANDARD_SIZES).unwrap(),
            Breakdown::from([(250, 1), (500, 1)])
        );
        assert_eq!(
            calculator.calculate(12001, &STANDARD_SIZES).unwrap(),
            Breakdown::from([(250, 1), (2000, 1), (5000, 2)])
        );
    }

    #[test]
    fn test_non_positive_quantity_ships_nothing() {
        let calculator = DynamicPackCalculator::new();
        assert!(calculator.calculate(0, &STANDARD_SIZES).unwrap().is_empty());
        assert!(calculator.calculate(-100, &STANDARD_SIZES).unwrap().is_empty());
        // Quantity is checked before the sizes
        assert!(calculator.calculate(0, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_pack_sizes_is_an_error() {
        let calculator = DynamicPackCalculator::new();
        assert_eq!(calculator.calculate(10, &[]), Err(CalculatorError::NoPackSizes));
        assert_eq!(calculator.calculate(10, &[0, 0]), Err(CalculatorError::NoPackSizes));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let calculator = DynamicPackCalculator::new();
        let shuffled = [2000, 250, 5000, 1000, 500, 250];

        for quantity in [1, 501, 12001, 7777] {
            assert_eq!(
                calculator.calculate(quantity, &shuffled).unwrap(),
                calculator.calculate(quantity, &STANDARD_SIZES).unwrap()
            );
        }
    }

    #[test]
    fn test_single_pack_size_rounds_up_to_a_multiple() {
        let calculator = DynamicPackCalculator::new();
        assert_eq!(calculator.calculate(1, &[7]).unwrap(), Breakdown::from([(7, 1)]));
        assert_eq!(calculator.calculate(21, &[7]).unwrap(), Breakdown::from([(7, 3)]));
        assert_eq!(calculator.calculate(22, &[7]).unwrap(), Breakdown::from([(7, 4)]));
    }

    #[test]
    fn test_ties_go_to_the_smallest_size_tried_first() {
        // 6 = 2 + 4 = 3 + 3, both two packs
        assert_eq!(find_minimum_packs(6, &[2, 3, 4]).unwrap(), Breakdown::from([(2, 1), (4, 1)]));
        // 10 = 1 + 9 = 4 + 6 = 5 + 5
        assert_eq!(
            find_minimum_packs(10, &[1, 4, 5, 6, 9]).unwrap(),
            Breakdown::from([(1, 1), (9, 1)])
        );
    }

    #[test]
    fn test_minimum_amount_prefers_exact_fit() {
        assert_eq!(find_minimum_amount(750, &[250, 500]), 750);
        assert_eq!(find_minimum_amount(751, &[250, 500]), 1000);
        assert_eq!(find_minimum_amount(0, &[250, 500]), 0);
        // 7 is not reachable from 3 and 5, 8 is
        assert_eq!(find_minimum_amount(7, &[3, 5]), 8);
    }

    #[test]
    fn test_reachable_scan_respects_bound() {
        assert_eq!(reachable_at_or_above(7, &[3, 5], 10), Some(8));
        assert_eq!(reachable_at_or_above(7, &[3, 5], 7), None);
        assert_eq!(reachable_at_or_above(11, &[3, 5], 10), None);
        assert_eq!(reachable_at_or_above(0, &[3, 5], 0), Some(0));
    }

    #[test]
    fn test_extended_search_tier() {
        // A trailing zero size collapses the initial bound to the quantity
        // itself, which 7 cannot reach, so the extended scan has to find it
        assert_eq!(find_minimum_amount(5, &[7, 0]), 7);
    }

    #[test]
    fn test_greedy_fallback_tier() {
        // 50000 lies beyond both the initial bound (100) and the extended one (10000)
        assert_eq!(find_minimum_amount(100, &[50_000, 0]), 50_000);
        // No usable sizes at all: every tier comes up empty
        assert_eq!(find_minimum_amount(5, &[]), 0);
    }

    #[test]
    fn test_greedy_minimum_amount() {
        assert_eq!(greedy_minimum_amount(12001, &[250, 500, 1000, 2000, 5000]), 12250);
        assert_eq!(greedy_minimum_amount(1000, &[250, 500]), 1000);
        // 7 -> one 5, remainder 2 covered by one more 3
        assert_eq!(greedy_minimum_amount(7, &[3, 5]), 8);
        // Not minimal: 6 = 3 + 3, greedy ships 5 + 3
        assert_eq!(greedy_minimum_amount(6, &[3, 5]), 8);
        assert_eq!(greedy_minimum_amount(0, &[3, 5]), 0);
    }

    #[test]
    fn test_unreachable_target_fails_loudly() {
        assert_eq!(
            find_minimum_packs(7, &[2, 4]),
            Err(CalculatorError::UnreachableTarget {
                target: 7,
                stalled_at: 7
            })
        );
        assert!(!CalculatorError::UnreachableTarget { target: 7, stalled_at: 7 }.is_input_error());
        assert!(CalculatorError::NoPackSizes.is_input_error());
    }

    #[test]
    fn test_zero_target_is_empty() {
        assert!(find_minimum_packs(0, &[3, 5]).unwrap().is_empty());
    }

    #[test]
    fn test_amount_beyond_count_table_is_rejected() {
        let amount = u32::MAX as usize;
        assert_eq!(
            find_minimum_packs(amount, &[1]),
            Err(CalculatorError::AmountTooLarge { amount })
        );
        assert!(CalculatorError::AmountTooLarge { amount }.is_input_error());
    }

    #[test]
    fn test_quantity_too_large() {
        let calculator = DynamicPackCalculator::new();
        assert_eq!(
            calculator.calculate(i64::MAX, &[u64::MAX]),
            Err(CalculatorError::QuantityTooLarge { quantity: i64::MAX })
        );
    }

    #[test]
    fn test_large_quantity_with_awkward_sizes() {
        let calculator = DynamicPackCalculator::new();
        let breakdown = calculator.calculate(500_000, &[23, 31, 53]).unwrap();
        let (items, packs) = totals(&breakdown);

        assert!(items >= 500_000, "shipped {} items", items);
        assert_eq!((items as usize, packs as usize), brute_force(500_000, &[23, 31, 53]));
    }

    #[test]
    fn test_matches_brute_force_on_random_orders() {
        let calculator = DynamicPackCalculator::new();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..200 {
            let num_sizes = rng.gen_range(1..=4);
            let sizes: Vec<u64> = (0..num_sizes).map(|_| rng.gen_range(1..=60)).collect();
            let quantity = rng.gen_range(1..=500);

            let breakdown = calculator.calculate(quantity, &sizes).unwrap();
            let (items, packs) = totals(&breakdown);

            let mut oracle_sizes: Vec<usize> = sizes.iter().map(|&s| s as usize).collect();
            oracle_sizes.sort_unstable();
            oracle_sizes.dedup();
            let expected = brute_force(quantity as usize, &oracle_sizes);

            assert_eq!(
                (items as usize, packs as usize),
                expected,
                "quantity {} with sizes {:?} gave {:?}",
                quantity,
                sizes,
                breakdown
            );
            assert!(breakdown.keys().all(|size| sizes.contains(size)));
        }
    }
}
