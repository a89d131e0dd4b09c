//! Presentation transforms applied to an item list before a run.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::eval::{self, Tokens};
use crate::model::{Item, Mode, ModeSet};

/// Attempts made by [`reshuffle_for_restart`] before accepting a repeated order.
pub const RESTART_SHUFFLE_ATTEMPTS: usize = 5;

/// Apply the reordering modes to `items`.
///
/// `Random` and `Surges` are exclusive upstream; if both arrive, the shuffle runs
/// first and the complexity sort wins. `Mirror` and `Fugues` do not reorder.
#[must_use]
pub fn prepare<R: Rng + ?Sized>(mut items: Vec<Item>, modes: ModeSet, rng: &mut R) -> Vec<Item> {
    if modes.contains(Mode::Random) {
        shuffle(&mut items, rng);
    }
    if modes.contains(Mode::Surges) {
        sort_by_complexity(&mut items);
    }
    items
}

/// Uniform Fisher–Yates shuffle.
pub fn shuffle<R: Rng + ?Sized>(items: &mut [Item], rng: &mut R) {
    items.shuffle(rng);
}

/// Stable ascending sort of the expression items by [`eval::complexity`].
///
/// Structured questions keep their slots; the sorted expressions are written
/// back into the positions that held expressions.
pub fn sort_by_complexity(items: &mut [Item]) {
    let slots: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_expression())
        .map(|(idx, _)| idx)
        .collect();

    let mut keyed: Vec<(f64, Item)> = slots
        .iter()
        .map(|&idx| {
            let item = items[idx].clone();
            let weight = match &item {
                Item::Expression(expr) => eval::complexity(expr),
                Item::Question { .. } => f64::INFINITY,
            };
            (weight, item)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (slot, (_, item)) in slots.into_iter().zip(keyed) {
        items[slot] = item;
    }
}

/// Reverse operand order and operator order of an expression.
///
/// ```
/// # use drill_core::transform::mirror;
/// assert_eq!(mirror("2-3"), "3-2");
/// assert_eq!(mirror("1+2×3"), "3×2+1");
/// ```
#[must_use]
pub fn mirror(expr: &str) -> String {
    Tokens::split(expr).mirrored().join()
}

/// Shuffle a copy of `previous`, retrying while the order is unchanged.
///
/// Gives up after [`RESTART_SHUFFLE_ATTEMPTS`] and returns whatever the last
/// shuffle produced.
#[must_use]
pub fn reshuffle_for_restart<R: Rng + ?Sized>(previous: &[Item], rng: &mut R) -> Vec<Item> {
    let mut next = previous.to_vec();
    for _ in 0..RESTART_SHUFFLE_ATTEMPTS {
        shuffle(&mut next, rng);
        if next.as_slice() != previous {
            break;
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn exprs(list: &[&str]) -> Vec<Item> {
        list.iter().map(|e| Item::expression(*e)).collect()
    }

    #[test]
    fn surges_orders_expressions_and_pins_questions() {
        let mut items = vec![
            Item::expression("9×9"),
            Item::question("q1", "a"),
            Item::expression("1+1"),
            Item::expression("5+5"),
            Item::question("q2", "b"),
            Item::expression("2+1"),
        ];
        sort_by_complexity(&mut items);

        assert_eq!(items[1], Item::question("q1", "a"));
        assert_eq!(items[4], Item::question("q2", "b"));
        let weights: Vec<f64> = items
            .iter()
            .filter_map(|item| match item {
                Item::Expression(e) => Some(eval::complexity(e)),
                Item::Question { .. } => None,
            })
            .collect();
        assert!(weights.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(items[0], Item::expression("1+1"));
    }

    #[test]
    fn surges_sort_is_stable_for_equal_weights() {
        let mut items = exprs(&["2+0", "1+2", "0+4", "0+1"]);
        sort_by_complexity(&mut items);
        assert_eq!(items, exprs(&["0+1", "2+0", "1+2", "0+4"]));
    }

    #[test]
    fn mirror_is_an_involution_on_form() {
        for expr in ["2-3", "1+2×3÷4", "7"] {
            assert_eq!(mirror(&mirror(expr)), expr);
        }
        assert_ne!(eval::expected_answer("2-3"), eval::expected_answer(&mirror("2-3")));
    }

    #[test]
    fn random_keeps_every_item() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = exprs(&["1+1", "2+2", "3+3", "4+4", "5+5"]);
        let modes = ModeSet::empty().with(Mode::Random);
        let mut shuffled = prepare(items.clone(), modes, &mut rng);
        shuffled.sort_by_key(ToString::to_string);
        assert_eq!(shuffled, items);
    }

    #[test]
    fn restart_reshuffle_changes_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let previous = exprs(&["1+1", "2+2", "3+3", "4+4"]);
        for _ in 0..50 {
            let next = reshuffle_for_restart(&previous, &mut rng);
            assert_ne!(next, previous);
        }
    }

    #[test]
    fn restart_of_single_item_terminates() {
        let mut rng = StdRng::seed_from_u64(1);
        let previous = exprs(&["1+1"]);
        assert_eq!(reshuffle_for_restart(&previous, &mut rng), previous);
    }
}
