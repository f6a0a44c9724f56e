use tracing::debug;

use crate::models::TimeSlot;

/// Inputs a discount rule may look at. Rules never see mutable state.
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext {
    pub gross_amount: f64,
    pub seat_count: usize,
    pub slot: TimeSlot,
}

/// One independent discount rule. Each rule contributes a non-negative
/// amount; rules are additive and unaware of each other, so new rules
/// register without touching existing ones.
pub trait DiscountRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, ctx: &DiscountContext) -> f64;
}

/// Half off one seat, priced at the average per-seat price, when booking
/// three or more seats.
pub struct ThirdSeatRule;

impl DiscountRule for ThirdSeatRule {
    fn name(&self) -> &'static str {
        "third_seat"
    }

    fn apply(&self, ctx: &DiscountContext) -> f64 {
        if ctx.seat_count >= 3 {
            (ctx.gross_amount / ctx.seat_count as f64) * 0.50
        } else {
            0.0
        }
    }
}

/// 20% off the whole booking for afternoon shows.
pub struct AfternoonRule;

impl DiscountRule for AfternoonRule {
    fn name(&self) -> &'static str {
        "afternoon"
    }

    fn apply(&self, ctx: &DiscountContext) -> f64 {
        if ctx.slot == TimeSlot::Afternoon {
            ctx.gross_amount * 0.20
        } else {
            0.0
        }
    }
}

/// Composite over the registered rule set. Pure: no state, no I/O, same
/// inputs always produce the same discount.
pub struct DiscountEngine {
    rules: Vec<Box<dyn DiscountRule>>,
}

impl DiscountEngine {
    pub fn new(rules: Vec<Box<dyn DiscountRule>>) -> Self {
        Self { rules }
    }

    /// The production rule set.
    pub fn standard() -> Self {
        Self::new(vec![Box::new(ThirdSeatRule), Box::new(AfternoonRule)])
    }

    pub fn discount(&self, gross_amount: f64, seat_count: usize, slot: TimeSlot) -> f64 {
        let ctx = DiscountContext {
            gross_amount,
            seat_count,
            slot,
        };

        let mut total = 0.0;
        for rule in &self.rules {
            let amount = rule.apply(&ctx).max(0.0);
            if amount > 0.0 {
                debug!(rule = rule.name(), amount, "discount rule applied");
            }
            total += amount;
        }

        // The summed discount must never exceed the gross amount.
        total.min(gross_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn three_seats_off_peak_discounts_half_an_average_seat() {
        let engine = DiscountEngine::standard();
        let discount = engine.discount(600.0, 3, TimeSlot::Evening);
        assert_eq!(discount, 100.0);
        assert_eq!(600.0 - discount, 500.0);
    }

    #[test]
    fn afternoon_pair_gets_twenty_percent() {
        let engine = DiscountEngine::standard();
        let discount = engine.discount(300.0, 2, TimeSlot::Afternoon);
        assert_eq!(discount, 60.0);
        assert_eq!(300.0 - discount, 240.0);
    }

    #[test]
    fn rules_stack_additively() {
        let engine = DiscountEngine::standard();
        // 450 / 3 * 0.5 = 75, plus 450 * 0.2 = 90
        let discount = engine.discount(450.0, 3, TimeSlot::Afternoon);
        assert_eq!(discount, 165.0);
        assert_eq!(450.0 - discount, 285.0);
    }

    #[test]
    fn two_seats_off_peak_get_nothing() {
        let engine = DiscountEngine::standard();
        assert_eq!(engine.discount(300.0, 2, TimeSlot::Morning), 0.0);
    }

    #[test]
    fn empty_rule_set_never_discounts() {
        let engine = DiscountEngine::new(vec![]);
        assert_eq!(engine.discount(1000.0, 5, TimeSlot::Afternoon), 0.0);
    }

    proptest! {
        #[test]
        fn discount_stays_within_gross(
            gross in 0.0f64..1_000_000.0,
            seats in 1usize..64,
            slot_idx in 0usize..4,
        ) {
            let slot = [
                TimeSlot::Morning,
                TimeSlot::Afternoon,
                TimeSlot::Evening,
                TimeSlot::Night,
            ][slot_idx];
            let engine = DiscountEngine::standard();
            let discount = engine.discount(gross, seats, slot);
            prop_assert!(discount >= 0.0);
            prop_assert!(discount <= gross);
        }

        #[test]
        fn discount_is_deterministic(
            gross in 0.0f64..1_000_000.0,
            seats in 1usize..64,
        ) {
            let engine = DiscountEngine::standard();
            let first = engine.discount(gross, seats, TimeSlot::Afternoon);
            let second = engine.discount(gross, seats, TimeSlot::Afternoon);
            prop_assert_eq!(first, second);
        }
    }
}
