//! Sampling and labor-time engine
//!
//! Pure functions over the Z1.4 tables. Nothing here fails: inputs are
//! validated by the caller (see [`crate::plan::validate`]) before they reach
//! [`calculate`].

use super::calculation::{
    CalculationInput, CalculationResult, OrderResult, PurchaseOrderInput, TimeBreakdown,
    HOURS_PER_MAN_DAY,
};
use super::tables::{self, AcceptanceNumbers};
use super::types::{CodeLetter, InspectionLevel, QualityLimit};

/// Code letter for a lot of `lot_size` units at `level`
///
/// Falls back to the level's largest code letter if no breakpoint covers the
/// lot, which cannot happen while every table ends in an unbounded row.
pub fn resolve_code_letter(lot_size: u32, level: InspectionLevel) -> CodeLetter {
    tables::breakpoints(level)
        .iter()
        .find(|bp| bp.max_lot_size.map_or(true, |max| lot_size <= max))
        .map(|bp| bp.code)
        .unwrap_or_else(|| tables::highest_code(level))
}

/// Lot size range of the table row that covers `lot_size`, as (min, max)
pub fn lot_band(lot_size: u32, level: InspectionLevel) -> (u32, Option<u32>) {
    let mut min = 1;
    for bp in tables::breakpoints(level) {
        match bp.max_lot_size {
            Some(max) if lot_size > max => min = max.saturating_add(1),
            other => return (min, other),
        }
    }
    (min, None)
}

/// Number of units to draw for a code letter
pub fn sample_size(code: CodeLetter) -> u32 {
    tables::SAMPLE_SIZES[code.index()]
}

/// Accept/reject numbers for a code letter at a quality limit
pub fn acceptance(code: CodeLetter, limit: QualityLimit) -> AcceptanceNumbers {
    tables::ACCEPTANCE_CRITERIA[code.index()][limit.index()]
}

/// Derive the sampling plan for a single order
pub fn plan_order(order: &PurchaseOrderInput, input: &CalculationInput) -> OrderResult {
    let code_letter = resolve_code_letter(order.quantity, input.inspection_level);
    let sample_size = sample_size(code_letter);
    let major = acceptance(code_letter, input.aql_major);
    let minor = acceptance(code_letter, input.aql_minor);

    let (functional_test_code_letter, functional_test_sample_size, functional_test_time_minutes) =
        match order.functional_test() {
            Some((level, minutes_per_unit)) => {
                let code = resolve_code_letter(order.quantity, level);
                let size = self::sample_size(code);
                (Some(code), Some(size), Some(f64::from(size) * minutes_per_unit))
            }
            None => (None, None, None),
        };

    OrderResult {
        po_number: order.po_number.clone(),
        quantity: order.quantity,
        code_letter,
        sample_size,
        ac_major: major.ac,
        re_major: major.re,
        ac_minor: minor.ac,
        re_minor: minor.re,
        functional_test_code_letter,
        functional_test_sample_size,
        functional_test_time_minutes,
    }
}

/// Run the full calculation: per-order plans plus the time estimate
pub fn calculate(input: &CalculationInput) -> CalculationResult {
    let po_results: Vec<OrderResult> = input.pos.iter().map(|po| plan_order(po, input)).collect();

    let total_samples: u32 = po_results.iter().map(|r| r.sample_size).sum();

    let functional_test_hours: f64 = po_results
        .iter()
        .map(|r| r.functional_test_time_minutes.unwrap_or(0.0) / 60.0)
        .sum();

    let preparation_hours = input.preparation_time_minutes / 60.0;
    let sampling_hours = (input.sampling_time_minutes * input.pos.len() as f64) / 60.0;
    let inspection_hours = (f64::from(total_samples) * input.inspection_time_per_unit_minutes) / 60.0;
    let packing_check_hours = input.packing_check_time_minutes / 60.0;
    let report_hours = input.report_time_minutes / 60.0;
    let travel_hours = input.travel_time_minutes / 60.0;

    let subtotal_without_travel = preparation_hours
        + sampling_hours
        + inspection_hours
        + functional_test_hours
        + packing_check_hours
        + report_hours;

    let total_hours = if input.include_travel_time {
        subtotal_without_travel + travel_hours
    } else {
        subtotal_without_travel
    };

    CalculationResult {
        po_results,
        total_samples,
        total_man_days: total_hours / HOURS_PER_MAN_DAY,
        total_hours,
        exceeds_one_day: total_hours > HOURS_PER_MAN_DAY,
        include_travel_time: input.include_travel_time,
        travel_route: input.travel_route.clone(),
        breakdown: TimeBreakdown {
            preparation_hours,
            sampling_hours,
            inspection_hours,
            functional_test_hours,
            packing_check_hours,
            report_hours,
            travel_hours,
            subtotal_without_travel,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn single_order(quantity: u32) -> CalculationInput {
        CalculationInput {
            pos: vec![PurchaseOrderInput::new("PO-001", quantity)],
            ..Default::default()
        }
    }

    #[test]
    fn test_resolver_is_exhaustive() {
        let probes = (1..=20_000u32)
            .chain((20_000..=10_000_000u32).step_by(997))
            .chain([u32::MAX - 1, u32::MAX]);
        for level in InspectionLevel::ALL {
            for lot in probes.clone() {
                let code = resolve_code_letter(lot, level);
                let matched = tables::breakpoints(level)
                    .iter()
                    .filter(|bp| bp.max_lot_size.map_or(true, |max| lot <= max))
                    .count();
                assert!(matched >= 1, "level {} lot {} has no breakpoint", level, lot);
                assert!(code <= tables::highest_code(level));
            }
        }
    }

    #[test]
    fn test_resolver_is_monotonic_in_sample_size() {
        for level in InspectionLevel::ALL {
            let mut previous = 0;
            for lot in (1..=600_000u32).step_by(7).chain([600_000, 5_000_000, u32::MAX]) {
                let size = sample_size(resolve_code_letter(lot, level));
                assert!(size >= previous, "level {} shrinks at lot {}", level, lot);
                previous = size;
            }
        }
    }

    #[test]
    fn test_resolver_boundaries() {
        assert_eq!(resolve_code_letter(1, InspectionLevel::II), CodeLetter::A);
        assert_eq!(resolve_code_letter(8, InspectionLevel::II), CodeLetter::A);
        assert_eq!(resolve_code_letter(9, InspectionLevel::II), CodeLetter::B);
        assert_eq!(resolve_code_letter(1200, InspectionLevel::II), CodeLetter::J);
        assert_eq!(resolve_code_letter(1201, InspectionLevel::II), CodeLetter::K);
        assert_eq!(resolve_code_letter(500_000, InspectionLevel::II), CodeLetter::P);
        assert_eq!(resolve_code_letter(500_001, InspectionLevel::II), CodeLetter::Q);
        assert_eq!(resolve_code_letter(1000, InspectionLevel::S3), CodeLetter::D);
        assert_eq!(resolve_code_letter(1000, InspectionLevel::S4), CodeLetter::F);
        assert_eq!(resolve_code_letter(1000, InspectionLevel::I), CodeLetter::G);
    }

    #[test]
    fn test_every_code_has_positive_sample_size() {
        for code in CodeLetter::ALL {
            assert!(sample_size(code) > 0, "code {}", code);
        }
        assert_eq!(sample_size(CodeLetter::A), 2);
        assert_eq!(sample_size(CodeLetter::R), 2000);
    }

    #[test]
    fn test_reject_never_below_accept() {
        for code in CodeLetter::ALL {
            for limit in QualityLimit::ALL {
                let numbers = acceptance(code, limit);
                assert!(numbers.re >= numbers.ac, "code {} @ {}", code, limit);
            }
        }
    }

    #[test]
    fn test_lot_of_1000_at_level_ii() {
        let code = resolve_code_letter(1000, InspectionLevel::II);
        assert_eq!(code, CodeLetter::J);
        assert_eq!(sample_size(code), 80);
        assert_eq!(acceptance(code, QualityLimit::Aql2_5), AcceptanceNumbers { ac: 3, re: 4 });
        assert_eq!(acceptance(code, QualityLimit::Aql4_0), AcceptanceNumbers { ac: 7, re: 8 });
    }

    #[test]
    fn test_single_order_end_to_end() {
        let result = calculate(&single_order(1000));

        assert_eq!(result.po_results.len(), 1);
        let po = &result.po_results[0];
        assert_eq!(po.code_letter, CodeLetter::J);
        assert_eq!((po.ac_major, po.re_major), (3, 4));
        assert_eq!((po.ac_minor, po.re_minor), (7, 8));
        assert!(!po.has_functional_test());

        assert_eq!(result.total_samples, 80);
        assert!((result.breakdown.inspection_hours - 80.0 * 2.5 / 60.0).abs() < EPS);
        assert!((result.breakdown.preparation_hours - 0.5).abs() < EPS);
        assert!((result.breakdown.sampling_hours - 10.0 / 60.0).abs() < EPS);
        assert!((result.breakdown.packing_check_hours - 0.5).abs() < EPS);
        assert!((result.breakdown.report_hours - 0.75).abs() < EPS);
        assert_eq!(result.breakdown.functional_test_hours, 0.0);
        assert!((result.breakdown.subtotal_without_travel - 5.25).abs() < EPS);
        assert!((result.total_hours - 5.25).abs() < EPS);
        assert!((result.total_man_days - 0.525).abs() < EPS);
        assert!(!result.exceeds_one_day);
    }

    #[test]
    fn test_two_orders_double_sampling_time() {
        let input = CalculationInput {
            pos: vec![
                PurchaseOrderInput::new("PO-001", 1000),
                PurchaseOrderInput::new("PO-002", 5000),
            ],
            ..Default::default()
        };
        let one = calculate(&single_order(1000));
        let two = calculate(&input);

        assert_eq!(two.po_results[1].code_letter, CodeLetter::L);
        assert_eq!(two.total_samples, 80 + 200);
        assert!((two.breakdown.sampling_hours - 2.0 * one.breakdown.sampling_hours).abs() < EPS);
        assert!((two.breakdown.sampling_hours - 20.0 / 60.0).abs() < EPS);
        assert!((two.breakdown.inspection_hours - 280.0 * 2.5 / 60.0).abs() < EPS);
    }

    #[test]
    fn test_functional_test_uses_order_level() {
        let input = CalculationInput {
            pos: vec![PurchaseOrderInput::new("PO-001", 1000)
                .with_functional_test(InspectionLevel::II, 5.0)],
            ..Default::default()
        };
        let result = calculate(&input);
        let po = &result.po_results[0];

        assert_eq!(po.functional_test_code_letter, Some(CodeLetter::J));
        assert_eq!(po.functional_test_sample_size, Some(80));
        assert_eq!(po.functional_test_time_minutes, Some(400.0));
        assert!((result.breakdown.functional_test_hours - 400.0 / 60.0).abs() < EPS);
        assert!((result.total_hours - (5.25 + 400.0 / 60.0)).abs() < EPS);
        // functional samples are not part of the standard sample count
        assert_eq!(result.total_samples, 80);
        assert_eq!(result.functional_test_samples(), 80);
    }

    #[test]
    fn test_functional_test_level_differs_from_global() {
        let input = CalculationInput {
            inspection_level: InspectionLevel::II,
            pos: vec![PurchaseOrderInput::new("PO-001", 1000)
                .with_functional_test(InspectionLevel::S3, 2.0)],
            ..Default::default()
        };
        let po = &calculate(&input).po_results[0];
        assert_eq!(po.code_letter, CodeLetter::J);
        assert_eq!(po.functional_test_code_letter, Some(CodeLetter::D));
        assert_eq!(po.functional_test_sample_size, Some(8));
        assert_eq!(po.functional_test_time_minutes, Some(16.0));
    }

    #[test]
    fn test_zero_functional_time_has_no_effect() {
        let input = CalculationInput {
            pos: vec![PurchaseOrderInput::new("PO-001", 1000)
                .with_functional_test(InspectionLevel::S3, 0.0)],
            ..Default::default()
        };
        let result = calculate(&input);
        assert!(!result.po_results[0].has_functional_test());
        assert_eq!(result.breakdown.functional_test_hours, 0.0);
    }

    #[test]
    fn test_travel_toggle() {
        let mut input = single_order(1000);
        input.travel_time_minutes = 180.0;

        input.include_travel_time = false;
        let without = calculate(&input);
        input.include_travel_time = true;
        let with = calculate(&input);

        assert!((with.total_hours - without.total_hours - 3.0).abs() < EPS);
        assert_eq!(with.breakdown, without.breakdown);
        assert!((with.breakdown.travel_hours - 3.0).abs() < EPS);
        assert!(with.include_travel_time);
        assert!(!without.include_travel_time);
    }

    #[test]
    fn test_exceeds_one_day_is_strict() {
        let mut input = single_order(1000);
        input.preparation_time_minutes = 0.0;
        input.sampling_time_minutes = 0.0;
        input.inspection_time_per_unit_minutes = 0.0;
        input.packing_check_time_minutes = 0.0;
        input.report_time_minutes = 600.0;

        let exactly = calculate(&input);
        assert!((exactly.total_hours - 10.0).abs() < EPS);
        assert!(!exactly.exceeds_one_day);
        assert!((exactly.total_man_days - 1.0).abs() < EPS);

        input.report_time_minutes = 600.6;
        let over = calculate(&input);
        assert!((over.total_hours - 10.01).abs() < EPS);
        assert!(over.exceeds_one_day);
    }

    #[test]
    fn test_travel_route_is_echoed() {
        let mut input = single_order(100);
        input.travel_route = Some("Shenzhen -> Dongguan".to_string());
        let result = calculate(&input);
        assert_eq!(result.travel_route.as_deref(), Some("Shenzhen -> Dongguan"));
    }

    #[test]
    fn test_results_keep_input_order() {
        let input = CalculationInput {
            pos: vec![
                PurchaseOrderInput::new("B", 5000),
                PurchaseOrderInput::new("A", 10),
                PurchaseOrderInput::new("C", 300),
            ],
            ..Default::default()
        };
        let labels: Vec<_> = calculate(&input)
            .po_results
            .into_iter()
            .map(|r| r.po_number)
            .collect();
        assert_eq!(labels, ["B", "A", "C"]);
    }

    #[test]
    fn test_lot_band() {
        assert_eq!(lot_band(1000, InspectionLevel::II), (501, Some(1200)));
        assert_eq!(lot_band(2, InspectionLevel::II), (1, Some(8)));
        assert_eq!(lot_band(9, InspectionLevel::II), (9, Some(15)));
        assert_eq!(lot_band(600_000, InspectionLevel::II), (500_001, None));
    }
}
