// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Human-readable descriptions for the reason codes carried by status
//! reports and custody signals. The wire format only ever needs the raw
//! byte; this table exists for logging and diagnostics.

use std::collections::HashMap;

use once_cell::sync::Lazy;

const CODES: &[(u8, &str)] = &[
    (0, "no additional information"),
    (1, "lifetime expired"),
    (2, "forwarded over unidirectional link"),
    (3, "transmission canceled"),
    (4, "depleted storage"),
    (5, "destination endpoint ID unintelligible"),
    (6, "no known route to destination from here"),
    (7, "no timely contact with next node on route"),
    (8, "block unintelligible"),
    (9, "custody transfer refused: redundant reception"),
    (10, "custody transfer refused: depleted storage"),
    (11, "custody transfer refused: destination EID unintelligible"),
    (12, "custody transfer refused: no route to destination"),
    (13, "custody transfer refused: no timely contact"),
    (14, "custody transfer refused: block unintelligible"),
];

static REASON_TABLE: Lazy<HashMap<u8, &'static str>> =
    Lazy::new(|| CODES.iter().copied().collect());

/// Looks up the human-readable description of a reason code, for use in
/// logs; `None` for codes outside the assigned range.
pub fn describe(code: u8) -> Option<&'static str> {
    REASON_TABLE.get(&code).copied()
}

/// Same lookup with a fallback for unassigned codes, for `Debug` impls.
#[inline]
pub fn describe_or_unassigned(code: u8) -> &'static str {
    describe(code).unwrap_or("unassigned reason code")
}
