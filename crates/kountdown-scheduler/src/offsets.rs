//! The fixed lead-time table: seconds before an event's target time at which
//! a reminder fires. Descending, terminating at 0 ("event has arrived").

/// Lead-time offsets in seconds. The `5 * 30` entry is long-established;
/// changing it would shift a reminder slot subscribers already rely on.
const OFFSETS: [i64; 20] = [
    10 * 24 * 3600,
    7 * 24 * 3600,
    5 * 24 * 3600,
    4 * 24 * 3600,
    3 * 24 * 3600,
    2 * 24 * 3600,
    36 * 3600,
    24 * 3600,
    18 * 3600,
    12 * 3600,
    9 * 3600,
    6 * 3600,
    4 * 3600,
    3 * 3600,
    2 * 3600,
    3600,
    30 * 60,
    10 * 60,
    5 * 30,
    0,
];

/// The offset table, largest lead time first, ending at zero.
pub fn offsets() -> &'static [i64] {
    &OFFSETS
}
