//! Checks of sections whose content is expected to be constant.
//!
//! These sections are not converted. A deviation only means the chart uses something the
//! converter does not know about, so it is reported as an abnormality.

/// Expected lines of `#TAB EFFECT INFO`.
const TAB_EFFECT_INFO: [&str; 5] = [
    "1,\t90.00,\t400.00,\t18000.00,\t0.70",
    "1,\t90.00,\t600.00,\t15000.00,\t5.00",
    "2,\t90.00,\t40.00,\t5000.00,\t0.70",
    "2,\t90.00,\t40.00,\t2000.00,\t3.00",
    "3,\t100.00,\t30",
];

/// Expected ending of every `#TAB PARAM ASSIGN INFO` line.
const TAB_PARAM_ASSIGN_SUFFIX: &str = "0,\t0.00,\t0.00";

/// Whether the 1-based `line_number` of `#TAB EFFECT INFO` deviates from the expected table.
/// Lines past the table always deviate.
#[must_use]
pub fn tab_effect_is_abnormal(line_number: usize, line: &str) -> bool {
    line_number
        .checked_sub(1)
        .and_then(|index| TAB_EFFECT_INFO.get(index))
        .is_none_or(|expected| line.trim() != *expected)
}

/// Whether a `#TAB PARAM ASSIGN INFO` line deviates from the expected pattern.
#[must_use]
pub fn tab_param_assign_is_abnormal(line: &str) -> bool {
    !line.trim().ends_with(TAB_PARAM_ASSIGN_SUFFIX)
}

/// Whether the fields of a `Realize` line in `#SPCONTROLLER` deviate from the two known
/// presets.
#[must_use]
pub fn realize_is_abnormal(fields: &[&str]) -> bool {
    let cell = |index: usize| fields.get(index).map_or("", |field| field.trim());
    let expected = match cell(2) {
        "3" => ["36.12", "60.12", "110.12", "0.00"],
        "4" => ["0.62", "0.72", "1.03", "0.00"],
        _ => return false,
    };
    expected
        .iter()
        .enumerate()
        .any(|(offset, value)| cell(4 + offset) != *value)
}
