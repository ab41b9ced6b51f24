//! Plural ("numerus") rules.
//!
//! Rules travel inside compiled catalogs as a compact byte program; see
//! [`RuleProgram`] for the encoding and [`table`] for the built-in rules per
//! language.

pub mod program;
pub mod table;

pub use program::{
    Comparison,
    Instruction,
    RuleProgram,
    RuleProgramError,
    Transform,
};
pub use table::{
    NumerusInfo,
    form_count,
    lookup,
    lookup_code,
    numerus_info_report,
};

/// Plural form index for `n` under the rule bytes of a compiled catalog.
///
/// Malformed rules select the first form.
#[must_use]
pub fn plural_index(rules: &[u8], n: u64) -> usize {
    match RuleProgram::from_bytes(rules) {
        Ok(program) => program.evaluate(n),
        Err(error) => {
            tracing::debug!(%error, "Ignoring malformed plural rules");
            0
        }
    }
}
