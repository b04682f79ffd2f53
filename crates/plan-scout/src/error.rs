/// Fatal input errors raised by the evaluation engine.
///
/// Data-quality ambiguity (an indeterminate fee structure, unparsed credit
/// language, a missing language tag) is never an error here; those cases are
/// carried as explicit values on the results themselves.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("usage profile must contain exactly 12 monthly values, found {found}")]
    UsageProfileLength { found: usize },
    #[error("usage profile value for month index {month} is negative or not finite")]
    InvalidUsageValue { month: usize },
    #[error("no TDU delivery rate was provided for the requested service area")]
    MissingTduRate,
    #[error("cannot rank an empty candidate plan list")]
    EmptyPlanList,
}
