//! Core parser trait

/// Trait for reply parsers.
///
/// Reply parsers never fail: input they cannot understand degrades to a
/// documented default value of `Output`.
pub trait OutputParser: Send + Sync {
    /// The output type produced by this parser
    type Output;

    /// Parse the raw reply text
    fn parse(&self, raw: &str) -> Self::Output;

    /// Check if the input contains something this parser recognises
    fn can_parse(&self, raw: &str) -> bool;

    /// Get the parser name for debugging
    fn name(&self) -> &'static str;
}
