
/// Independent compiler wide switches.
///
/// Passes only ever OR their requirement in, but nothing stops a reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerFlags {
    /// Need the heavy runtime support header
    pub need_heavy: bool,
    /// Need a trace dumper hook in the symbol table
    pub need_trace_dumper: bool,
    /// Need the foreign call interface headers
    pub dpi: bool,
    /// Build the generated model in parallel
    pub use_parallel_build: bool,
    /// Every node has a resolved data type
    pub assert_dtypes_resolved: bool,
    /// Constant folding must strip unknown bits
    pub const_remove_xs: bool,
}
