//! Macros for ergonomic controller construction.

/// Build a [`TransitionTable`](crate::core::TransitionTable) declaratively.
///
/// Each line names a destination and the sources allowed to enter it.
/// `initial` stands for "no state is current yet". An empty list restricts
/// the destination so that nothing may enter it.
///
/// # Example
///
/// ```
/// use stagehand::transition_table;
///
/// let table = transition_table! {
///     "cart" <= [initial],
///     "shipping" <= ["cart", "payment"],
///     "payment" <= ["shipping"],
///     "archive" <= [],
/// };
///
/// assert!(table.permits(None, "cart"));
/// assert!(table.permits(Some("payment"), "shipping"));
/// assert!(!table.permits(Some("cart"), "payment"));
/// assert!(!table.permits(Some("payment"), "archive"));
/// assert!(table.permits(Some("payment"), "receipt"));
/// ```
#[macro_export]
macro_rules! transition_table {
    (@edge $table:ident, $to:expr, initial) => {
        $table.allow_initial($to);
    };
    (@edge $table:ident, $to:expr, $from:expr) => {
        $table.allow($to, $from);
    };
    (
        $(
            $to:literal <= [$($from:tt),* $(,)?]
        ),* $(,)?
    ) => {{
        #[allow(unused_mut)]
        let mut table = $crate::core::TransitionTable::new();
        $(
            table.restrict($to);
            $(
                $crate::transition_table!(@edge table, $to, $from);
            )*
        )*
        table
    }};
}
