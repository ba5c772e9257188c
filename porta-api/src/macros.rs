//! Utility macros for reducing boilerplate

/// Implement `FromRef<AppState>` so a handler can extract one field of the
/// shared state directly.
///
/// # Example
/// ```ignore
/// impl_from_ref!(AgentLedger, ledger);
/// // Expands to:
/// impl axum::extract::FromRef<AppState> for AgentLedger {
///     fn from_ref(state: &AppState) -> Self {
///         state.ledger.clone()
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_from_ref {
    ($type:ty, $field:ident) => {
        impl axum::extract::FromRef<$crate::state::AppState> for $type {
            fn from_ref(state: &$crate::state::AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}
