//! Macros for ergonomic slice mappings.

/// Build a [`Slices`](crate::compose::Slices) mapping from `name: constructor`
/// pairs, using each identifier as the slice name. An optional trailing
/// `; fallback = <LabelFallback>` sets the label fallback.
///
/// Evaluates to `Result<Slices, CompositionError>`.
///
/// # Example
///
/// ```
/// use slicestate::slices;
/// use slicestate::compose::{LabelFallback, SliceMutator};
/// use slicestate::core::Slice;
/// use slicestate::store::{BoxError, GetState, Store};
///
/// fn bear(_set: SliceMutator, _get: GetState, _store: Store) -> Result<Slice, BoxError> {
///     Ok(Slice::new().field("bears", 0))
/// }
///
/// fn fish(_set: SliceMutator, _get: GetState, _store: Store) -> Result<Slice, BoxError> {
///     Ok(Slice::new().field("fishes", 0))
/// }
///
/// let slices = slices! {
///     bear: bear,
///     fish: fish,
/// }
/// .unwrap();
/// assert_eq!(slices.names().collect::<Vec<_>>(), vec!["bear", "fish"]);
///
/// let quiet = slices! {
///     bear: bear;
///     fallback = LabelFallback::Omit
/// }
/// .unwrap();
/// assert_eq!(quiet.fallback(), &LabelFallback::Omit);
/// ```
#[macro_export]
macro_rules! slices {
    (
        $($name:ident : $constructor:expr),* $(,)?
    ) => {
        $crate::compose::Slices::builder()
            $(.slice(stringify!($name), $constructor))*
            .build()
    };

    (
        $($name:ident : $constructor:expr),* $(,)?;
        fallback = $fallback:expr $(,)?
    ) => {
        $crate::compose::Slices::builder()
            $(.slice(stringify!($name), $constructor))*
            .fallback($fallback)
            .build()
    };
}
