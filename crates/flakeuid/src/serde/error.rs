/// Errors raised while decoding a layout id.
///
/// Generic over the id type so a rejected value can be carried back to the
/// caller for logging.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SerdeError<E> {
    /// The decoded value sets the reserved high bit.
    #[error("decoded id {id} sets the reserved bit")]
    DecodeOverflow { id: E },

    /// The string form is not a plain base-10 `u64`.
    #[error("{0:?} is not a decimal id")]
    NotDecimal(String),
}
