/// Common introspection surface of every parametrized component.
pub trait Layer {
    fn layer_type(&self) -> &str;

    /// Number of learned scalars.
    fn parameters(&self) -> usize;
}
