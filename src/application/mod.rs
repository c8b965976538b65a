pub mod controller;
pub mod debounce;
pub mod query;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::*;
pub use debounce::*;
pub use query::*;
