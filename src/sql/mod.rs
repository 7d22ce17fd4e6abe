//! Safe SQL builder: identifiers quoted, values bound as parameters.

mod builder;
pub use builder::*;
