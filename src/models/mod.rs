mod license_key;
mod validation;

pub use license_key::*;
pub use validation::*;
