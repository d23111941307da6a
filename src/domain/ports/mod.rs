pub mod defaults;
pub mod location;
pub mod persistence;
pub mod transport;

pub use defaults::*;
pub use location::*;
pub use persistence::*;
pub use transport::*;
