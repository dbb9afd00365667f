pub mod catalog;
pub mod market;
pub mod product;
pub mod state;

pub use catalog::*;
pub use market::*;
pub use product::*;
pub use state::*;
