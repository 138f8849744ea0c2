pub mod config;
pub mod decoder;
pub mod handoff;
pub mod query;
pub mod store;
pub mod types;
pub mod view;

pub use config::*;
pub use decoder::*;
pub use handoff::*;
pub use query::*;
pub use store::*;
pub use types::*;
pub use view::*;
