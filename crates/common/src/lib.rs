pub mod faces;
pub mod store;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
