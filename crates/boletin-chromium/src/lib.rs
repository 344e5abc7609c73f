pub mod backend;
pub mod cdp;
mod js;

pub use backend::ChromiumBackend;
