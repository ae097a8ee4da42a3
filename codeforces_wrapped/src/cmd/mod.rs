pub mod server;
pub mod wrapped;
