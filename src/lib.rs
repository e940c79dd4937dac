pub mod banner;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod resolver;
pub mod response;
pub mod server;
