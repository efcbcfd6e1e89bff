//! 命令定义和实现

pub mod catalog;
pub mod config;
pub mod run;
pub mod send;

pub use catalog::CatalogCommand;
pub use config::ConfigCommand;
pub use run::RunCommand;
pub use send::SendCommand;
