pub mod config;
pub mod logging;

pub mod conditional;
pub mod conformance;
pub mod controllers;
pub mod kalamar;
pub mod probe;
pub mod server;
pub mod session;
pub mod site;
