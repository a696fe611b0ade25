pub mod config;
pub mod logging;

pub mod augment;
pub mod cookies;
pub mod dom;
pub mod flow;
pub mod locator;
pub mod metadata;
pub mod prefs;
pub mod request;
pub mod site;
pub mod validate;
