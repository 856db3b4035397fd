pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod events;
pub(crate) mod interpret;
pub(crate) mod pacer;
