pub(crate) mod array;
pub(crate) mod command;
pub(crate) mod script;
