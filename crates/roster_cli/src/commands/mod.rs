pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod output;
pub(crate) mod profile;
pub(crate) mod repos;
