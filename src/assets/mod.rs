pub(crate) mod blob;
pub(crate) mod data_url;
pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod source;
