pub(crate) mod chunk;
pub(crate) mod segment;
pub(crate) mod tokenize;
