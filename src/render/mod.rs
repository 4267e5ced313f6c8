pub(crate) mod canvas;
pub(crate) mod entry;
pub(crate) mod fonts;
pub(crate) mod poster;
