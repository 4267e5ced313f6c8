pub(crate) mod font_size;
