pub(crate) mod board;
