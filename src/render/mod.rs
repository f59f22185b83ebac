pub(crate) mod compositor;
pub(crate) mod sink;
pub(crate) mod surface;
