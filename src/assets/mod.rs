pub(crate) mod decode;
pub(crate) mod garment;
pub(crate) mod source;
