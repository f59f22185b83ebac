pub(crate) mod landmark;
pub(crate) mod provider;
pub(crate) mod replay;
