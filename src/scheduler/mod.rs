pub(crate) mod cancel;
pub(crate) mod clock;
pub(crate) mod driver;
pub(crate) mod state;
