pub mod capture_session;
pub(crate) mod dispatcher;
pub mod exclusive;
