pub mod expiry;
pub mod index;
pub mod lock;
pub mod paths;
pub mod record;
pub mod serial;
pub mod store;
pub mod tags;
