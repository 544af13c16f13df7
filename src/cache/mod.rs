pub mod record;
pub mod store;
pub mod validity;
