pub mod bundle;
pub mod leaf;
pub mod merkle;
pub mod record;
