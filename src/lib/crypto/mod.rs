pub mod field;
pub mod packing;
pub mod poseidon;
