pub mod cycles;

pub use self::cycles::{compute_cycles, validate_cycles};
