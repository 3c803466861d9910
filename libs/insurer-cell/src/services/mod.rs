pub mod insurer;

pub use insurer::InsurerService;
