pub mod assignment;
pub mod fleet;
pub mod trip;
