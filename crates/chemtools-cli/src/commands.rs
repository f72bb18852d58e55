pub mod browse;
pub mod calc;
pub mod link;
