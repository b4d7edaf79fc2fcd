pub mod amounts;
pub mod math_helpers;
pub mod price;
pub mod tick;
