use std::fmt::Debug;

/// Data trait used throughout the package
/// to control for floating point numbers.
pub trait FloatData<T>: Copy + Debug + PartialEq + PartialOrd + std::marker::Send + std::marker::Sync {
    /// Zero value.
    const ZERO: T;
    /// One value.
    const ONE: T;
}

impl FloatData<f64> for f64 {
    const ZERO: f64 = 0.0;
    const ONE: f64 = 1.0;
}

impl FloatData<f32> for f32 {
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
}
