pub mod estimator;
pub mod provider;
