pub mod retry;
pub mod token_estimator;
