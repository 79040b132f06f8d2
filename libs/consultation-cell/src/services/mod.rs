pub mod audit;
pub mod provider;
pub mod session;
