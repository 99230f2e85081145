mod client;
mod income;
mod job;

pub use client::Client;
pub use income::{MonthlyIncome, YearlyIncome};
pub use job::Job;
