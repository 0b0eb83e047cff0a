pub mod renewal;

pub use renewal::RenewalScheduler;
