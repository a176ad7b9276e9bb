//! Unit tests for the two-factor authentication service




#[cfg(test)]
mod sms_tests;

#[cfg(test)]
mod rate_limit_tests;
