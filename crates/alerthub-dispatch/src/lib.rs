//! # alerthub-dispatch
//!
//! Decides who receives an alert and delivers it by email, SMS and
//! (eventually) push. Every delivery is gated by the receipt store so a
//! recipient gets each alert at most once per channel.

pub mod crime;
pub mod eligibility;
pub mod email;
pub mod provider;
pub mod push;
pub mod service;
pub mod sms;
pub mod tally;
pub mod template;

#[cfg(test)]
mod test_support;

pub use crime::CrimeAlertNotifier;
pub use eligibility::{CandidateSet, EligibilityResolver};
pub use email::EmailDispatcher;
pub use provider::{EmailMessage, EmailProvider, ProviderError, SmsProvider};
pub use push::PushDispatcher;
pub use service::{AlertDispatchService, DispatchAck, DispatchSummary};
pub use sms::SmsDispatcher;
pub use tally::DeliveryTally;
