//! Domain services: signature verification, attribution, link issuance,
//! commission rates, and balance management.

pub mod attribution;
pub mod balance;
pub mod commission;
pub mod links;
pub mod signature;

pub use attribution::{AttributionService, WebhookOutcome, WebhookSecrets};
pub use balance::BalanceService;
pub use links::{IssuedLink, LinkIssuer, PlatformClient, UrlTemplateClient};
