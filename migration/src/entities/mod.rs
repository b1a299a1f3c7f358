pub mod affiliate_link;
pub mod click;
pub mod transaction;
pub mod withdrawal;
