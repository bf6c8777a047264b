//! Provider wire formats
//!
//! Response types are deliberately lenient: every field a provider might
//! omit is defaulted so that partially-shaped payloads still parse.

pub mod anthropic;
pub mod google;
pub mod openai;
