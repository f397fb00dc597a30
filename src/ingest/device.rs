//! Device classification from user-agent substrings.
//!
//! Inherently fuzzy string matching; the rules are preserved as-is so the
//! analytics semantics stay stable. Swapping in a real user-agent parser
//! would silently reshuffle the buckets.

use crate::core::types::DeviceClass;

/// Classify a user agent into one of the four coarse device buckets.
///
/// A missing or empty user agent is `Unknown`. Android without "mobile" is
/// the conventional tablet signal.
pub fn classify_device(user_agent: Option<&str>) -> DeviceClass {
    let ua = match user_agent {
        Some(ua) if !ua.trim().is_empty() => ua.to_ascii_lowercase(),
        _ => return DeviceClass::Unknown,
    };

    if ua.contains("ipad") || ua.contains("tablet") || (ua.contains("android") && !ua.contains("mobile")) {
        return DeviceClass::Tablet;
    }

    if ua.contains("mobi") || ua.contains("iphone") || ua.contains("ipod") || ua.contains("android") {
        return DeviceClass::Mobile;
    }

    DeviceClass::Desktop
}
