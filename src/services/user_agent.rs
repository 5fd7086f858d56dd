// src/services/user_agent.rs
// DOCUMENTATION: User-Agent classification for click analytics
// PURPOSE: Map woothee's parse result onto browser, OS and device class

use crate::models::DeviceType;
use woothee::parser::Parser;

/// Structured view of a User-Agent string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub browser: String,
    pub browser_version: String,
    pub os: String,
    pub os_version: String,
    pub device_type: DeviceType,
}

/// woothee's placeholder for fields it could not determine
const UNKNOWN: &str = "UNKNOWN";

/// Substrings woothee does not classify as crawlers on their own
const CRAWLER_MARKERS: &[&str] = &["crawler", "spider", "headlesschrome", "facebookexternalhit"];

/// Parse a User-Agent string into structured data
/// DOCUMENTATION: Empty input yields empty fields and DeviceType::Unknown
pub fn parse_user_agent(ua: &str) -> UserAgentInfo {
    let ua = ua.trim();
    if ua.is_empty() {
        return UserAgentInfo::default();
    }
    let Some(parsed) = Parser::new().parse(ua) else {
        return UserAgentInfo::default();
    };

    let raw_os = parsed.os.to_string();
    let (os, os_version) = os_family(&raw_os, &parsed.os_version.to_string());
    let device_type = classify_device(ua, &parsed.category.to_string(), &raw_os);
    let browser = browser_family(&parsed.name.to_string(), &os, device_type);

    UserAgentInfo {
        browser,
        browser_version: short_version(&parsed.version.to_string()),
        os,
        os_version,
        device_type,
    }
}

/// Keep at most major.minor.patch; woothee's UNKNOWN becomes empty
fn short_version(raw: &str) -> String {
    if raw == UNKNOWN {
        return String::new();
    }
    raw.replace('_', ".")
        .split('.')
        .filter(|part| !part.is_empty())
        .take(3)
        .collect::<Vec<_>>()
        .join(".")
}

fn os_family(raw_os: &str, raw_version: &str) -> (String, String) {
    match raw_os {
        UNKNOWN => (String::new(), String::new()),
        "iPhone" | "iPad" | "iPod" => ("iOS".to_string(), short_version(raw_version)),
        "Mac OSX" => ("Mac OS X".to_string(), short_version(raw_version)),
        "ChromeOS" => ("Chrome OS".to_string(), short_version(raw_version)),
        windows if windows.starts_with("Windows Phone") => {
            ("Windows Phone".to_string(), short_version(raw_version))
        }
        windows if windows.starts_with("Windows") => {
            // woothee names the release ("Windows 10"); its version is the NT kernel
            let release = windows.trim_start_matches("Windows").trim();
            let release = if release.contains(UNKNOWN) { "" } else { release };
            ("Windows".to_string(), release.to_string())
        }
        other => (other.to_string(), short_version(raw_version)),
    }
}

fn browser_family(name: &str, os: &str, device: DeviceType) -> String {
    let ios = os == "iOS";
    let mobile = device == DeviceType::Mobile;

    match name {
        UNKNOWN => "",
        "Internet Explorer" => "IE",
        "Safari" if ios => "Mobile Safari",
        "Chrome" if ios => "Chrome Mobile iOS",
        "Firefox" if ios => "Firefox iOS",
        "Chrome" if mobile => "Chrome Mobile",
        "Firefox" if mobile => "Firefox Mobile",
        other => other,
    }
    .to_string()
}

/// Product tokens such as "Googlebot/2.1"; model names like "CUBOT" carry no version
fn has_bot_product(ua: &str) -> bool {
    let lower = ua.to_ascii_lowercase();
    if CRAWLER_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }
    lower
        .split(|c: char| c.is_whitespace() || matches!(c, ';' | '(' | ')'))
        .filter_map(|token| token.split_once('/'))
        .any(|(product, _)| product.ends_with("bot"))
}

/// Device precedence: bot, mobile, tablet, desktop, unknown
fn classify_device(ua: &str, category: &str, raw_os: &str) -> DeviceType {
    if category == "crawler" || has_bot_product(ua) {
        return DeviceType::Bot;
    }

    let android = raw_os == "Android";
    if matches!(raw_os, "iPhone" | "iPod")
        || category == "mobilephone"
        || (android && ua.contains("Mobile"))
    {
        return DeviceType::Mobile;
    }
    if raw_os == "iPad" || android || ua.contains("Tablet") {
        return DeviceType::Tablet;
    }
    if category == "smartphone" || ua.contains("Mobi") {
        return DeviceType::Mobile;
    }
    if category == "pc" {
        return DeviceType::Desktop;
    }
    DeviceType::Unknown
}
