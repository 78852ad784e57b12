//! Coarse caller locale derived from edge-network request headers
//!
//! Hosting platforms inject geolocation and timezone hints as request
//! headers. Every field is optional and absence is handled with fallbacks.

use axum::http::HeaderMap;
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

const CITY_HEADERS: &[&str] = &["x-vercel-ip-city", "cf-ipcity"];
const REGION_HEADERS: &[&str] = &["x-vercel-ip-country-region", "cf-region-code"];
const COUNTRY_HEADERS: &[&str] = &["x-vercel-ip-country", "cf-ipcountry"];
const TIMEZONE_HEADERS: &[&str] = &["x-vercel-ip-timezone", "cf-timezone"];

/// Display format for the caller's local time, e.g. `10/19/2026, 3:04:05 PM`
const TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Location and timezone hints for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLocale {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

impl RequestLocale {
    /// Read locale hints from request headers
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            city: first_header(headers, CITY_HEADERS),
            region: first_header(headers, REGION_HEADERS),
            country: first_header(headers, COUNTRY_HEADERS),
            timezone: first_header(headers, TIMEZONE_HEADERS),
        }
    }

    /// `"city, region, country"`, or `"unknown"` unless all three are known
    #[must_use]
    pub fn location(&self) -> String {
        match (&self.city, &self.region, &self.country) {
            (Some(city), Some(region), Some(country)) => format!("{city}, {region}, {country}"),
            _ => "unknown".to_string(),
        }
    }

    /// Format `now` in the caller's timezone, falling back to the server's zone
    #[must_use]
    pub fn local_time(&self, now: DateTime<Utc>) -> String {
        match self.timezone.as_deref().and_then(|tz| tz.parse::<Tz>().ok()) {
            Some(tz) => now.with_timezone(&tz).format(TIME_FORMAT).to_string(),
            None => now.with_timezone(&Local).format(TIME_FORMAT).to_string(),
        }
    }
}

/// Return the first non-empty, percent-decoded value among `names`
fn first_header(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        let raw = headers.get(*name)?.to_str().ok()?.trim();
        if raw.is_empty() {
            return None;
        }
        let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |s| s.into_owned());
        Some(decoded)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::TimeZone;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn location_with_all_fields() {
        let locale = RequestLocale::from_headers(&headers(&[
            ("x-vercel-ip-city", "San%20Francisco"),
            ("x-vercel-ip-country-region", "CA"),
            ("x-vercel-ip-country", "US"),
        ]));
        assert_eq!(locale.location(), "San Francisco, CA, US");
    }

    #[test]
    fn location_unknown_when_any_field_missing() {
        let locale = RequestLocale::from_headers(&headers(&[
            ("x-vercel-ip-city", "Paris"),
            ("x-vercel-ip-country", "FR"),
        ]));
        assert_eq!(locale.location(), "unknown");
        assert_eq!(RequestLocale::default().location(), "unknown");
    }

    #[test]
    fn cloudflare_headers_are_recognized() {
        let locale = RequestLocale::from_headers(&headers(&[
            ("cf-ipcity", "Osaka"),
            ("cf-region-code", "27"),
            ("cf-ipcountry", "JP"),
            ("cf-timezone", "Asia/Tokyo"),
        ]));
        assert_eq!(locale.location(), "Osaka, 27, JP");
        assert_eq!(locale.timezone.as_deref(), Some("Asia/Tokyo"));
    }

    #[test]
    fn blank_header_counts_as_absent() {
        let locale = RequestLocale::from_headers(&headers(&[("x-vercel-ip-city", "  ")]));
        assert_eq!(locale.city, None);
    }

    #[test]
    fn local_time_uses_timezone_hint() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 17, 4, 9).unwrap();
        let locale = RequestLocale {
            timezone: Some("America/New_York".to_string()),
            ..RequestLocale::default()
        };
        assert_eq!(locale.local_time(now), "3/5/2024, 12:04:09 PM");
    }

    #[test]
    fn local_time_falls_back_on_bad_timezone() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 17, 4, 9).unwrap();
        let locale = RequestLocale {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..RequestLocale::default()
        };
        let expected = now.with_timezone(&Local).format(TIME_FORMAT).to_string();
        assert_eq!(locale.local_time(now), expected);
    }
}
