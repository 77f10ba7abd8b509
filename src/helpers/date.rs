//! Date helper functions

use chrono::{DateTime, Locale, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Map a language tag (`pt-BR`, `en`) to a chrono locale
pub fn locale_for(language: &str) -> Locale {
    let tag = language.replace('-', "_");
    Locale::try_from(tag.as_str())
        .or_else(|_| match tag.as_str() {
            "en" => Ok(Locale::en_US),
            "pt" => Ok(Locale::pt_BR),
            _ => Err(()),
        })
        .unwrap_or(Locale::en_US)
}

/// Format a date in the given timezone and locale
///
/// # Examples
/// ```ignore
/// format_date(&date, &chrono_tz::UTC, "%d %b %Y", Locale::pt_BR) // -> "15 mar 2021"
/// ```
pub fn format_date<T: TimeZone>(date: &DateTime<Utc>, tz: &T, format: &str, locale: Locale) -> String
where
    T::Offset: std::fmt::Display,
{
    date.with_timezone(tz)
        .format_localized(format, locale)
        .to_string()
}

/// Site-wide date presentation
#[derive(Debug, Clone)]
pub struct DateFormatter {
    tz: Tz,
    locale: Locale,
    date_format: String,
    edited_format: String,
}

impl DateFormatter {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            tz: config.tz(),
            locale: locale_for(&config.language),
            date_format: config.date_format.clone(),
            edited_format: config.edited_format.clone(),
        }
    }

    /// Publication date (`15 mar 2021`)
    pub fn date(&self, date: &DateTime<Utc>) -> String {
        format_date(date, &self.tz, &self.date_format, self.locale)
    }

    /// Edit timestamp (`25 mar 2021, às 16:25`)
    pub fn edited(&self, date: &DateTime<Utc>) -> String {
        format_date(date, &self.tz, &self.edited_format, self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 0).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date(&date(), &chrono_tz::UTC, "%d %b %Y", Locale::en_US),
            "25 Mar 2021"
        );
        assert_eq!(
            format_date(&date(), &chrono_tz::UTC, "%Y-%m-%d %H:%M", Locale::en_US),
            "2021-03-25 19:25"
        );
    }

    #[test]
    fn test_timezone_applied() {
        assert_eq!(
            format_date(&date(), &chrono_tz::America::Sao_Paulo, "%H:%M", Locale::en_US),
            "16:25"
        );
    }

    #[test]
    fn test_locale_for() {
        assert_eq!(locale_for("pt-BR"), Locale::pt_BR);
        assert_eq!(locale_for("en_US"), Locale::en_US);
        assert_eq!(locale_for("en"), Locale::en_US);
        assert_eq!(locale_for("xx-YY"), Locale::en_US);
    }

    #[test]
    fn test_date_formatter() {
        let mut config = SiteConfig::default();
        config.language = "en".to_string();
        config.timezone = "UTC".to_string();
        config.edited_format = "%d %b %Y, %H:%M".to_string();
        let formatter = DateFormatter::new(&config);
        assert_eq!(formatter.date(&date()), "25 Mar 2021");
        assert_eq!(formatter.edited(&date()), "25 Mar 2021, 19:25");
    }
}
