// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closure notice parsing.
//!
//! The business keeps a free-text special notice. When it reads like a
//! closure ("Closed until Monday 3rd June", "Closed December 25-26 for
//! Christmas") the generator is told the business is closed and, when one
//! can be found, when it reopens.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use frontdesk_core::ClosureContext;
use regex::Regex;
use serde::Serialize;

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month names and their 3-letter abbreviations, for embedding in patterns.
const MONTH_ALT: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

const WEEKDAY_ALT: &str = "mon|tues?|wed(?:nes)?|thu(?:rs?)?|fri|sat(?:ur)?|sun";

/// Closure phrasing. Holiday names alone ("Open over Christmas") and
/// regular hours ("Closed on Sundays") do not count.
static CLOSURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:closed|shut)\s+(?:until|till|from|between|over|during)\b|\b(?:closed|shut)\s+for\s+(?:the\s+|a\s+)?(?:holidays?|christmas|xmas|easter|new\s+year|bank\s+holiday|summer|half\s+term|refurb\w*|renovations?|staff\s+training|week|few\s+days|family|\d|(?:{MONTH_ALT})\b)|\b(?:closed|shut)\s+(?:on\s+)?(?:(?:{WEEKDAY_ALT})(?:day)?\s+)?(?:the\s+)?(?:\d{{1,2}}(?:st|nd|rd|th)?\b|(?:{MONTH_ALT})\b)|\bon\s+(?:annual\s+)?(?:holiday|leave)\b|\b(?:back|re-?open(?:s|ing)?)\s+(?:on\s+)?(?:the\s+)?(?:(?:{WEEKDAY_ALT})(?:day)?\b|\d{{1,2}}(?:st|nd|rd|th)?\b|(?:{MONTH_ALT})\b)"
    ))
    .unwrap()
});

static RETURN_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:back|return(?:ing)?|re-?open(?:ing|s)?|until|till)\s+(?:on\s+)?((?:(?:{WEEKDAY_ALT})(?:day)?\s+)?(?:\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTH_ALT})\b|(?:{MONTH_ALT})\s+\d{{1,2}}(?:st|nd|rd|th)?\b|(?:{WEEKDAY_ALT})(?:day)?\b))"
    ))
    .unwrap()
});

/// "December 25-26", "Dec 24th to 27th".
static WINDOW_MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_ALT})\s+(\d{{1,2}})(?:st|nd|rd|th)?\s*(?:-|–|to|until|till)\s*(\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .unwrap()
});

/// "25-26 December", "24th to 27th of Dec".
static WINDOW_DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s*(?:-|–|to|until|till)\s*(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_ALT})\b"
    ))
    .unwrap()
});

/// A closure range inside a single month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClosureWindow {
    pub month: u32,
    pub start_day: u32,
    pub end_day: u32,
}

impl ClosureWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && (self.start_day..=self.end_day).contains(&date.day())
    }
}

/// Parsed closure notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HolidayStatus {
    pub on_holiday: bool,
    pub message: Option<String>,
    pub return_date_hint: Option<String>,
    pub window: Option<ClosureWindow>,
}

impl HolidayStatus {
    /// Whether the closure applies on `date`. A notice with a parsed window
    /// only applies inside it; one without applies for as long as it is set.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.on_holiday && self.window.is_none_or(|w| w.contains(date))
    }

    /// Context for the generator, if closed on `date`.
    pub fn closure_context(&self, date: NaiveDate) -> Option<ClosureContext> {
        if !self.is_active_on(date) {
            return None;
        }
        Some(ClosureContext {
            message: self.message.clone().unwrap_or_default(),
            return_date_hint: self.return_date_hint.clone(),
        })
    }
}

/// Parse a special notice.
pub fn detect(notice: &str) -> HolidayStatus {
    let notice = notice.trim();
    if notice.is_empty() || !CLOSURE.is_match(notice) {
        return HolidayStatus::default();
    }

    let return_date_hint = RETURN_DATE
        .captures(notice)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    HolidayStatus {
        on_holiday: true,
        message: Some(notice.to_string()),
        return_date_hint,
        window: parse_window(notice),
    }
}

fn parse_window(notice: &str) -> Option<ClosureWindow> {
    let (month, start, end) = if let Some(c) = WINDOW_MONTH_FIRST.captures(notice) {
        (c.get(1)?.as_str(), c.get(2)?.as_str(), c.get(3)?.as_str())
    } else {
        let c = WINDOW_DAY_FIRST.captures(notice)?;
        (c.get(3)?.as_str(), c.get(1)?.as_str(), c.get(2)?.as_str())
    };
    let month = month_number(month)?;
    let start_day: u32 = start.parse().ok()?;
    let end_day: u32 = end.parse().ok()?;
    if start_day == 0 || end_day > 31 || start_day > end_day {
        return None;
    }
    Some(ClosureWindow {
        month,
        start_day,
        end_day,
    })
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    MONTHS
        .iter()
        .position(|m| m.starts_with(&prefix))
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn christmas_range_is_a_closure_with_a_window() {
        let status = detect("Closed December 25-26 for Christmas");
        assert!(status.on_holiday);
        assert_eq!(
            status.window,
            Some(ClosureWindow {
                month: 12,
                start_day: 25,
                end_day: 26
            })
        );
        assert!(status.is_active_on(date(2026, 12, 25)));
        assert!(!status.is_active_on(date(2026, 12, 27)));
        assert!(!status.is_active_on(date(2026, 11, 25)));
    }

    #[test]
    fn return_date_hint_is_extracted() {
        let status = detect("We're closed until Monday 3rd June for a family holiday");
        assert!(status.on_holiday);
        assert_eq!(status.return_date_hint.as_deref(), Some("Monday 3rd June"));
        assert!(status.window.is_none());
        assert!(status.is_active_on(date(2026, 5, 30)));

        let status = detect("On holiday, back on Tuesday");
        assert_eq!(status.return_date_hint.as_deref(), Some("Tuesday"));

        let status = detect("Shop closed over Easter, reopening April 7th");
        assert_eq!(status.return_date_hint.as_deref(), Some("April 7th"));
    }

    #[test]
    fn day_first_window() {
        let status = detect("Closed 24th to 27th of Dec, back on the 28th");
        assert_eq!(
            status.window,
            Some(ClosureWindow {
                month: 12,
                start_day: 24,
                end_day: 27
            })
        );
    }

    #[test]
    fn ordinary_notices_are_not_closures() {
        assert_eq!(detect(""), HolidayStatus::default());
        assert!(!detect("Free screen protector with every repair!").on_holiday);
        assert!(!detect("New opening hours: 9-6 weekdays").on_holiday);
    }

    #[test]
    fn holiday_names_and_regular_hours_are_not_closures() {
        for notice in [
            "Open as normal over Christmas!",
            "Closed on Sundays",
            "Bank holiday Monday: open 10-4",
            "Closed for lunch 1-2pm",
            "Easter opening hours 10-4",
            "We're back on normal hours",
        ] {
            let status = detect(notice);
            assert!(!status.on_holiday, "{notice:?} read as a closure");
            assert!(!status.is_active_on(date(2026, 12, 25)));
        }
    }

    #[test]
    fn closure_phrasing_variants() {
        for notice in [
            "Closed on 26th December",
            "Shut for a week, sorry!",
            "Steve is on annual leave, reopening 7th April",
            "Closed for Easter",
            "Back on the 2nd",
        ] {
            assert!(detect(notice).on_holiday, "{notice:?} missed");
        }
    }

    #[test]
    fn closure_context_follows_window() {
        let status = detect("Closed December 25-26 for Christmas");
        assert!(status.closure_context(date(2026, 12, 1)).is_none());
        let ctx = status.closure_context(date(2026, 12, 26)).unwrap();
        assert_eq!(ctx.message, "Closed December 25-26 for Christmas");
        assert!(ctx.return_date_hint.is_none());
    }
}
