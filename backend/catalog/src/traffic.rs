use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One storefront page view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(with = "crate::timestamp")]
    pub visited_at: DateTime<Utc>,
}

/// A calendar month, `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            first_day: at.date_naive().with_day(1).unwrap_or(at.date_naive()),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
            .ok()
            .filter(|_| raw.len() == 7)
            .map(|first_day| Self { first_day })
    }

    pub fn previous(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }

    /// Half-open `[start, end)` instant range covering the month.
    pub fn range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = self
            .first_day
            .checked_add_months(Months::new(1))
            .unwrap_or(self.first_day);

        (midnight(self.first_day), midnight(next))
    }

    pub fn label(&self) -> String {
        self.first_day.format("%Y-%m").to_string()
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}
