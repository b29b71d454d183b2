use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Builds a range, swapping inverted bounds.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Every day in the range, ascending, with no gaps.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let to = self.to;
        std::iter::successors(Some(self.from), |d| d.succ_opt())
            .take_while(move |d| *d <= to)
    }

    pub fn len_days(&self) -> u64 {
        u64::try_from((self.to - self.from).num_days()).unwrap_or(0) + 1
    }
}

/// Named calendar-aligned ranges offered by the back-office date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickRange {
    Today,
    Yesterday,
    /// Today plus the six preceding days.
    Last7Days,
    /// Today plus the twenty-nine preceding days.
    Last30Days,
    ThisMonth,
    LastMonth,
}

impl QuickRange {
    /// Resolves the named range against a reference day.
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        match self {
            Self::Today => DateRange::new(today, today),
            Self::Yesterday => {
                let yesterday = today.pred_opt().unwrap_or(today);
                DateRange::new(yesterday, yesterday)
            }
            Self::Last7Days => {
                DateRange::new(today.checked_sub_days(Days::new(6)).unwrap_or(today), today)
            }
            Self::Last30Days => {
                DateRange::new(today.checked_sub_days(Days::new(29)).unwrap_or(today), today)
            }
            Self::ThisMonth => DateRange::new(month_start(today), month_end(today)),
            Self::LastMonth => {
                let prev = month_start(today).pred_opt().unwrap_or(today);
                DateRange::new(month_start(prev), prev)
            }
        }
    }

    /// Resolves against the local calendar day, matching what the filter UI
    /// shows the admin.
    pub fn resolve_local(self) -> DateRange {
        self.resolve(Local::now().date_naive())
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next_month.and_then(|d| d.pred_opt()).unwrap_or(date)
}
