use super::{CalendarConverter, CalendarDate, CalendarError};
use chrono::NaiveDate;

const NAME: &str = "lunar";
const FIRST_YEAR: i32 = 1900;
const LAST_YEAR: i32 = 2100;

/// Packed month lengths of the lunar years 1900 - 2100.
///
/// bits 0-3:   the month that is followed by a leap month, 0 when the year has none
/// bits 4-15:  length of month 1 (bit 15) to month 12 (bit 4), set means 30 days, else 29
/// bit 16:     length of the leap month, set means 30 days, else 29
#[rustfmt::skip]
const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520, // 2100
];

/// The chinese lunisolar calendar.
///
/// Months are numbered 1 to 12. A leap month repeats the number of the month before it;
/// dates given to `to_gregorian` always address the regular month, dates inside a leap
/// month are reported with the number of the month they repeat.
#[derive(Debug, Clone, Copy, Default)]
pub struct LunarCalendar;

fn epoch() -> NaiveDate {
    // Lunar 1900-01-01
    NaiveDate::from_ymd_opt(1900, 1, 31).unwrap_or_default()
}

fn info(year: i32) -> u32 {
    LUNAR_INFO[(year - FIRST_YEAR) as usize]
}

fn leap_month(year: i32) -> u32 {
    info(year) & 0xf
}

fn leap_month_days(year: i32) -> u32 {
    if leap_month(year) == 0 {
        0
    } else if info(year) & 0x10000 != 0 {
        30
    } else {
        29
    }
}

fn month_days(year: i32, month: u32) -> u32 {
    if info(year) & (0x10000 >> month) != 0 {
        30
    } else {
        29
    }
}

fn year_days(year: i32) -> u32 {
    (1..=12).map(|m| month_days(year, m)).sum::<u32>() + leap_month_days(year)
}

impl LunarCalendar {
    fn check_year(&self, year: i32) -> Result<(), CalendarError> {
        if (FIRST_YEAR..=LAST_YEAR).contains(&year) {
            Ok(())
        } else {
            Err(CalendarError::OutOfRange {
                calendar: NAME.into(),
                date: format!("year {}", year),
            })
        }
    }

    /// Length of a regular month
    pub fn month_length(&self, year: i32, month: u32) -> Result<u32, CalendarError> {
        self.check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidDate {
                calendar: NAME.into(),
                date: CalendarDate::new(1, month, year),
            });
        }
        Ok(month_days(year, month))
    }

    /// The month followed by a leap month in the given year
    pub fn leap_month(&self, year: i32) -> Result<Option<u32>, CalendarError> {
        self.check_year(year)?;
        Ok(Some(leap_month(year)).filter(|m| *m != 0))
    }
}

impl CalendarConverter for LunarCalendar {
    fn name(&self) -> &str {
        NAME
    }

    fn to_gregorian(&self, date: CalendarDate) -> Result<NaiveDate, CalendarError> {
        let month_length = self.month_length(date.year, date.month)?;
        if date.day < 1 || date.day > month_length {
            return Err(CalendarError::InvalidDate {
                calendar: NAME.into(),
                date,
            });
        }

        let mut offset: i64 = (FIRST_YEAR..date.year).map(|y| year_days(y) as i64).sum();
        let leap = leap_month(date.year);
        for month in 1..date.month {
            offset += month_days(date.year, month) as i64;
            if month == leap {
                offset += leap_month_days(date.year) as i64;
            }
        }
        offset += (date.day - 1) as i64;

        epoch()
            .checked_add_signed(chrono::Duration::days(offset))
            .ok_or_else(|| CalendarError::OutOfRange {
                calendar: NAME.into(),
                date: date.to_string(),
            })
    }

    fn from_gregorian(&self, date: NaiveDate) -> Result<CalendarDate, CalendarError> {
        let out_of_range = || CalendarError::OutOfRange {
            calendar: NAME.into(),
            date: date.to_string(),
        };

        let mut offset = (date - epoch()).num_days();
        if offset < 0 {
            return Err(out_of_range());
        }

        let mut year = FIRST_YEAR;
        loop {
            if year > LAST_YEAR {
                return Err(out_of_range());
            }
            let days = year_days(year) as i64;
            if offset < days {
                break;
            }
            offset -= days;
            year += 1;
        }

        let leap = leap_month(year);
        for month in 1..=12 {
            let days = month_days(year, month) as i64;
            if offset < days {
                return Ok(CalendarDate::new(offset as u32 + 1, month, year));
            }
            offset -= days;

            if month == leap {
                let days = leap_month_days(year) as i64;
                if offset < days {
                    return Ok(CalendarDate::new(offset as u32 + 1, month, year));
                }
                offset -= days;
            }
        }

        Err(out_of_range())
    }

    fn anniversary(&self, day: u32, month: u32, year: i32) -> Result<NaiveDate, CalendarError> {
        if day < 1 || day > 30 {
            return Err(CalendarError::InvalidDate {
                calendar: NAME.into(),
                date: CalendarDate::new(day, month, year),
            });
        }
        // The 30th only exists in long months
        let day = day.min(self.month_length(year, month)?);
        self.to_gregorian(CalendarDate::new(day, month, year))
    }
}
