use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Segment-based date editor: digits fill the focused segment and are
/// applied once the segment is complete and in range; invalid input is
/// discarded and the previous date kept.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.buffer.clear();
        }
    }

    pub fn next_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    pub fn previous_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                let needed = match self.date_part {
                    DatePart::Year => 4,
                    DatePart::Month | DatePart::Day => 2,
                };
                if self.buffer.len() == needed {
                    self.apply_buffer();
                    self.buffer.clear();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right => self.next_part(),
            KeyCode::Left => self.previous_part(),
            _ => {}
        }
    }

    fn apply_buffer(&mut self) {
        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
        let candidate = match self.date_part {
            DatePart::Year => self
                .buffer
                .parse::<i32>()
                .ok()
                .filter(|y| (1900..=2100).contains(y))
                .and_then(|y| NaiveDate::from_ymd_opt(y, month, day)),
            DatePart::Month => self
                .buffer
                .parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .and_then(|m| NaiveDate::from_ymd_opt(year, m, day)),
            DatePart::Day => self
                .buffer
                .parse::<u32>()
                .ok()
                .filter(|d| (1..=days_in_month(year, month)).contains(d))
                .and_then(|d| NaiveDate::from_ymd_opt(year, month, d)),
        };
        if let Some(date) = candidate {
            self.date = date;
        }
    }

    /// The date with the focused segment bracketed while editing, e.g.
    /// "2024-[06]-15" or "2024-[6_]-15" mid-entry.
    pub fn display(&self) -> String {
        let year = format!("{:04}", self.date.year());
        let month = format!("{:02}", self.date.month());
        let day = format!("{:02}", self.date.day());
        if !self.editing {
            return format!("{year}-{month}-{day}");
        }
        let focused = |current: &str, width: usize| {
            if self.buffer.is_empty() {
                format!("[{current}]")
            } else {
                format!("[{:_<width$}]", self.buffer)
            }
        };
        match self.date_part {
            DatePart::Year => format!("{}-{month}-{day}", focused(&year, 4)),
            DatePart::Month => format!("{year}-{}-{day}", focused(&month, 2)),
            DatePart::Day => format!("{year}-{month}-{}", focused(&day, 2)),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        _ => 28,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn full_segment_applies_when_valid() {
        let mut state = DateInputState::new(date(2024, 6, 15));
        state.toggle_editing();
        type_digits(&mut state, "2025");
        assert_eq!(state.date, date(2025, 6, 15));

        state.next_part();
        type_digits(&mut state, "02");
        assert_eq!(state.date, date(2025, 2, 15));
    }

    #[test]
    fn out_of_range_segment_is_discarded() {
        let mut state = DateInputState::new(date(2024, 6, 15));
        state.toggle_editing();
        state.next_part();
        type_digits(&mut state, "13");
        assert_eq!(state.date, date(2024, 6, 15));
    }

    #[test]
    fn day_respects_month_length() {
        let mut state = DateInputState::new(date(2023, 2, 10));
        state.toggle_editing();
        state.next_part();
        state.next_part();
        type_digits(&mut state, "29");
        // 2023 is not a leap year.
        assert_eq!(state.date, date(2023, 2, 10));
        type_digits(&mut state, "28");
        assert_eq!(state.date, date(2023, 2, 28));
    }

    #[test]
    fn ignores_input_when_not_editing() {
        let mut state = DateInputState::new(date(2024, 6, 15));
        type_digits(&mut state, "1999");
        assert_eq!(state.date, date(2024, 6, 15));
    }
}
