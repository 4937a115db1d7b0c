use chrono::DateTime;

/// Reports whether `s` is an RFC3339 `date-time`.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fraction](Z|±HH:MM)` with either case of
/// `T` and `Z`. A seconds value of `60` is accepted as a leap second; offsets
/// stay within `±23:59`.
pub fn is_rfc3339(s: &str) -> bool {
    parse(s).is_some()
}

/// Milliseconds since the Unix epoch for a timestamp accepted by
/// [`is_rfc3339`], or `None` when it cannot be placed on the timeline.
pub fn timestamp_millis(s: &str) -> Option<f64> {
    parse(s)?;

    let dt = DateTime::parse_from_rfc3339(s).ok()?;
    Some(dt.timestamp() as f64 * 1000.0 + f64::from(dt.timestamp_subsec_nanos()) / 1_000_000.0)
}

struct Fields {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

fn parse(s: &str) -> Option<Fields> {
    let mut cursor = Cursor { bytes: s.as_bytes(), pos: 0 };

    let year = cursor.digits(4)?;
    cursor.expect(|b| b == b'-')?;
    let month = cursor.digits(2)?;
    cursor.expect(|b| b == b'-')?;
    let day = cursor.digits(2)?;
    cursor.expect(|b| b == b'T' || b == b't')?;
    let hour = cursor.digits(2)?;
    cursor.expect(|b| b == b':')?;
    let minute = cursor.digits(2)?;
    cursor.expect(|b| b == b':')?;
    let second = cursor.digits(2)?;

    if cursor.peek() == Some(b'.') {
        cursor.pos += 1;
        let start = cursor.pos;
        while cursor.peek().map_or(false, |b| b.is_ascii_digit()) {
            cursor.pos += 1;
        }
        if cursor.pos == start {
            return None;
        }
    }

    match cursor.peek()? {
        b'Z' | b'z' => cursor.pos += 1,
        b'+' | b'-' => {
            cursor.pos += 1;
            let offset_hour = cursor.digits(2)?;
            cursor.expect(|b| b == b':')?;
            let offset_minute = cursor.digits(2)?;
            if offset_hour > 23 || offset_minute > 59 {
                return None;
            }
        }
        _ => return None,
    }

    if cursor.pos != cursor.bytes.len() {
        return None;
    }

    let fields = Fields {
        year,
        month,
        day,
        hour,
        minute,
        second,
    };

    if fields.month < 1 || fields.month > 12 {
        return None;
    }
    if fields.day < 1 || fields.day > max_day(fields.year, fields.month) {
        return None;
    }
    if fields.hour > 23 || fields.minute > 59 || fields.second > 60 {
        return None;
    }

    Some(fields)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, pred: impl Fn(u8) -> bool) -> Option<()> {
        let b = self.peek()?;
        if !pred(b) {
            return None;
        }
        self.pos += 1;
        Some(())
    }

    fn digits(&mut self, n: usize) -> Option<u32> {
        let mut out = 0;
        for _ in 0..n {
            let b = self.peek()?;
            if !b.is_ascii_digit() {
                return None;
            }
            out = out * 10 + u32::from(b - b'0');
            self.pos += 1;
        }
        Some(out)
    }
}

fn max_day(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(n: u32) -> bool {
    n % 4 == 0 && (n % 100 != 0 || n % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts() {
        for s in &[
            "1985-04-12T23:20:50.52Z",
            "1996-12-19T16:39:57-08:00",
            "1990-12-31T23:59:60Z",
            "1990-12-31t15:59:60-08:00",
            "1937-01-01T12:00:27.87+00:20",
            "2000-02-29T00:00:00z",
        ] {
            assert!(is_rfc3339(s), "{}", s);
        }
    }

    #[test]
    fn rejects() {
        for s in &[
            "",
            "foo",
            "1985-04-12",
            "1985-04-12T23:20:50",
            "1985-04-12T23:20:50.Z",
            "1985-04-12 23:20:50Z",
            "1985-13-12T23:20:50Z",
            "1985-00-12T23:20:50Z",
            "1985-04-31T23:20:50Z",
            "1900-02-29T00:00:00Z",
            "1985-04-12T24:00:00Z",
            "1985-04-12T23:60:00Z",
            "1985-04-12T23:59:61Z",
            "1985-04-12T23:20:50+0800",
            "2000-01-01T00:00:00+99:00",
            "2000-01-01T00:00:00+23:99",
            "2000-01-01T00:00:00-24:00",
            "1985-04-12T23:20:50Zjunk",
        ] {
            assert!(!is_rfc3339(s), "{}", s);
        }
    }

    #[test]
    fn millis() {
        assert_eq!(Some(0.0), timestamp_millis("1970-01-01T00:00:00Z"));
        assert_eq!(Some(1500.0), timestamp_millis("1970-01-01T00:00:01.5Z"));
        assert_eq!(Some(-3_600_000.0), timestamp_millis("1970-01-01T00:00:00+01:00"));
        assert_eq!(None, timestamp_millis("1970-01-01"));
        assert_eq!(None, timestamp_millis("1970-01-01T00:00:00+99:00"));
        assert_eq!(Some(-86_340_000.0), timestamp_millis("1970-01-01T00:00:00+23:59"));
    }
}
