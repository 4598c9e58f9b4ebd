//! Pre-flight validation of a report request. Everything here runs before the
//! first chunk is fetched; any error aborts the invocation.

use crate::models::{CurrencyRate, DateRange, Instrument};
use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("invalid date '{0}', expected dd-mm-yyyy")]
    MalformedDate(String),

    #[error("wrong {which} date of the period: {date} is in the future")]
    FutureDate { which: &'static str, date: NaiveDate },

    #[error("wrong relation between begin and end date: {begin} is after {end}")]
    ReversedRange { begin: NaiveDate, end: NaiveDate },

    #[error("data for {instrument} is only available from {floor}, requested {begin}")]
    BeforeDataFloor {
        instrument: String,
        floor: NaiveDate,
        begin: NaiveDate,
    },

    #[error("unknown currency or option '{0}' (use `list` to see available currencies)")]
    UnknownInstrument(String),
}

/// A validated request: one instrument and a past, ordered date range.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub instrument: Instrument,
    pub range: DateRange,
}

/// Parse a `dd-mm-yyyy` command-line date.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, RequestError> {
    NaiveDate::parse_from_str(s.trim(), "%d-%m-%Y")
        .map_err(|_| RequestError::MalformedDate(s.to_string()))
}

/// Today's quotes are published in the afternoon; before `close_hour` a
/// request for today means yesterday.
pub fn shift_unpublished_today(date: NaiveDate, now: NaiveDateTime, close_hour: u32) -> NaiveDate {
    if date == now.date() && now.hour() < close_hour {
        date.checked_sub_days(Days::new(1)).unwrap_or(date)
    } else {
        date
    }
}

pub fn validate_range(
    begin: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<DateRange, RequestError> {
    if begin > today {
        return Err(RequestError::FutureDate { which: "begin", date: begin });
    }
    if end > today {
        return Err(RequestError::FutureDate { which: "end", date: end });
    }
    DateRange::new(begin, end).ok_or(RequestError::ReversedRange { begin, end })
}

/// Resolve a command-line argument against the published rate tables.
///
/// `gold` selects the commodity. Otherwise three characters or fewer are
/// matched as a currency code, longer input as a currency name, with `_`
/// standing in for spaces. `rates` is expected in table order (A first), so
/// the first match carries the right table type.
pub fn resolve_instrument(arg: &str, rates: &[CurrencyRate]) -> Result<Instrument, RequestError> {
    let wanted = arg.trim().replace('_', " ");
    if wanted.eq_ignore_ascii_case("gold") {
        return Ok(Instrument::Gold);
    }

    let by_code = wanted.chars().count() <= 3;
    rates
        .iter()
        .find(|r| {
            if by_code {
                r.code.eq_ignore_ascii_case(&wanted)
            } else {
                r.name.to_lowercase() == wanted.to_lowercase()
            }
        })
        .map(|r| Instrument::Currency {
            name: r.name.clone(),
            code: r.code.to_uppercase(),
            table: r.table,
        })
        .ok_or_else(|| RequestError::UnknownInstrument(arg.to_string()))
}

pub fn check_availability(instrument: &Instrument, range: &DateRange) -> Result<(), RequestError> {
    let floor = instrument.data_floor();
    if range.begin < floor {
        return Err(RequestError::BeforeDataFloor {
            instrument: instrument.display_name().to_string(),
            floor,
            begin: range.begin,
        });
    }
    Ok(())
}

/// Parse and check the requested period. Missing dates default to today
/// (after the market-close shift).
pub fn requested_range(
    begin: Option<&str>,
    end: Option<&str>,
    now: NaiveDateTime,
    close_hour: u32,
) -> Result<DateRange, RequestError> {
    let today = now.date();
    let begin = begin.map(parse_date_arg).transpose()?.unwrap_or(today);
    let end = end.map(parse_date_arg).transpose()?.unwrap_or(today);

    let begin = shift_unpublished_today(begin, now, close_hour);
    let end = shift_unpublished_today(end, now, close_hour);

    validate_range(begin, end, today)
}

impl ReportRequest {
    /// Resolve `argument` for an already validated period.
    pub fn build(
        argument: &str,
        range: DateRange,
        rates: &[CurrencyRate],
    ) -> Result<Self, RequestError> {
        let instrument = resolve_instrument(argument, rates)?;
        check_availability(&instrument, &range)?;
        Ok(Self { instrument, range })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TableType;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    fn rates() -> Vec<CurrencyRate> {
        vec![
            CurrencyRate {
                name: "dolar amerykański".into(),
                code: "USD".into(),
                mid: 3.95,
                table: TableType::A,
            },
            CurrencyRate {
                name: "afgani (Afganistan)".into(),
                code: "AFN".into(),
                mid: 0.0561,
                table: TableType::B,
            },
        ]
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(parse_date_arg("02-01-2024"), Ok(d(2024, 1, 2)));
        assert!(matches!(parse_date_arg("2024-01-02"), Err(RequestError::MalformedDate(_))));
        assert!(matches!(parse_date_arg("31-02-2024"), Err(RequestError::MalformedDate(_))));
    }

    #[test]
    fn test_today_before_close_shifts_back() {
        let today = d(2024, 3, 12);
        assert_eq!(shift_unpublished_today(today, at(today, 9), 16), d(2024, 3, 11));
        assert_eq!(shift_unpublished_today(today, at(today, 16), 16), today);
        assert_eq!(shift_unpublished_today(d(2024, 3, 1), at(today, 9), 16), d(2024, 3, 1));
    }

    #[test]
    fn test_validate_range() {
        let today = d(2024, 3, 12);
        assert!(validate_range(d(2024, 3, 1), today, today).is_ok());
        assert_eq!(
            validate_range(d(2024, 3, 1), d(2024, 3, 13), today),
            Err(RequestError::FutureDate { which: "end", date: d(2024, 3, 13) })
        );
        assert!(matches!(
            validate_range(d(2024, 3, 5), d(2024, 3, 1), today),
            Err(RequestError::ReversedRange { .. })
        ));
    }

    #[test]
    fn test_resolve_instrument() {
        let rates = rates();
        assert_eq!(resolve_instrument("gold", &rates), Ok(Instrument::Gold));
        assert_eq!(
            resolve_instrument("usd", &rates),
            Ok(Instrument::Currency {
                name: "dolar amerykański".into(),
                code: "USD".into(),
                table: TableType::A,
            })
        );
        let afn = resolve_instrument("afgani_(Afganistan)", &rates).unwrap();
        assert_eq!(afn.code(), Some("AFN"));
        assert!(matches!(afn, Instrument::Currency { table: TableType::B, .. }));
        assert!(matches!(
            resolve_instrument("XYZ", &rates),
            Err(RequestError::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_build_rejects_gold_before_floor() {
        let now = at(d(2024, 3, 12), 18);
        let range = requested_range(Some("01-06-2012"), None, now, 16).unwrap();
        assert_eq!(range, DateRange::new(d(2012, 6, 1), d(2024, 3, 12)).unwrap());

        let err = ReportRequest::build("gold", range, &rates());
        assert!(matches!(err, Err(RequestError::BeforeDataFloor { .. })));
        let ok = ReportRequest::build("USD", range, &rates()).unwrap();
        assert_eq!(ok.range, range);
    }

    #[test]
    fn test_requested_range_defaults_to_shifted_today() {
        let now = at(d(2024, 3, 12), 10);
        let range = requested_range(None, None, now, 16).unwrap();
        assert_eq!(range.begin, d(2024, 3, 11));
        assert_eq!(range.end, d(2024, 3, 11));
    }

    #[test]
    fn test_requested_range_fails_without_instrument_lookup() {
        let now = at(d(2024, 3, 12), 18);
        assert!(matches!(
            requested_range(Some("2024/01/02"), None, now, 16),
            Err(RequestError::MalformedDate(_))
        ));
        assert!(matches!(
            requested_range(Some("10-03-2024"), Some("01-03-2024"), now, 16),
            Err(RequestError::ReversedRange { .. })
        ));
        assert!(matches!(
            requested_range(None, Some("13-03-2024"), now, 16),
            Err(RequestError::FutureDate { which: "end", .. })
        ));
    }
}
