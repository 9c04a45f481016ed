// tests/feed_pipeline.rs
use chrono::NaiveDate;
use quake_watch::feed::{Extractor, ParseError, RecordParser};

const KOERI_HTML: &str = include_str!("fixtures/koeri_lst0.html");

#[test]
fn fixture_yields_four_records_newest_first() {
    let lines = Extractor::new("pre").unwrap().extract(KOERI_HTML).unwrap();
    assert_eq!(lines.len(), 4);

    let parser = RecordParser::default();
    let records: Vec<_> = lines.iter().map(|l| parser.parse(l).unwrap()).collect();

    assert!(records
        .windows(2)
        .all(|w| w[0].occurred_at > w[1].occurred_at));
    assert!(records[0].place.starts_with("SAROS KORFEZI(EGE DENIZI)"));
    assert!(records[0].place.ends_with("Ilksel"));
    assert_eq!(records[3].magnitude, 5.3);
    assert_eq!(records[3].depth_km, 5.2);
    assert_eq!(
        records[2].occurred_at,
        NaiveDate::from_ymd_opt(2019, 9, 27)
            .unwrap()
            .and_hms_opt(15, 58, 2)
            .unwrap()
    );
}

#[test]
fn formatted_record_parses_back_to_same_values() {
    let parser = RecordParser::default();
    let cases = [
        ("2021.01.02", "03:04:05", -12.5, 170.25, 0.0, 0.0, "NOWHERE"),
        ("2020.12.31", "23:59:59", 89.9999, -179.9999, 650.3, 7.8, "DEEP (PLACE) X"),
        ("2019.09.27", "00:00:00", 36.0, 42.1, 2.0, -1.2, "A-B"),
    ];
    for (date, time, lat, lon, depth, mag, place) in cases {
        let line = format!("{date} {time}  {lat:.4}  {lon:.4}  {depth:.1} -.- {mag:.1}  -.-   {place}   ");
        let rec = parser.parse(&line).unwrap();
        assert!((rec.latitude - lat).abs() < 1e-9, "{line}");
        assert!((rec.longitude - lon).abs() < 1e-9, "{line}");
        assert!((rec.depth_km - depth).abs() < 1e-9, "{line}");
        assert!((rec.magnitude - mag).abs() < 1e-9, "{line}");
        assert_eq!(rec.place, place);
        assert_eq!(rec.occurred_at.format("%Y.%m.%d").to_string(), date);
        assert_eq!(rec.occurred_at.format("%H:%M:%S").to_string(), time);
    }
}

#[test]
fn lines_with_missing_columns_are_malformed() {
    let parser = RecordParser::default();
    for line in [
        "2019.09.27 16:35:47  40.4215   26.0910       11.7",
        "2019.09.27 16:35:47  40.4215",
        "garbage",
        "",
    ] {
        assert!(
            matches!(parser.parse(line), Err(ParseError::Malformed { .. })),
            "expected malformed: {line:?}"
        );
    }
}
