//! Registry-level behavior against injected lookup sources.

use std::fmt;
use std::time::Duration;

use envset::{Binding, Error, Layered, MapLookup, Value, ValueError, VarSet};

fn lookup(entries: &[(&str, &str)]) -> MapLookup {
    entries.iter().copied().collect()
}

#[test]
fn full_declaration_round_trip() {
    let mut set = VarSet::new("test");

    let b = set.bool("BOOL", "bool test");
    let i = set.int("INT", "int test");
    let listen = set.bind_addr("LISTEN", "bindaddr test");
    let addr = set.dial_addr("ADDR", "dialaddr test");
    let url = set.url("URL", "URL test");
    let s = set.string("STRING", "string test");
    let timeout = set.duration("TIMEOUT", "timeout test");
    let f32v = set.float32("FLOAT32", "float32 test");
    let f64v = set.float64("FLOAT64", "float64 test");

    let entries = [
        ("TEST_BOOL", "true"),
        ("TEST_INT", "1"),
        ("TEST_LISTEN", ":1234"),
        ("TEST_ADDR", "localhost:1234"),
        ("TEST_URL", "http://localhost:1234/api"),
        ("TEST_STRING", "name"),
        ("TEST_TIMEOUT", "1m 1s"),
        ("TEST_FLOAT32", "1.23"),
        ("TEST_FLOAT64", "1.24"),
    ];
    set.parse_from(&lookup(&entries)).unwrap();

    assert!(b.get());
    assert_eq!(i.get(), 1);
    assert_eq!(listen.get(), ":1234");
    assert_eq!(addr.get(), "localhost:1234");
    assert_eq!(url.get().unwrap().as_str(), "http://localhost:1234/api");
    assert_eq!(s.get(), "name");
    assert_eq!(timeout.get(), Duration::from_secs(61));
    assert!((f32v.get() - 1.23).abs() < f32::EPSILON);
    assert!((f64v.get() - 1.24).abs() < f64::EPSILON);

    // Every variable renders back to exactly the raw input it was fed.
    let mut seen = Vec::new();
    set.visit(|v| {
        assert!(!seen.contains(&v.name().to_owned()), "duplicate {}", v.name());
        seen.push(v.name().to_owned());

        let expected = entries
            .iter()
            .find(|(name, _)| *name == v.name())
            .map(|(_, raw)| *raw)
            .unwrap();
        assert_eq!(v.render(), expected, "render of {}", v.name());
    });
    assert_eq!(seen.len(), entries.len());
}

#[test]
fn int_table() {
    let cases = [
        ("1234", 1234, false),
        ("0", 0, false),
        ("-7", -7, false),
        ("", 0, true),
        (" ", 0, true),
        ("a", 0, true),
        ("12.3", 0, true),
    ];

    for (raw, expected, want_err) in cases {
        let mut set = VarSet::new("test");
        let value = set.int("INT", "int test");

        let result = set.parse_from(&lookup(&[("TEST_INT", raw)]));
        assert_eq!(result.is_err(), want_err, "input {raw:?}");
        assert_eq!(value.get(), expected, "input {raw:?}");
    }
}

#[test]
fn bool_table() {
    let cases = [
        ("1", true, false),
        ("T", true, false),
        ("TRUE", true, false),
        ("true", true, false),
        ("0", false, false),
        ("F", false, false),
        ("FALSE", false, false),
        ("false", false, false),
        ("", false, true),
        (" ", false, true),
        ("2", false, true),
        ("a", false, true),
        ("12.3", false, true),
    ];

    for (raw, expected, want_err) in cases {
        let mut set = VarSet::new("test");
        let value = set.bool("BOOL", "bool test");

        let result = set.parse_from(&lookup(&[("TEST_BOOL", raw)]));
        assert_eq!(result.is_err(), want_err, "input {raw:?}");
        assert_eq!(value.get(), expected, "input {raw:?}");
    }
}

#[test]
fn bind_addr_table() {
    let cases = [
        (":1234", false),
        ("localhost:1234", false),
        ("192.168.0.1:1234", false),
        ("[::1]:1234", false),
        ("", true),
        (":", true),
        ("192.168.0.1:", true),
        ("localhost:", true),
        ("no-colon", true),
    ];

    for (raw, want_err) in cases {
        let mut set = VarSet::new("test");
        set.bind_addr("BIND", "bind address test");

        let result = set.parse_from(&lookup(&[("TEST_BIND", raw)]));
        assert_eq!(result.is_err(), want_err, "input {raw:?}");
    }
}

#[test]
fn dial_addr_table() {
    let cases = [
        ("localhost:1234", false),
        ("192.168.0.1:1234", false),
        ("example.com:1234", false),
        ("", true),
        (":", true),
        (":1234", true),
        ("192.168.0.1:", true),
        ("localhost:", true),
    ];

    for (raw, want_err) in cases {
        let mut set = VarSet::new("test");
        set.dial_addr("ADDR", "dial address test");

        let result = set.parse_from(&lookup(&[("TEST_ADDR", raw)]));
        assert_eq!(result.is_err(), want_err, "input {raw:?}");
    }
}

#[test]
fn string_required_rejects_empty_and_keeps_storage() {
    let mut set = VarSet::new("test");
    let value = set.string_required("NAME", "required string");

    let errs = set.parse_from(&lookup(&[("TEST_NAME", "")])).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(value.get(), "");

    set.parse_from(&lookup(&[("TEST_NAME", "present")])).unwrap();
    assert_eq!(value.get(), "present");
}

#[test]
fn missing_variables_each_produce_an_error() {
    let mut set = VarSet::new("test");
    set.string("ONE", "");
    set.int("TWO", "");
    set.duration("THREE", "");
    set.url("FOUR", "");

    let errs = set.parse_from(&MapLookup::default()).unwrap_err();
    assert_eq!(errs.len(), 4);
    for err in &errs {
        assert!(err.to_string().starts_with("missing environment variable"));
    }
}

#[test]
fn aggregate_mixes_missing_and_invalid_in_declaration_order() {
    let mut set = VarSet::new("test");
    set.int("BAD_INT", "");
    set.string("ABSENT", "");
    set.bool("BAD_BOOL", "");
    set.string("FINE", "");

    let errs = set
        .parse_from(&lookup(&[
            ("TEST_BAD_INT", "abc"),
            ("TEST_BAD_BOOL", "maybe"),
            ("TEST_FINE", "ok"),
        ]))
        .unwrap_err();

    let vars: Vec<_> = errs.iter().map(Error::var).collect();
    assert_eq!(vars, ["TEST_BAD_INT", "TEST_ABSENT", "TEST_BAD_BOOL"]);

    assert!(errs[0]
        .to_string()
        .starts_with("could not set environment variable TEST_BAD_INT:"));
    assert!(errs[1].to_string().contains("missing"));
}

#[test]
fn empty_but_present_differs_from_missing() {
    let mut set = VarSet::new("test");
    let value = set.string("MAYBE", "");

    set.parse_from(&lookup(&[("TEST_MAYBE", "")])).unwrap();
    assert_eq!(value.get(), "");

    set.string("ABSENT", "");
    set.parse_from(&lookup(&[("TEST_MAYBE", "")])).unwrap_err();
}

#[test]
fn layered_lookup_prefers_the_primary() {
    let mut set = VarSet::new("test");
    let value = set.string("LAYERED", "");

    let primary = lookup(&[("TEST_LAYERED", "from-primary")]);
    let fallback = lookup(&[("TEST_LAYERED", "from-fallback")]);
    set.parse_from(&Layered::new(primary, fallback)).unwrap();
    assert_eq!(value.get(), "from-primary");
}

#[derive(Debug)]
struct NegativeError;

impl fmt::Display for NegativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "must be >= 0")
    }
}

impl std::error::Error for NegativeError {}

/// A caller-defined variable type: a non-negative integer.
struct PositiveInt(Binding<i32>);

impl Value for PositiveInt {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        let n: i32 = raw.parse().map_err(ValueError::other)?;
        if n < 0 {
            return Err(ValueError::other(NegativeError));
        }
        self.0.store(n);
        Ok(())
    }

    fn render(&self) -> String {
        self.0.get().to_string()
    }
}

#[test]
fn caller_defined_value_types_plug_into_var() {
    let mut set = VarSet::new("test");
    let cell: Binding<i32> = Binding::default();
    set.var(PositiveInt(cell.clone()), "COUNT", "a non-negative count");

    set.parse_from(&lookup(&[("TEST_COUNT", "5")])).unwrap();
    assert_eq!(cell.get(), 5);

    let errs = set.parse_from(&lookup(&[("TEST_COUNT", "-5")])).unwrap_err();
    assert!(errs[0].to_string().contains("must be >= 0"));
    assert_eq!(cell.get(), 5);
}
