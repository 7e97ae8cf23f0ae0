use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use num_bigint::BigInt;
use parking_lot::RwLock;
use succ::{
    storable_enum, BaseTypeRegistry, BoolStyle, ComplexDescriptor, DataFile, DataFileOptions,
    Descriptor, EnumStyle, Error, FieldDescriptor, Fields, MemoryStorage, ReadOnlyDataFile,
    Reloadable, Result, Storable, Style, Value,
};

#[derive(Debug, Clone, PartialEq)]
struct ComplexType {
    integer: i32,
    text: String,
    boolean: bool,
}

impl ComplexType {
    fn new(integer: i32, text: &str, boolean: bool) -> Self {
        ComplexType {
            integer,
            text: text.to_string(),
            boolean,
        }
    }
}

impl Storable for ComplexType {
    fn descriptor() -> Descriptor {
        ComplexDescriptor::builder("ComplexType", || ComplexType::new(0, "", false).to_value())
            .field(FieldDescriptor::of::<i32>("integer"))
            .field(FieldDescriptor::of::<String>("text").private().do_save())
            .field(FieldDescriptor::of::<bool>("boolean"))
            .initializer(
                vec![i32::descriptor(), String::descriptor(), bool::descriptor()],
                |mut args| {
                    let integer: i32 = args.next()?;
                    let text: String = args.next()?;
                    let boolean: bool = args.next()?;
                    Ok(ComplexType::new(integer, &text, boolean).to_value())
                },
            )
            .build()
    }

    fn to_value(&self) -> Value {
        Value::Object(
            Fields::new()
                .with("integer", self.integer.to_value())
                .with("text", self.text.to_value())
                .with("boolean", self.boolean.to_value()),
        )
    }

    fn from_value(value: Value) -> Result<Self> {
        let mut fields = value.into_object()?;
        Ok(ComplexType {
            integer: fields.take("integer")?,
            text: fields.take("text")?,
            boolean: fields.take("boolean")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Color {
    Red,
    Green,
    Blue,
}

storable_enum!(Color { Red, Green, Blue });

const KEY: &str = "test key";

/// Saves `value` with `style`, reopens the stored text, and reads it back.
fn roundtrip_with<T>(value: &T, style: Style) -> T
where
    T: Storable + Debug,
{
    let storage = MemoryStorage::empty();
    let file = DataFile::open(storage.clone(), DataFileOptions::new().with_style(style)).unwrap();
    file.set(KEY, value).unwrap();

    let reopened = DataFile::new(storage.clone()).unwrap();
    reopened
        .get(KEY)
        .unwrap_or_else(|e| panic!("failed to read {value:?} back from {:?}: {e}", storage.contents()))
}

fn assert_roundtrip<T>(value: T)
where
    T: Storable + PartialEq + Debug,
{
    assert_eq!(roundtrip_with(&value, Style::default()), value);
}

#[test]
fn test_bool_roundtrip_all_styles() {
    for style in [BoolStyle::TrueFalse, BoolStyle::OnOff, BoolStyle::YesNo, BoolStyle::YN] {
        for b in [true, false] {
            let back = roundtrip_with(&b, Style::new().with_bool_style(style));
            assert_eq!(back, b, "{style:?}");
        }
    }
}

#[test]
fn test_bool_style_text() {
    let storage = MemoryStorage::empty();
    let file = DataFile::open(
        storage.clone(),
        DataFileOptions::new().with_style(Style::new().with_bool_style(BoolStyle::YN)),
    )
    .unwrap();
    file.set("a", &true).unwrap();
    file.set("b", &false).unwrap();
    assert_eq!(storage.contents(), "a: y\nb: n");
}

#[test]
fn test_integer_extremes() {
    assert_roundtrip(i8::MIN);
    assert_roundtrip(i8::MAX);
    assert_roundtrip(i16::MIN);
    assert_roundtrip(i32::MIN);
    assert_roundtrip(i32::MAX);
    assert_roundtrip(i64::MIN);
    assert_roundtrip(i64::MAX);
    assert_roundtrip(u8::MAX);
    assert_roundtrip(u16::MAX);
    assert_roundtrip(u32::MAX);
    assert_roundtrip(u64::MAX);
    assert_roundtrip(0u64);
}

#[test]
fn test_float_roundtrip() {
    for x in [
        0.0,
        -0.5,
        0.1 + 0.2,
        1e300,
        -1e300,
        f64::MAX,
        f64::MIN_POSITIVE,
        f64::INFINITY,
        f64::NEG_INFINITY,
    ] {
        assert_roundtrip(x);
    }
    assert!(roundtrip_with(&f64::NAN, Style::default()).is_nan());
    assert_roundtrip(3.25f32);
    assert_roundtrip(f32::MAX);
}

#[test]
fn test_float_special_and_rational_input() {
    let file = DataFile::new(MemoryStorage::new(
        "half: 1/2\nchained: 100/5/2\nup: infinity\ndown: -infinity\nnope: nan",
    ))
    .unwrap();
    assert_eq!(file.get::<f64>("half").unwrap(), 0.5);
    assert_eq!(file.get::<f64>("chained").unwrap(), 10.0);
    assert_eq!(file.get::<f64>("up").unwrap(), f64::INFINITY);
    assert_eq!(file.get::<f64>("down").unwrap(), f64::NEG_INFINITY);
    assert!(file.get::<f64>("nope").unwrap().is_nan());
}

#[test]
fn test_chars_and_strings() {
    for c in ['a', 'Z', ' ', '#', '"', 'é', '-', ':'] {
        assert_roundtrip(c);
    }
    for s in [
        "",
        "plain",
        "  padded  ",
        "\"quoted\"",
        "null",
        "has # hash",
        "key: like",
        "- dash",
        "\"",
    ] {
        assert_roundtrip(s.to_string());
    }
}

#[test]
fn test_multi_line_strings() {
    for s in ["one\ntwo", "trailing\n", "\nleading", "a\n\n  b  \n\"\"\""] {
        assert_roundtrip(s.to_string());
    }
}

#[test]
fn test_carriage_returns_are_rejected_without_writing() {
    let storage = MemoryStorage::new("a: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    for s in ["x\r\ny", "x\ry", "end\r"] {
        assert!(file.set("s", &s.to_string()).unwrap_err().is_type(), "{s:?}");
    }
    assert!(file.set("c", &'\r').unwrap_err().is_type());
    assert_eq!(storage.contents(), "a: 1");
    assert!(!file.key_exists("s"));
}

#[test]
fn test_read_miss_keeps_file_when_type_has_no_zero() {
    let storage = MemoryStorage::new("a: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    assert!(file.get::<char>("c").unwrap_err().is_type());
    assert_eq!(storage.contents(), "a: 1");

    assert_eq!(file.get::<BigInt>("big").unwrap(), BigInt::from(0));
    assert_eq!(storage.contents(), "a: 1\nbig: 0");
}

#[test]
fn test_enum_roundtrip_both_styles() {
    for style in [EnumStyle::Name, EnumStyle::Number] {
        for color in [Color::Red, Color::Green, Color::Blue] {
            let back = roundtrip_with(&color, Style::new().with_enum_style(style));
            assert_eq!(back, color);
        }
    }

    let storage = MemoryStorage::empty();
    let file = DataFile::open(
        storage.clone(),
        DataFileOptions::new().with_style(Style::new().with_enum_style(EnumStyle::Number)),
    )
    .unwrap();
    file.set("color", &Color::Blue).unwrap();
    assert_eq!(storage.contents(), "color: 2");

    let named = DataFile::new(MemoryStorage::new("a: Green\nb: 0\nc: green")).unwrap();
    assert_eq!(named.get::<Color>("a").unwrap(), Color::Green);
    assert_eq!(named.get::<Color>("b").unwrap(), Color::Red);
    assert!(named.get::<Color>("c").unwrap_err().is_type());
}

#[test]
fn test_dates_and_big_integers() {
    let date: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(13, 45, 0)
        .unwrap();
    assert_roundtrip(date);

    let storage = MemoryStorage::empty();
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("when", &date).unwrap();
    assert_eq!(storage.contents(), "when: 2024-03-01 13:45:00");

    let big: BigInt = "-123456789012345678901234567890".parse().unwrap();
    assert_roundtrip(big);
}

#[test]
fn test_collections() {
    assert_roundtrip(Vec::<i32>::new());
    assert_roundtrip(vec![1, -2, 3]);
    assert_roundtrip([true, false, true]);
    assert_roundtrip(vec!["a".to_string(), "".to_string(), " b".to_string()]);
    assert_roundtrip(vec![vec![1, 2], vec![], vec![3]]);
    assert_roundtrip(vec![vec![vec![Color::Red]], vec![vec![Color::Blue, Color::Green]]]);
    assert_roundtrip(["x".to_string(), "y".to_string()].into_iter().collect::<BTreeSet<_>>());
    assert_roundtrip([1u8, 2, 3].into_iter().collect::<HashSet<_>>());
    assert_roundtrip(vec![Some(1), None, Some(3)]);
    assert_roundtrip(vec!["line one\nline two".to_string(), "single".to_string()]);
}

#[test]
fn test_maps() {
    let mut scores = HashMap::new();
    scores.insert("alice".to_string(), 10);
    scores.insert("bob smith".to_string(), 7);
    assert_roundtrip(scores);

    let mut by_color = BTreeMap::new();
    by_color.insert(Color::Red, vec![1.5, 2.5]);
    by_color.insert(Color::Blue, vec![]);
    assert_roundtrip(by_color);

    assert_roundtrip(BTreeMap::<u16, String>::new());

    let mut nested = BTreeMap::new();
    nested.insert(1u32, BTreeMap::from([("inner".to_string(), true)]));
    assert_roundtrip(nested);
}

#[test]
fn test_map_with_invalid_keys_uses_entries() {
    let mut map = HashMap::new();
    map.insert("a:b".to_string(), 1);
    map.insert("#hash".to_string(), 2);
    map.insert("-dash".to_string(), 3);
    map.insert("fine".to_string(), 4);

    let storage = MemoryStorage::empty();
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("map", &map).unwrap();
    let text = storage.contents();
    assert!(text.contains("    -\n        key: a:b\n"), "{text}");
    assert!(text.contains("        key: fine\n"), "{text}");

    let back: HashMap<String, i32> = DataFile::new(storage).unwrap().get("map").unwrap();
    assert_eq!(back, map);
}

#[test]
fn test_map_keys_that_are_not_base_types_use_entries() {
    let mut map = BTreeMap::new();
    map.insert(vec![1, 2], "pair".to_string());
    map.insert(vec![], "none".to_string());
    assert_roundtrip(map);
}

#[test]
fn test_complex_types() {
    assert_roundtrip(ComplexType::new(42, "hello", true));
    assert_roundtrip(ComplexType::new(-1, "", false));
    assert_roundtrip(Some(ComplexType::new(1, "x", true)));
    assert_roundtrip(None::<ComplexType>);
    assert_roundtrip(vec![ComplexType::new(1, "a", false), ComplexType::new(2, "b", true)]);

    let storage = MemoryStorage::empty();
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("thing", &ComplexType::new(3, "three", true)).unwrap();
    assert_eq!(
        storage.contents(),
        "thing:\n    integer: 3\n    text: three\n    boolean: true"
    );
}

#[test]
fn test_null_complex_value_is_written_as_null() {
    let storage = MemoryStorage::empty();
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("thing", &Some(ComplexType::new(3, "three", true))).unwrap();
    file.set("thing", &None::<ComplexType>).unwrap();
    assert_eq!(storage.contents(), "thing: null");
    assert_eq!(file.get::<Option<ComplexType>>("thing").unwrap(), None);
}

#[test]
fn test_complex_shortcut_initializer() {
    let saved = ComplexType::new(0, "example", true);
    let file = DataFile::new(MemoryStorage::new(format!("{KEY}:(0, \"example\", true)"))).unwrap();
    let loaded: ComplexType = file.get(KEY).unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn test_complex_shortcut_without_match_is_a_type_error() {
    let file = DataFile::new(MemoryStorage::new("x: (1, 2)")).unwrap();
    assert!(file.get::<ComplexType>("x").unwrap_err().is_type());
}

#[test]
fn test_minimal_diff() {
    let original = "# header comment\n\
                    \n\
                    name: demo # the name\n\
                    \n\
                    window:\n\
                    \x20   # size in pixels\n\
                    \x20   width:    800\n\
                    \x20   height: 600 # tall enough\n\
                    \n\
                    # trailing note\n\
                    volume: 5";
    let storage = MemoryStorage::new(original);
    let file = DataFile::new(storage.clone()).unwrap();
    file.set_at_path(&["window", "width"], &1024u32).unwrap();

    let before: Vec<&str> = original.lines().collect();
    let text = storage.contents();
    let after: Vec<&str> = text.lines().collect();
    assert_eq!(before.len(), after.len());
    for (i, (b, a)) in before.iter().zip(&after).enumerate() {
        if b.contains("width") {
            assert_eq!(*a, "    width:    1024");
        } else {
            assert_eq!(b, a, "line {} changed", i + 1);
        }
    }
}

#[test]
fn test_value_with_comment_keeps_comment() {
    let storage = MemoryStorage::new("name: demo # the name");
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("name", &"other".to_string()).unwrap();
    assert_eq!(storage.contents(), "name: other # the name");
}

#[test]
fn test_idempotent_save() {
    let storage = MemoryStorage::new("a: 1\n# note\nb:\n    - x");
    let file = DataFile::open(storage.clone(), DataFileOptions::new().with_auto_save(false)).unwrap();
    file.set("a", &2i32).unwrap();
    assert!(file.save().unwrap());
    let first = storage.contents();
    assert!(!file.save().unwrap());
    assert_eq!(storage.contents(), first);

    file.set("a", &2i32).unwrap();
    assert!(!file.save().unwrap());
}

#[test]
fn test_nested_path_creation() {
    let storage = MemoryStorage::empty();
    let file = DataFile::open(
        storage.clone(),
        DataFileOptions::new().with_style(Style::new().with_indentation_interval(2)),
    )
    .unwrap();
    file.set_at_path(&["a", "b", "c"], &"deep".to_string()).unwrap();
    file.set_at_path(&["a", "b", "d"], &1u8).unwrap();
    file.set_at_path(&["a", "e"], &true).unwrap();

    assert_eq!(
        storage.contents(),
        "a:\n  b:\n    c: deep\n    d: 1\n  e: true"
    );
    let reopened = DataFile::new(storage).unwrap();
    assert_eq!(reopened.get_at_path::<String>(&["a", "b", "c"]).unwrap(), "deep");
    assert_eq!(reopened.get_at_path::<u8>(&["a", "b", "d"]).unwrap(), 1);
    assert!(reopened.key_exists_at_path(&["a", "e"]));
}

#[test]
fn test_new_children_follow_existing_indentation() {
    let storage = MemoryStorage::new("a:\n  b: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    file.set_at_path(&["a", "c"], &2u8).unwrap();
    assert_eq!(storage.contents(), "a:\n  b: 1\n  c: 2");
}

#[test]
fn test_empty_path_is_rejected() {
    let file = DataFile::new(MemoryStorage::empty()).unwrap();
    assert!(file.get_at_path::<i32>(&[]).unwrap_err().is_key());
    assert!(file.set_at_path(&[], &1).unwrap_err().is_key());
}

#[test]
fn test_invalid_key_is_rejected() {
    let storage = MemoryStorage::new("a: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    for key in ["", "-x", "a:b", "a#b", " a"] {
        let err = file.set(key, &1).unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }), "{key:?}: {err}");
    }
    assert_eq!(storage.contents(), "a: 1");
}

#[test]
fn test_empty_file() {
    for text in ["", "   ", "\n\n", " \n \r\n"] {
        let file = DataFile::new(MemoryStorage::new(text)).unwrap();
        assert!(file.top_level_keys().is_empty());
        assert_eq!(file.raw_text(), "");
    }
}

#[test]
fn test_defaults_fallback_and_persist() {
    let storage = MemoryStorage::new("volume: 3");
    let file = DataFile::open(
        storage.clone(),
        DataFileOptions::new().with_default_text("volume: 5\naudio:\n    muted: yes"),
    )
    .unwrap();

    assert_eq!(file.get::<u8>("volume").unwrap(), 3);
    assert!(file.get_at_path::<bool>(&["audio", "muted"]).unwrap());
    assert_eq!(file.get_or("quality", 2u8).unwrap(), 2);
    assert_eq!(file.get::<i64>("unknown").unwrap(), 0);
    assert_eq!(file.get::<Vec<String>>("names").unwrap(), Vec::<String>::new());

    assert_eq!(
        storage.contents(),
        "volume: 3\naudio:\n    muted: true\nquality: 2\nunknown: 0\nnames:"
    );
}

#[test]
fn test_read_miss_without_auto_save_stays_in_memory() {
    let storage = MemoryStorage::new("a: 1");
    let file = DataFile::open(storage.clone(), DataFileOptions::new().with_auto_save(false)).unwrap();
    assert_eq!(file.get_or("b", 2).unwrap(), 2);
    assert!(file.key_exists("b"));
    assert_eq!(storage.contents(), "a: 1");
    file.save().unwrap();
    assert_eq!(storage.contents(), "a: 1\nb: 2");
}

#[test]
fn test_try_get_does_not_persist() {
    let storage = MemoryStorage::new("a: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    assert_eq!(file.try_get::<i32>("a").unwrap(), Some(1));
    assert_eq!(file.try_get::<i32>("b").unwrap(), None);
    assert_eq!(storage.contents(), "a: 1");
}

#[test]
fn test_self_write_suppression() {
    let storage = MemoryStorage::new("count: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    let reloads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reloads);
    file.set_reload_callback(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    file.set("count", &2).unwrap();
    assert!(!file.on_external_change().unwrap());
    assert_eq!(reloads.load(Ordering::SeqCst), 0);

    storage.set_contents("count: 10");
    assert!(file.on_external_change().unwrap());
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
    assert_eq!(file.get::<i32>("count").unwrap(), 10);
}

#[test]
fn test_suppression_is_consumed_by_the_next_change_only() {
    let storage = MemoryStorage::new("count: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("count", &2).unwrap();
    file.set("count", &3).unwrap();
    assert!(!file.on_external_change().unwrap());
    assert!(file.on_external_change().unwrap());
}

#[test]
fn test_unchanged_set_does_not_suppress() {
    let storage = MemoryStorage::new("count: 1");
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("count", &1).unwrap();
    storage.set_contents("count: 5");
    assert!(file.on_external_change().unwrap());
    assert_eq!(file.get::<i32>("count").unwrap(), 5);
}

#[test]
fn test_delete_key() {
    let storage = MemoryStorage::new("a: 1\nb:\n    c: 2\nd: 3");
    let file = DataFile::new(storage.clone()).unwrap();
    assert!(file.delete_key("b").unwrap());
    assert!(!file.delete_key("b").unwrap());
    assert_eq!(storage.contents(), "a: 1\nd: 3");
    assert_eq!(file.top_level_keys(), vec!["a", "d"]);
}

#[test]
fn test_save_and_get_as_object() {
    let storage = MemoryStorage::new("# settings\ninteger: 1\nextra: kept");
    let file = DataFile::new(storage.clone()).unwrap();
    file.save_as_object(&ComplexType::new(7, "seven", true)).unwrap();
    assert_eq!(
        storage.contents(),
        "# settings\ninteger: 7\nextra: kept\ntext: seven\nboolean: true"
    );
    assert_eq!(
        file.get_as_object::<ComplexType>().unwrap(),
        ComplexType::new(7, "seven", true)
    );
    assert!(file.save_as_object(&5i32).unwrap_err().is_type());
}

#[test]
fn test_save_as_map_removes_stale_keys() {
    let storage = MemoryStorage::new("a: 1\nb: 2 # two\nc: 3");
    let file = DataFile::new(storage.clone()).unwrap();
    let mut map = BTreeMap::new();
    map.insert("b".to_string(), 20);
    map.insert("z".to_string(), 26);
    file.save_as_map(&map).unwrap();
    assert_eq!(storage.contents(), "b: 20 # two\nz: 26");
    assert_eq!(file.get_as_map::<BTreeMap<String, i32>>().unwrap(), map);
    assert!(file.save_as_map(&vec![1]).unwrap_err().is_type());
}

#[test]
fn test_reset_to_default_data() {
    let storage = MemoryStorage::new("a: 1\nb: 2");
    let file = DataFile::open(
        storage.clone(),
        DataFileOptions::new().with_default_text("# fresh\na: 0"),
    )
    .unwrap();
    file.reset_to_default_data().unwrap();
    assert_eq!(storage.contents(), "# fresh\na: 0");
    assert_eq!(file.top_level_keys(), vec!["a"]);
    assert!(!file.on_external_change().unwrap());
}

#[test]
fn test_set_fresh_drops_block_formatting() {
    let storage = MemoryStorage::empty();
    let file = DataFile::new(storage.clone()).unwrap();
    file.set("text", &"one\ntwo".to_string()).unwrap();
    file.set("text", &"short".to_string()).unwrap();
    assert_eq!(storage.contents(), "text: \"\"\"\n    short\n    \"\"\"");
    assert_eq!(file.get::<String>("text").unwrap(), "short");

    file.set_fresh("text", &"short".to_string()).unwrap();
    assert_eq!(storage.contents(), "text: short");
}

#[test]
fn test_style_spacing_and_quotes() {
    let style = Style::new()
        .with_spaces_after_colon(3)
        .with_spaces_after_dash(2)
        .with_always_quote_strings(true);
    let storage = MemoryStorage::new("old: 1");
    let file = DataFile::open(storage.clone(), DataFileOptions::new().with_style(style)).unwrap();
    file.set("name", &"demo".to_string()).unwrap();
    file.set("list", &vec!["x".to_string()]).unwrap();
    file.set("old", &2).unwrap();
    assert_eq!(
        storage.contents(),
        "old: 2\nname:   \"demo\"\nlist:\n    -  \"x\""
    );
    assert_eq!(file.get::<String>("name").unwrap(), "demo");
}

#[test]
fn test_always_array_maps() {
    let storage = MemoryStorage::empty();
    let file = DataFile::open(
        storage.clone(),
        DataFileOptions::new().with_style(Style::new().with_always_array_maps(true)),
    )
    .unwrap();
    let map = BTreeMap::from([("k".to_string(), 1)]);
    file.set("m", &map).unwrap();
    assert_eq!(storage.contents(), "m:\n    -\n        key: k\n        value: 1");
    assert_eq!(file.get::<BTreeMap<String, i32>>("m").unwrap(), map);
}

#[test]
fn test_windows_line_endings() {
    let storage = MemoryStorage::new("a: 1\r\nb: 2");
    let file = DataFile::open(
        storage.clone(),
        DataFileOptions::new().with_style(Style::new().with_line_ending(succ::LineEnding::Windows)),
    )
    .unwrap();
    file.set("c", &3).unwrap();
    assert_eq!(storage.contents(), "a: 1\r\nb: 2\r\nc: 3");
}

#[test]
fn test_type_mismatch_on_read() {
    let file = DataFile::new(MemoryStorage::new("n: twelve\nlist:\n    - 1")).unwrap();
    assert!(file.get::<i32>("n").unwrap_err().is_type());
    assert!(file.get::<i32>("list").unwrap_err().is_type());
    assert!(file.get::<u8>("n").is_err());
}

#[test]
fn test_malformed_file_fails_to_open() {
    let err = DataFile::new(MemoryStorage::new("a: 1\n\tb: 2")).unwrap_err();
    assert!(err.is_format());
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_custom_base_type_with_injected_registry() {
    let mut registry = BaseTypeRegistry::new();
    registry
        .register(
            "percent",
            |value, _| {
                let n = value
                    .as_i64()
                    .ok_or_else(|| Error::type_mismatch("percent", value.kind_name()))?;
                Ok(format!("{n}%"))
            },
            |text| {
                text.trim_end_matches('%')
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(Error::custom)
            },
        )
        .unwrap();
    let registry = Arc::new(RwLock::new(registry));

    let storage = MemoryStorage::empty();
    let file = DataFile::open(storage.clone(), DataFileOptions::new().with_registry(registry)).unwrap();
    let percent = Descriptor::base("percent");
    file.set_value("progress", &Value::Int(40), &percent).unwrap();
    assert_eq!(storage.contents(), "progress: 40%");
    assert_eq!(file.get_value("progress", &percent, None).unwrap(), Value::Int(40));

    let plain = DataFile::new(MemoryStorage::new("progress: 40%")).unwrap();
    assert!(plain.get_value("progress", &percent, None).unwrap_err().is_type());
}

#[test]
fn test_read_only_file() {
    let storage = MemoryStorage::new("a: 1");
    let file = ReadOnlyDataFile::open(
        storage.clone(),
        DataFileOptions::new().with_default_text("b: 2"),
    )
    .unwrap();
    assert_eq!(file.get::<i32>("a").unwrap(), 1);
    assert_eq!(file.get::<i32>("b").unwrap(), 2);
    assert_eq!(file.get_or("c", 3).unwrap(), 3);
    assert_eq!(storage.contents(), "a: 1");

    storage.set_contents("a: 5");
    assert!(file.on_external_change().unwrap());
    assert_eq!(file.get::<i32>("a").unwrap(), 5);
}

#[test]
fn test_file_storage_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    {
        let file = DataFile::open_path(&path, DataFileOptions::new().with_default_text("# defaults\nlevel: 1"))
            .unwrap();
        assert_eq!(file.path(), dir.path().join("config.succ"));
        file.set("level", &4u8).unwrap();
    }
    let on_disk = std::fs::read_to_string(dir.path().join("config.succ")).unwrap();
    assert_eq!(on_disk, "# defaults\nlevel: 4");

    let reopened = DataFile::open_path(&path, DataFileOptions::new()).unwrap();
    assert_eq!(reopened.get::<u8>("level").unwrap(), 4);
}

#[test]
fn test_concurrent_sets_do_not_interleave() {
    let storage = MemoryStorage::empty();
    let file = Arc::new(DataFile::new(storage.clone()).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let file = Arc::clone(&file);
            std::thread::spawn(move || {
                let key = format!("t{i}");
                for j in 0..20 {
                    file.set_at_path(&[key.as_str(), "n"], &j).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let reopened = DataFile::new(storage).unwrap();
    for i in 0..8 {
        let key = format!("t{i}");
        assert_eq!(reopened.get_at_path::<i32>(&[key.as_str(), "n"]).unwrap(), 19);
    }
}
