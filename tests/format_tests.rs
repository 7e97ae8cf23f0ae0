//! Conformance tests for the text format: what the parser accepts and
//! rejects, and how values read and write.

use std::collections::BTreeMap;

use succ::{
    value, BoolStyle, DataFile, Document, EnumStyle, LineEnding, MemoryStorage, Style, Value,
};

fn file(text: &str) -> (MemoryStorage, DataFile<MemoryStorage>) {
    let storage = MemoryStorage::new(text);
    let file = DataFile::new(storage.clone()).unwrap();
    (storage, file)
}

mod lines {
    use super::*;

    #[test]
    fn test_comments_and_blank_lines_are_kept() {
        let text = "# header\n\n   # indented comment\nkey: 1\n\n# footer";
        let doc = Document::parse(text).unwrap();
        assert_eq!(doc.top_level_keys(), vec!["key"]);
        assert_eq!(doc.to_text(&Style::default()), text);
    }

    #[test]
    fn test_all_line_endings_are_read() {
        for text in ["a: 1\nb: 2", "a: 1\r\nb: 2", "a: 1\rb: 2"] {
            let (_, file) = file(text);
            assert_eq!(file.get::<i32>("a").unwrap(), 1, "{text:?}");
            assert_eq!(file.get::<i32>("b").unwrap(), 2, "{text:?}");
        }
    }

    #[test]
    fn test_hash_ends_data_unless_escaped() {
        let (_, file) = file("a: one # two\nb: one \\# two\nc: x#y");
        assert_eq!(file.get::<String>("a").unwrap(), "one");
        assert_eq!(file.get::<String>("b").unwrap(), "one # two");
        assert_eq!(file.get::<String>("c").unwrap(), "x");
    }

    #[test]
    fn test_hash_is_escaped_when_written() {
        let (storage, file) = file("");
        file.set("channel", &"#general".to_string()).unwrap();
        assert_eq!(storage.contents(), "channel: \\#general");
        assert_eq!(file.get::<String>("channel").unwrap(), "#general");
    }

    #[test]
    fn test_keys_may_contain_spaces() {
        let (_, file) = file("recent files: 3");
        assert_eq!(file.get::<u32>("recent files").unwrap(), 3);
    }

    #[test]
    fn test_value_may_contain_colons() {
        let (_, file) = file("url: http://localhost:8080");
        assert_eq!(file.get::<String>("url").unwrap(), "http://localhost:8080");
    }

    #[test]
    fn test_tabs_are_rejected_with_line_number() {
        let err = Document::parse("a: 1\n\tb: 2").unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_line_without_colon_is_rejected() {
        let err = Document::parse("a: 1\njust words").unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(Document::parse(": 1").unwrap_err().is_format());
    }

    #[test]
    fn test_top_level_list_item_is_rejected() {
        let err = Document::parse("- 1").unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_duplicate_top_level_key_last_wins() {
        let (_, file) = file("a: 1\na: 2");
        assert_eq!(file.get::<i32>("a").unwrap(), 2);
    }
}

mod nesting {
    use super::*;

    #[test]
    fn test_siblings_must_share_indentation() {
        let err = Document::parse("a:\n    b: 1\n      c: 2").unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_keys_and_items_cannot_be_siblings() {
        let err = Document::parse("a:\n    b: 1\n    - 2").unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_any_consistent_indentation_is_accepted() {
        let (_, file) = file("a:\n  b:\n         c: 5\n  d: 6");
        assert_eq!(file.get_at_path::<i32>(&["a", "b", "c"]).unwrap(), 5);
        assert_eq!(file.get_at_path::<i32>(&["a", "d"]).unwrap(), 6);
    }

    #[test]
    fn test_dedent_closes_nodes() {
        let doc = Document::parse("a:\n    b:\n        c: 1\nd: 2").unwrap();
        assert_eq!(doc.top_level_keys(), vec!["a", "d"]);
        assert!(doc.key_exists_at_path(&["a", "b", "c"]));
        assert!(!doc.key_exists_at_path(&["a", "d"]));
    }

    #[test]
    fn test_comment_inside_node_stays_there() {
        let text = "a:\n    # inner\n    b: 1\nc: 2";
        let (storage, file) = file(text);
        file.set_at_path(&["a", "b"], &9).unwrap();
        assert_eq!(storage.contents(), "a:\n    # inner\n    b: 9\nc: 2");
    }

    #[test]
    fn test_list_items_with_children() {
        let (_, file) = file("grid:\n    -\n        - 1\n        - 2\n    -\n        - 3");
        assert_eq!(
            file.get::<Vec<Vec<u8>>>("grid").unwrap(),
            vec![vec![1, 2], vec![3]]
        );
    }
}

mod values {
    use super::*;

    #[test]
    fn test_null_reads_as_none() {
        let (_, file) = file("a: null\nb: 4");
        assert_eq!(file.get::<Option<i32>>("a").unwrap(), None);
        assert_eq!(file.get::<Option<i32>>("b").unwrap(), Some(4));
    }

    #[test]
    fn test_none_writes_null() {
        let (storage, file) = file("");
        file.set("a", &None::<String>).unwrap();
        assert_eq!(storage.contents(), "a: null");
    }

    #[test]
    fn test_bool_words_any_case() {
        let text = "a: TRUE\nb: Off\nc: yes\nd: N";
        let (_, file) = file(text);
        assert!(file.get::<bool>("a").unwrap());
        assert!(!file.get::<bool>("b").unwrap());
        assert!(file.get::<bool>("c").unwrap());
        assert!(!file.get::<bool>("d").unwrap());
    }

    #[test]
    fn test_bool_styles() {
        let cases = [
            (BoolStyle::TrueFalse, "true"),
            (BoolStyle::OnOff, "on"),
            (BoolStyle::YesNo, "yes"),
            (BoolStyle::YN, "y"),
        ];
        for (bool_style, expected) in cases {
            let mut map = BTreeMap::new();
            map.insert("flag".to_string(), true);
            let style = Style::new().with_bool_style(bool_style);
            assert_eq!(
                succ::to_string_with_style(&map, &style).unwrap(),
                format!("flag: {expected}")
            );
        }
    }

    #[test]
    fn test_float_forms() {
        let (_, file) = file("a: 1/4\nb: infinity\nc: -infinity\nd: nan\ne: 2.5\nf: 1/2/2");
        assert_eq!(file.get::<f64>("a").unwrap(), 0.25);
        assert_eq!(file.get::<f64>("b").unwrap(), f64::INFINITY);
        assert_eq!(file.get::<f64>("c").unwrap(), f64::NEG_INFINITY);
        assert!(file.get::<f64>("d").unwrap().is_nan());
        assert_eq!(file.get::<f32>("e").unwrap(), 2.5);
        assert_eq!(file.get::<f64>("f").unwrap(), 0.25);
    }

    #[test]
    fn test_integer_out_of_range_is_type_error() {
        let (_, file) = file("a: 300\nb: -1");
        assert!(file.get::<u8>("a").unwrap_err().is_type());
        assert!(file.get::<u32>("b").unwrap_err().is_type());
    }

    #[test]
    fn test_quoted_strings() {
        let (_, file) = file("a: \"  padded  \"\nb: \"null\"\nc: \"\"quoted\"\"\nd: \"half");
        assert_eq!(file.get::<String>("a").unwrap(), "  padded  ");
        assert_eq!(file.get::<String>("b").unwrap(), "null");
        assert_eq!(file.get::<String>("c").unwrap(), "\"quoted\"");
        assert_eq!(file.get::<String>("d").unwrap(), "\"half");
    }

    #[test]
    fn test_strings_quoted_only_when_needed() {
        let (storage, file) = file("");
        file.set("a", &"plain text".to_string()).unwrap();
        file.set("b", &" lead".to_string()).unwrap();
        file.set("c", &"null".to_string()).unwrap();
        assert_eq!(storage.contents(), "a: plain text\nb: \" lead\"\nc: \"null\"");
    }

    #[test]
    fn test_multi_line_string_block() {
        let text = "motd: \"\"\"\n    Welcome back.\n        indented\n    \"\"\"\nafter: 1";
        let (_, file) = file(text);
        assert_eq!(file.get::<String>("motd").unwrap(), "Welcome back.\nindented");
        assert_eq!(file.get::<i32>("after").unwrap(), 1);
    }

    #[test]
    fn test_multi_line_string_written_as_block() {
        let (storage, file) = file("");
        file.set("motd", &"one\ntwo".to_string()).unwrap();
        assert_eq!(storage.contents(), "motd: \"\"\"\n    one\n    two\n    \"\"\"");
    }

    #[test]
    fn test_unclosed_block_is_rejected() {
        let err = Document::parse("motd: \"\"\"\n    text").unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_enum_by_name_or_number() {
        #[derive(Debug, PartialEq)]
        enum Side {
            Left,
            Right,
        }
        succ::storable_enum!(Side { Left, Right });

        let (_, file) = file("a: Right\nb: 0");
        assert_eq!(file.get::<Side>("a").unwrap(), Side::Right);
        assert_eq!(file.get::<Side>("b").unwrap(), Side::Left);

        let (_, bad) = super::file("a: right\nb: 2");
        assert!(bad.get::<Side>("a").unwrap_err().is_type());
        assert!(bad.get::<Side>("b").unwrap_err().is_type());
    }

    #[test]
    fn test_date_time_format() {
        use chrono::NaiveDate;

        let (storage, file) = file("");
        let when = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        file.set("last run", &when).unwrap();
        assert_eq!(storage.contents(), "last run: 2024-03-01 13:45:00");
        assert_eq!(file.get::<chrono::NaiveDateTime>("last run").unwrap(), when);
    }
}

mod style {
    use super::*;

    #[test]
    fn test_style_from_json_uses_defaults() {
        let style: Style = serde_json::from_str(
            r#"{"indentation_interval": 2, "bool_style": "on_off", "line_ending": "windows"}"#,
        )
        .unwrap();
        assert_eq!(style.indentation_interval, 2);
        assert_eq!(style.bool_style, BoolStyle::OnOff);
        assert_eq!(style.line_ending, LineEnding::Windows);
        assert_eq!(style.enum_style, EnumStyle::Name);
        assert_eq!(style.spaces_after_colon, 1);
    }

    #[test]
    fn test_style_json_roundtrip() {
        let style = Style::new()
            .with_indentation_interval(3)
            .with_always_quote_strings(true)
            .with_enum_style(EnumStyle::Number);
        let json = serde_json::to_string(&style).unwrap();
        let back: Style = serde_json::from_str(&json).unwrap();
        assert_eq!(back, style);
    }

    #[test]
    fn test_zero_indentation_is_rejected() {
        let (_, file) = file("");
        let err = file
            .set_style(Style::new().with_indentation_interval(0))
            .unwrap_err();
        assert!(!err.is_format());
        assert_eq!(file.style(), Style::default());
    }

    #[test]
    fn test_style_only_affects_new_lines() {
        let (storage, file) = file("old:    1");
        file.set_style(Style::new().with_spaces_after_colon(3)).unwrap();
        file.set("old", &2).unwrap();
        file.set("new", &3).unwrap();
        assert_eq!(storage.contents(), "old:    2\nnew:   3");
    }
}

mod values_as_json {
    use super::*;

    #[test]
    fn test_value_to_json() {
        let value = value!({ "name": "demo", "sizes": [1, 2], "icon": null });
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "demo", "sizes": [1, 2], "icon": null })
        );
    }

    #[test]
    fn test_value_from_json() {
        let value: Value = serde_json::from_str(r#"{"a": [true, 1.5, "x"]}"#).unwrap();
        assert_eq!(
            value,
            value!({ "a": [true, 1.5, "x"] })
        );
    }
}
