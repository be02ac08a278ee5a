//! Tests for dictionary construction and lookup.

use std::fs;
use std::io::Cursor;

use shiritori::WordDictionary;
use tempfile::TempDir;

#[test]
fn test_of_explicit_list() {
    let dictionary = WordDictionary::of(["apple", "Eagle"]);
    assert!(dictionary.contains("apple"));
    assert!(dictionary.contains("EAGLE"));
    assert!(dictionary.contains("  eagle "));
    assert!(!dictionary.contains("elephant"));
    assert_eq!(dictionary.len(), 2);
}

#[test]
fn test_parse_mixed_delimiters_and_whitespace() {
    let dictionary = WordDictionary::parse("apple, eagle\nelephant,,\n\n  tiger  \r\n");
    assert_eq!(dictionary.len(), 4);
    for word in ["apple", "eagle", "elephant", "tiger"] {
        assert!(dictionary.contains(word), "missing {word}");
    }
    assert!(!dictionary.contains(""));
}

#[test]
fn test_from_reader() {
    let dictionary =
        WordDictionary::from_reader(Cursor::new("rabbit,tiger\nrat")).expect("Read failed");
    assert_eq!(dictionary.len(), 3);
    assert!(dictionary.contains("rat"));
}

#[test]
fn test_from_reader_rejects_invalid_utf8() {
    let result = WordDictionary::from_reader(Cursor::new(vec![0xff, 0xfe, 0xfd]));
    assert!(result.is_err());
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("words.txt");
    fs::write(&path, "sushi\nindigo,orange\n").expect("Write failed");

    let dictionary = WordDictionary::from_file(&path).expect("Load failed");
    assert_eq!(dictionary.len(), 3);
    assert!(dictionary.contains("indigo"));
}

#[test]
fn test_from_missing_file_fails() {
    let result = WordDictionary::from_file("/this/path/does/not/exist/words.txt");
    let error = result.expect_err("Missing file should fail");
    assert!(error.message.contains("Failed to open dictionary"));
}

#[test]
fn test_empty_text_gives_empty_dictionary() {
    let dictionary = WordDictionary::parse(" ,\n, ");
    assert!(dictionary.is_empty());
}
