//! JSON data files: custom item lists and the Pot Odds question dataset.

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;

use drill_core::catalog::PotOddsRecord;
use drill_core::model::Item;

use crate::repository::StorageError;

#[derive(Debug, Deserialize)]
struct PotOddsFile {
    #[serde(rename = "potOddsOps")]
    pot_odds_ops: Vec<PotOddsRecord>,
}

/// Parse a Pot Odds dataset (`{ "potOddsOps": [...] }`).
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the document does not have the
/// expected shape.
pub fn parse_pot_odds(raw: &str) -> Result<Vec<PotOddsRecord>, StorageError> {
    serde_json::from_str::<PotOddsFile>(raw)
        .map(|file| file.pot_odds_ops)
        .map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Read and parse a Pot Odds dataset file.
///
/// # Errors
///
/// Returns `StorageError::NotFound` if the file does not exist,
/// `StorageError::Io` for other read failures and
/// `StorageError::Serialization` for malformed content.
pub fn load_pot_odds(path: &Path) -> Result<Vec<PotOddsRecord>, StorageError> {
    parse_pot_odds(&read(path)?)
}

/// Parse a JSON array of items: bare expression strings or `{question, answer}` objects.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the document is not such an array.
pub fn parse_items(raw: &str) -> Result<Vec<Item>, StorageError> {
    serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Read and parse an item list file.
///
/// # Errors
///
/// Same as [`load_pot_odds`].
pub fn load_items(path: &Path) -> Result<Vec<Item>, StorageError> {
    parse_items(&read(path)?)
}

fn read(path: &Path) -> Result<String, StorageError> {
    std::fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Io(format!("{}: {err}", path.display())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::catalog::{PotOddsDomain, Street};

    #[test]
    fn parses_wrapped_pot_odds_records() {
        let raw = r#"{
            "potOddsOps": [
                {"outs": 4, "street": "turn_river", "domain": "raw_odds", "question": "4 outs T→R", "answer": "10.5:1"},
                {"outs": 9, "street": "flop_turn", "domain": "conversion", "format": "percent_to_odds", "question": "19.6%", "answer": "4.1:1"}
            ]
        }"#;
        let records = parse_pot_odds(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].street, Street::TurnRiver);
        assert_eq!(records[1].domain, PotOddsDomain::Conversion);
    }

    #[test]
    fn bare_array_is_rejected() {
        assert!(matches!(parse_pot_odds("[]"), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn items_accept_both_shapes() {
        let items = parse_items(r#"["1+1", {"question": "q", "answer": 3}]"#).unwrap();
        assert_eq!(items, vec![Item::expression("1+1"), Item::question("q", "3")]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = Path::new("/definitely/not/here.json");
        assert!(matches!(load_items(path), Err(StorageError::NotFound)));
    }
}
