use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::eval::{self, Tokens};

/// One drill unit.
///
/// Items are immutable once queued; transforms build new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    /// `operand (op operand)*` using `+ - × ÷`.
    Expression(String),
    /// A structured question with its literal answer.
    Question { question: String, answer: String },
}

impl Item {
    #[must_use]
    pub fn expression(expr: impl Into<String>) -> Self {
        Self::Expression(expr.into())
    }

    #[must_use]
    pub fn question(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::Question {
            question: question.into(),
            answer: answer.into(),
        }
    }

    #[must_use]
    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }

    /// The surface form presented to the user, mirrored when requested.
    ///
    /// Structured questions ignore `mirror`.
    #[must_use]
    pub fn presented(&self, mirror: bool) -> Presented {
        match self {
            Self::Expression(expr) => {
                let tokens = Tokens::split(expr);
                let tokens = if mirror { tokens.mirrored() } else { tokens };
                let surface = tokens.join();
                Presented {
                    text: tokens.join_spaced(),
                    expected: eval::expected_answer(&surface),
                }
            }
            Self::Question { question, answer } => Presented {
                text: question.clone(),
                expected: answer.clone(),
            },
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(expr) => write!(f, "{expr}"),
            Self::Question { question, .. } => write!(f, "{question}"),
        }
    }
}

/// Display text and expected answer computed for one presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presented {
    pub text: String,
    pub expected: String,
}

//
// ─── SERDE ─────────────────────────────────────────────────────────────────────
//

/// Wire shape: either a bare expression string or `{question, answer}` where the
/// answer may be a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemRepr {
    Expression(String),
    Question { question: String, answer: AnswerValue },
}

/// A literal answer as found in data files: text or a bare number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
}

impl AnswerValue {
    /// Numbers use the same formatting as computed answers.
    #[must_use]
    pub fn to_answer_string(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Number(n) => eval::format_number(*n),
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ItemRepr::deserialize(deserializer)? {
            ItemRepr::Expression(expr) => Item::Expression(expr),
            ItemRepr::Question { question, answer } => Item::Question {
                question,
                answer: answer.to_answer_string(),
            },
        })
    }
}

impl Serialize for Item {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        match self {
            Item::Expression(expr) => serializer.serialize_str(expr),
            Item::Question { question, answer } => {
                let mut st = serializer.serialize_struct("Item", 2)?;
                st.serialize_field("question", question)?;
                st.serialize_field("answer", answer)?;
                st.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrored_expression_recomputes_answer() {
        let item = Item::expression("2-3");
        let plain = item.presented(false);
        let mirrored = item.presented(true);
        assert_eq!(plain.text, "2 - 3");
        assert_eq!(plain.expected, "-1");
        assert_eq!(mirrored.text, "3 - 2");
        assert_eq!(mirrored.expected, "1");
    }

    #[test]
    fn question_ignores_mirror() {
        let item = Item::question("Outs 9, flop to river %", "35");
        assert_eq!(item.presented(true), item.presented(false));
        assert_eq!(item.presented(true).expected, "35");
    }

    #[test]
    fn deserializes_mixed_items() {
        let items: Vec<Item> = serde_json::from_str(
            r#"["2+2", {"question": "4 outs, turn %", "answer": 8.7}, {"question": "odds", "answer": "4:1"}]"#,
        )
        .unwrap();
        assert_eq!(items[0], Item::expression("2+2"));
        assert_eq!(items[1], Item::question("4 outs, turn %", "8.7"));
        assert_eq!(items[2], Item::question("odds", "4:1"));
    }
}
