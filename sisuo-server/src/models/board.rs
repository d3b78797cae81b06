//! Kanban boards and the components embedded in them
//!
//! Field names follow the persisted document layout (`kanbanId`, `userId`,
//! `componentList`, `compType`, ...), which is also the wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ValidationError;

/// Maximum length for board titles
const MAX_TITLE_LEN: usize = 256;

/// Full board document, including every component in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub kanban_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub component_list: Vec<Component>,
}

/// Board as shown in a list: no component sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub kanban_id: String,
    pub user_id: String,
    pub title: String,
}

/// A positioned, sized element on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub comp_type: String,
    pub id: String,
    pub pos: Position,
    pub rect: Size,
    /// Free-form payload owned by the component type. Replaced wholesale on update.
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Component {
    /// Check the fields the repository relies on for matching.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "component.id" });
        }
        if self.comp_type.trim().is_empty() {
            return Err(ValidationError::Empty { field: "component.compType" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Directed connector between two components of the same board.
///
/// Component ids are not checked against the board; a link to a missing
/// component is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source_id: String,
    pub target_id: String,
    pub start: Anchor,
    pub end: Anchor,
}

/// Attachment point of a link end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    /// Side of the component the link attaches to. The web client sends
    /// compass letters (`n`, `e`, `s`, `w`); any tag is stored unchanged.
    pub direction: String,
}

/// Validated board title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTitle(String);

impl BoardTitle {
    /// Create a new board title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 256 characters
    ///
    /// # Example
    /// ```
    /// use sisuo_server::models::BoardTitle;
    ///
    /// assert!(BoardTitle::new("Sprint 12").is_ok());
    /// assert!(BoardTitle::new("").is_err());
    /// assert!(BoardTitle::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(BoardTitle::new("  Roadmap ").unwrap().as_str(), "Roadmap");
    }

    #[test]
    fn title_max_length() {
        assert!(BoardTitle::new(&"a".repeat(256)).is_ok());
        let err = BoardTitle::new(&"a".repeat(257)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 256, .. }));
    }

    #[test]
    fn component_uses_document_field_names() {
        let comp: Component = serde_json::from_value(json!({
            "compType": "note",
            "id": "c1",
            "pos": { "x": -100.0, "y": 40.5 },
            "rect": { "width": 200.0, "height": 120.0 },
            "data": { "title": "hello", "content": "text" },
            "links": [{
                "sourceId": "c1",
                "targetId": "c2",
                "start": { "x": 0.0, "y": 60.0, "direction": "w" },
                "end": { "x": 200.0, "y": 60.0, "direction": "sideways" }
            }]
        }))
        .unwrap();

        assert_eq!(comp.comp_type, "note");
        assert_eq!(comp.pos, Position { x: -100.0, y: 40.5 });
        assert_eq!(comp.links[0].start.direction, "w");

        let back = serde_json::to_value(&comp).unwrap();
        assert_eq!(back["compType"], "note");
        assert_eq!(back["links"][0]["targetId"], "c2");
        assert_eq!(back["links"][0]["end"]["direction"], "sideways");
    }

    #[test]
    fn component_defaults_data_and_links() {
        let comp: Component = serde_json::from_value(json!({
            "compType": "note",
            "id": "c1",
            "pos": { "x": 0, "y": 0 },
            "rect": { "width": 1, "height": 1 }
        }))
        .unwrap();
        assert!(comp.data.is_empty());
        assert!(comp.links.is_empty());
    }

    #[test]
    fn component_requires_id_and_type() {
        let mut comp: Component = serde_json::from_value(json!({
            "compType": "note",
            "id": "",
            "pos": { "x": 0, "y": 0 },
            "rect": { "width": 1, "height": 1 }
        }))
        .unwrap();
        assert_eq!(
            comp.validate().unwrap_err(),
            ValidationError::Empty { field: "component.id" }
        );
        comp.id = "c1".into();
        comp.comp_type = " ".into();
        assert!(comp.validate().is_err());
    }
}
