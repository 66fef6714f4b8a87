//! YAML front matter.

use serde::{Deserialize, Deserializer};

/// Fields read from a document's front matter. All optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_order")]
    pub order: Option<i64>,
    pub slug: Option<String>,
}

impl FrontMatter {
    /// Parse front matter YAML. Empty input yields the default.
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let trimmed = yaml.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(trimmed)
    }
}

/// Accept `order: 3`, `order: 2.5` or `order: "3"`.
#[allow(clippy::cast_possible_truncation)]
fn lenient_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Order {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Order>::deserialize(deserializer)? {
        Some(Order::Int(n)) => Some(n),
        Some(Order::Float(f)) => Some(f.floor() as i64),
        Some(Order::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Split `---` delimited front matter from the body.
///
/// Returns `(yaml, body)`; `yaml` is `None` when the text does not open
/// with a front matter block.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, text)
}
