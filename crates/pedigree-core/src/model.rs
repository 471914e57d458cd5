use serde::{Deserialize, Deserializer, Serialize};

/// Biological sex as recorded in the dataset. Drives the canonical ordering
/// inside a couple and the presentation layer's default-avatar choice; the
/// layout itself never branches on it beyond couple ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Lenient token parsing: datasets in the wild carry `M`/`F`, full words,
    /// and mixed case. Anything else is treated as unspecified.
    pub fn from_token(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Some(Self::Male),
            "F" | "FEMALE" => Some(Self::Female),
            _ => None,
        }
    }
}

fn lenient_sex<'de, D>(deserializer: D) -> Result<Option<Sex>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Sex::from_token))
}

/// One person record, immutable for the duration of a layout run.
///
/// Wire names are camelCase (the shape of `family.json`). Relation fields hold
/// raw id references; resolution against the dataset happens in
/// [`crate::graph::PersonGraph`], and a reference to a missing id is tolerated
/// there rather than rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Date of birth in a sortable lexical format (ISO `YYYY-MM-DD`).
    #[serde(default)]
    pub dob: Option<String>,
    /// Date of death, same format as `dob`.
    #[serde(default)]
    pub dod: Option<String>,
    #[serde(default, deserialize_with = "lenient_sex")]
    pub sex: Option<Sex>,
    /// At most one concurrent spouse. The pointer need not be symmetric in the
    /// raw data; see [`crate::couple::CoupleSet::resolve`].
    #[serde(default)]
    pub spouse: Option<String>,
    /// 0-2 parent references.
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,

    // Presentation-only attributes, opaque to the core and re-emitted as-is.
    #[serde(default)]
    pub married: bool,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => self.id.clone(),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (false, false) => format!("{} {}", self.first_name, self.last_name),
        }
    }
}
