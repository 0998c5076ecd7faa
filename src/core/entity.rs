//! Lifecycle status shared by stored records and tab predicates

/// Stored lifecycle status of an RFP
///
/// There is no "completed" status: it is derived from the deadline at
/// query time and never stored.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Open,
    Extended,
    Closed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Extended => "extended",
            Status::Closed => "closed",
        }
    }

    pub fn all() -> &'static [Status] {
        &[Status::Open, Status::Extended, Status::Closed]
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Status::Open),
            "extended" => Ok(Status::Extended),
            "closed" => Ok(Status::Closed),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("Open".parse::<Status>().unwrap(), Status::Open);
        assert_eq!(" EXTENDED ".parse::<Status>().unwrap(), Status::Extended);
        assert!("completed".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Closed).unwrap(), "\"closed\"");
        for status in Status::all() {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), *status);
        }
    }
}
