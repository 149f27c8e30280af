use crate::model::LOADING_VALUE;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RepoType,
    Owner,
    Repository,
    Branch,
    RepoToken,
    DatasetId,
    DataverseToken,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::RepoType => "Repository type",
            Field::Owner => "Owner",
            Field::Repository => "Repository",
            Field::Branch => "Branch",
            Field::RepoToken => "Repository token",
            Field::DatasetId => "Dataset DOI",
            Field::DataverseToken => "Dataverse token",
        }
    }

    /// Dropdown-backed fields hold the pending sentinel until a lookup lands.
    fn rejects_loading_sentinel(self) -> bool {
        matches!(self, Field::Branch | Field::DatasetId)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct MissingFields {
    pub fields: Vec<Field>,
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("One or more mandatory fields are missing:")?;
        for field in &self.fields {
            write!(f, "\n- {}", field.label())?;
        }
        Ok(())
    }
}

pub fn is_missing(value: Option<&str>, field: Field, placeholders: &[&str]) -> bool {
    match value {
        None | Some("") => true,
        Some(LOADING_VALUE) if field.rejects_loading_sentinel() => true,
        Some(v) => placeholders.contains(&v),
    }
}

/// Checks every field and reports all missing ones at once, in input order.
pub fn check_fields(
    fields: &[(Option<&str>, Field)],
    placeholders: &[&str],
) -> Result<(), MissingFields> {
    let missing: Vec<Field> = fields
        .iter()
        .filter(|(value, field)| is_missing(*value, *field, placeholders))
        .map(|(_, field)| *field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingFields { fields: missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GITHUB_PLACEHOLDER;

    const PLACEHOLDERS: &[&str] = &[GITHUB_PLACEHOLDER];

    fn complete() -> Vec<(Option<&'static str>, Field)> {
        vec![
            (Some("github"), Field::RepoType),
            (Some("acme"), Field::Owner),
            (Some("widgets"), Field::Repository),
            (Some("main"), Field::Branch),
            (Some("ghp_x"), Field::RepoToken),
            (Some("doi:10.1/ABC"), Field::DatasetId),
            (Some("dv_x"), Field::DataverseToken),
        ]
    }

    #[test]
    fn all_present_is_valid() {
        assert_eq!(check_fields(&complete(), PLACEHOLDERS), Ok(()));
    }

    #[test]
    fn loading_counts_as_missing_only_for_dropdown_fields() {
        assert!(is_missing(Some("loading"), Field::Branch, PLACEHOLDERS));
        assert!(is_missing(Some("loading"), Field::DatasetId, PLACEHOLDERS));
        assert!(!is_missing(Some("loading"), Field::Owner, PLACEHOLDERS));
        assert!(!is_missing(Some("loading"), Field::RepoToken, PLACEHOLDERS));
        assert!(!is_missing(Some("loading"), Field::Repository, PLACEHOLDERS));
    }

    #[test]
    fn placeholder_counts_as_missing_for_any_field() {
        assert!(is_missing(Some(GITHUB_PLACEHOLDER), Field::Owner, PLACEHOLDERS));
        assert!(is_missing(Some(GITHUB_PLACEHOLDER), Field::DataverseToken, PLACEHOLDERS));
    }

    #[test]
    fn aggregates_every_missing_field_in_order() {
        let mut fields = complete();
        fields[1].0 = None;
        fields[3].0 = Some("loading");
        fields[6].0 = Some("");

        let err = check_fields(&fields, PLACEHOLDERS).unwrap_err();
        assert_eq!(err.fields, vec![Field::Owner, Field::Branch, Field::DataverseToken]);
        assert_eq!(
            err.to_string(),
            "One or more mandatory fields are missing:\n- Owner\n- Branch\n- Dataverse token"
        );
    }

    #[test]
    fn everything_missing() {
        let fields: Vec<_> = complete().into_iter().map(|(_, f)| (None, f)).collect();
        let err = check_fields(&fields, PLACEHOLDERS).unwrap_err();
        assert_eq!(err.fields.len(), 7);
    }
}
