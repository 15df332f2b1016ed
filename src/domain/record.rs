use serde::Serialize;

use super::{
    CanonicalName, RegistryMatch, RegistryRecord, BUSINESS_REGISTRATION_NUMBER, REGISTRY_FIELDS,
};

const PHONE_COLUMN: &str = "searchedPhoneNumber";
const NAME_COLUMN: &str = "name";
const LABEL_COLUMN: &str = "listingLabel";

/// One output row: a canonical name joined with the registry facts found for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecord {
    pub searched_phone_number: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_label: Option<String>,
    pub registry: RegistryRecord,
}

/// Column layout of the final export. The listing label column only exists
/// when more than one registry candidate is kept per name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordLayout {
    BestMatch,
    TopCandidates,
}

impl RecordLayout {
    pub fn for_candidates(max_candidates: usize) -> Self {
        match max_candidates > 1 {
            true => RecordLayout::TopCandidates,
            false => RecordLayout::BestMatch,
        }
    }

    /// Keys first, then the registration number, then the rest of the
    /// registry schema in declared order.
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec![PHONE_COLUMN, NAME_COLUMN];
        if *self == RecordLayout::TopCandidates {
            headers.push(LABEL_COLUMN);
        }
        headers.push(BUSINESS_REGISTRATION_NUMBER);
        headers.extend(
            REGISTRY_FIELDS
                .iter()
                .filter(|label| **label != BUSINESS_REGISTRATION_NUMBER),
        );
        headers
    }
}

impl ResolvedRecord {
    pub fn row(&self, layout: RecordLayout) -> Vec<String> {
        let mut row = vec![self.searched_phone_number.clone(), self.name.clone()];
        if layout == RecordLayout::TopCandidates {
            row.push(self.listing_label.clone().unwrap_or_default());
        }
        row.push(self.registry.business_registration_number.clone());
        row.extend(
            self.registry
                .fields()
                .into_iter()
                .filter(|(label, _)| *label != BUSINESS_REGISTRATION_NUMBER)
                .map(|(_, value)| value.to_string()),
        );
        row
    }
}

/// Joins canonical names with their registry matches position by position.
///
/// A name without matches still produces one row with an all-empty registry
/// record, so every phone number keeps at least one row.
pub fn aggregate(
    canonical_names: &[CanonicalName],
    registry_matches: &[Vec<RegistryMatch>],
    layout: RecordLayout,
) -> Vec<ResolvedRecord> {
    let mut records = vec![];

    for (i, canonical) in canonical_names.iter().enumerate() {
        let matches = registry_matches.get(i).map(Vec::as_slice).unwrap_or(&[]);

        if matches.is_empty() {
            records.push(ResolvedRecord {
                searched_phone_number: canonical.searched_phone_number.clone(),
                name: canonical.name.clone(),
                listing_label: match layout {
                    RecordLayout::TopCandidates => Some(String::new()),
                    RecordLayout::BestMatch => None,
                },
                registry: RegistryRecord::empty(),
            });
            continue;
        }

        for registry_match in matches {
            records.push(ResolvedRecord {
                searched_phone_number: canonical.searched_phone_number.clone(),
                name: canonical.name.clone(),
                listing_label: match layout {
                    RecordLayout::TopCandidates => Some(registry_match.label.clone()),
                    RecordLayout::BestMatch => None,
                },
                registry: registry_match.record.clone(),
            });
        }
    }

    records
}
