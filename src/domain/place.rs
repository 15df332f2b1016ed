use serde::{Deserialize, Serialize};

use super::PhoneQuery;

/// Placeholder written into every field when a lookup yields nothing usable.
pub const NO_RESULT: &str = "검색결과없음";

pub const PLACE_COLUMNS: [&str; 5] = [
    "searchedPhoneNumber",
    "name",
    "tel",
    "category",
    "roadAddress",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCandidate {
    pub searched_phone_number: String,
    pub name: String,
    pub tel: String,
    pub category: Vec<String>,
    pub road_address: String,
}

impl PlaceCandidate {
    pub fn no_result(phone: &PhoneQuery) -> Self {
        PlaceCandidate {
            searched_phone_number: phone.to_string(),
            name: NO_RESULT.to_string(),
            tel: NO_RESULT.to_string(),
            category: vec![NO_RESULT.to_string()],
            road_address: NO_RESULT.to_string(),
        }
    }

    pub fn is_no_result(&self) -> bool {
        self.name == NO_RESULT
            && self.tel == NO_RESULT
            && self.road_address == NO_RESULT
            && self.category_display() == NO_RESULT
    }

    pub fn category_display(&self) -> String {
        self.category.join(", ")
    }

    pub fn row(&self) -> Vec<String> {
        vec![
            self.searched_phone_number.clone(),
            self.name.clone(),
            self.tel.clone(),
            self.category_display(),
            self.road_address.clone(),
        ]
    }
}

/// Wire shape of the map service response:
/// `{ result: { place: { list: [ {name, tel, category, roadAddress} ] } } }`.
/// Every level is optional so partial envelopes decode instead of failing.
#[derive(Debug, Deserialize, Default)]
pub struct PlaceEnvelope {
    #[serde(default)]
    pub result: Option<PlaceResult>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PlaceResult {
    #[serde(default)]
    pub place: Option<PlaceSection>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PlaceSection {
    #[serde(default)]
    pub list: Option<Vec<PlaceItem>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaceItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub road_address: Option<String>,
}

impl PlaceEnvelope {
    pub fn into_items(self) -> Vec<PlaceItem> {
        self.result
            .and_then(|r| r.place)
            .and_then(|p| p.list)
            .unwrap_or_default()
    }
}

impl PlaceItem {
    pub fn into_candidate(self, phone: &PhoneQuery) -> PlaceCandidate {
        PlaceCandidate {
            searched_phone_number: phone.to_string(),
            name: self.name.unwrap_or_default(),
            tel: self.tel.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            road_address: self.road_address.unwrap_or_default(),
        }
    }
}
