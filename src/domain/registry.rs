use std::collections::HashMap;

use serde::Serialize;

/// Row labels of the registry detail table, in schema order.
pub const REGISTRY_FIELDS: [&str; 16] = [
    "회사명(영문)",
    "업태",
    "종목",
    "주요제품",
    "전화번호",
    "팩스번호",
    "기업규모",
    "법인구분",
    "본사/지사",
    "법인형태",
    "설립일",
    "홈페이지",
    "대표자명",
    "사업자등록번호",
    "법인등록번호",
    "회사주소",
];

pub const BUSINESS_REGISTRATION_NUMBER: &str = "사업자등록번호";

/// Registration facts for one business. The field set is closed: labels
/// missing from the source table are kept as empty strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RegistryRecord {
    #[serde(rename = "회사명(영문)")]
    pub company_name_en: String,
    #[serde(rename = "업태")]
    pub business_type: String,
    #[serde(rename = "종목")]
    pub line_of_item: String,
    #[serde(rename = "주요제품")]
    pub main_products: String,
    #[serde(rename = "전화번호")]
    pub phone: String,
    #[serde(rename = "팩스번호")]
    pub fax: String,
    #[serde(rename = "기업규모")]
    pub company_size: String,
    #[serde(rename = "법인구분")]
    pub corporation_type: String,
    #[serde(rename = "본사/지사")]
    pub office_type: String,
    #[serde(rename = "법인형태")]
    pub corporate_form: String,
    #[serde(rename = "설립일")]
    pub founded_on: String,
    #[serde(rename = "홈페이지")]
    pub homepage: String,
    #[serde(rename = "대표자명")]
    pub representative: String,
    #[serde(rename = "사업자등록번호")]
    pub business_registration_number: String,
    #[serde(rename = "법인등록번호")]
    pub corporate_registration_number: String,
    #[serde(rename = "회사주소")]
    pub address: String,
}

impl RegistryRecord {
    pub fn empty() -> Self {
        RegistryRecord::default()
    }

    /// Builds a record from a label/value table. Unknown labels are ignored.
    pub fn from_table(table: &HashMap<String, String>) -> Self {
        let mut record = RegistryRecord::empty();
        for label in REGISTRY_FIELDS {
            if let (Some(value), Some(slot)) = (table.get(label), record.field_mut(label)) {
                *slot = value.clone();
            }
        }
        record
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_empty())
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(l, _)| *l == label)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> [(&'static str, &str); 16] {
        [
            (REGISTRY_FIELDS[0], self.company_name_en.as_str()),
            (REGISTRY_FIELDS[1], self.business_type.as_str()),
            (REGISTRY_FIELDS[2], self.line_of_item.as_str()),
            (REGISTRY_FIELDS[3], self.main_products.as_str()),
            (REGISTRY_FIELDS[4], self.phone.as_str()),
            (REGISTRY_FIELDS[5], self.fax.as_str()),
            (REGISTRY_FIELDS[6], self.company_size.as_str()),
            (REGISTRY_FIELDS[7], self.corporation_type.as_str()),
            (REGISTRY_FIELDS[8], self.office_type.as_str()),
            (REGISTRY_FIELDS[9], self.corporate_form.as_str()),
            (REGISTRY_FIELDS[10], self.founded_on.as_str()),
            (REGISTRY_FIELDS[11], self.homepage.as_str()),
            (REGISTRY_FIELDS[12], self.representative.as_str()),
            (REGISTRY_FIELDS[13], self.business_registration_number.as_str()),
            (REGISTRY_FIELDS[14], self.corporate_registration_number.as_str()),
            (REGISTRY_FIELDS[15], self.address.as_str()),
        ]
    }

    fn field_mut(&mut self, label: &str) -> Option<&mut String> {
        let slot = match label {
            "회사명(영문)" => &mut self.company_name_en,
            "업태" => &mut self.business_type,
            "종목" => &mut self.line_of_item,
            "주요제품" => &mut self.main_products,
            "전화번호" => &mut self.phone,
            "팩스번호" => &mut self.fax,
            "기업규모" => &mut self.company_size,
            "법인구분" => &mut self.corporation_type,
            "본사/지사" => &mut self.office_type,
            "법인형태" => &mut self.corporate_form,
            "설립일" => &mut self.founded_on,
            "홈페이지" => &mut self.homepage,
            "대표자명" => &mut self.representative,
            "사업자등록번호" => &mut self.business_registration_number,
            "법인등록번호" => &mut self.corporate_registration_number,
            "회사주소" => &mut self.address,
            _ => return None,
        };
        Some(slot)
    }
}

/// A registry entry accepted for a canonical name, tagged with the title it
/// was listed under and the score that selected it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryMatch {
    pub label: String,
    pub score: f64,
    pub record: RegistryRecord,
}
