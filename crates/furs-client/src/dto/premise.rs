//! # Business Premise Registration
//!
//! A premise is either a piece of real estate, identified by its cadastral
//! property id and address, or a mobile location (vehicle, market stall,
//! single device). Every premise must be registered before invoices issued
//! there can be submitted.
//!
//! Closing a premise is irreversible on the server side: once a request with
//! [`ClosingTag::Closed`] has been accepted, the premise id cannot be reused.

use chrono::NaiveDate;
use furs_core::{
    BusinessPremiseId, CharClass, DecimalValidator, NullPolicy, StringNullPolicy,
    StringValidator, TaxNumber, TaxNumberValidator, ValidationError,
};
use serde::Serialize;

use crate::dto::header::FursHeader;

const CADASTRAL_NUMBER: DecimalValidator =
    DecimalValidator::count("CadastralNumber", 4, NullPolicy::Reject);
const BUILDING_NUMBER: DecimalValidator =
    DecimalValidator::count("BuildingNumber", 5, NullPolicy::Reject);
const BUILDING_SECTION_NUMBER: DecimalValidator =
    DecimalValidator::count("BuildingSectionNumber", 4, NullPolicy::Reject);

const fn address_line(field: &'static str, max: usize, nulls: StringNullPolicy) -> StringValidator {
    StringValidator::fixed(field, 1, max, CharClass::Any, nulls)
}

const STREET: StringValidator = address_line("Street", 100, StringNullPolicy::Reject);
const HOUSE_NUMBER: StringValidator = address_line("HouseNumber", 10, StringNullPolicy::Reject);
const HOUSE_NUMBER_ADDITIONAL: StringValidator =
    address_line("HouseNumberAdditional", 10, StringNullPolicy::EmptyToNull);
const COMMUNITY: StringValidator = address_line("Community", 100, StringNullPolicy::Reject);
const CITY: StringValidator = address_line("City", 100, StringNullPolicy::Reject);
const POSTAL_CODE: StringValidator =
    StringValidator::fixed("PostalCode", 4, 4, CharClass::Digits, StringNullPolicy::Reject);

const SUPPLIER_TAX_NUMBER: TaxNumberValidator = TaxNumberValidator::new("TaxNumber", true);
const NAME_FOREIGN: StringValidator = address_line("NameForeign", 1000, StringNullPolicy::Reject);
const SPECIAL_NOTES: StringValidator = address_line("SpecialNotes", 1000, StringNullPolicy::Reject);

/// Cadastral identification of a building section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PropertyId {
    #[serde(rename = "CadastralNumber")]
    cadastral_number: u32,
    #[serde(rename = "BuildingNumber")]
    building_number: u32,
    #[serde(rename = "BuildingSectionNumber")]
    building_section_number: u32,
}

impl PropertyId {
    pub fn new(
        cadastral_number: u32,
        building_number: u32,
        building_section_number: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            cadastral_number: checked(&CADASTRAL_NUMBER, cadastral_number)?,
            building_number: checked(&BUILDING_NUMBER, building_number)?,
            building_section_number: checked(&BUILDING_SECTION_NUMBER, building_section_number)?,
        })
    }

    pub fn cadastral_number(&self) -> u32 {
        self.cadastral_number
    }

    pub fn building_number(&self) -> u32 {
        self.building_number
    }

    pub fn building_section_number(&self) -> u32 {
        self.building_section_number
    }
}

fn checked(validator: &DecimalValidator, value: u32) -> Result<u32, ValidationError> {
    validator.check_integer(i64::from(value))?;
    Ok(value)
}

/// Postal address of a real-estate premise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyAddress {
    #[serde(rename = "Street")]
    street: String,
    #[serde(rename = "HouseNumber")]
    house_number: String,
    #[serde(rename = "HouseNumberAdditional", skip_serializing_if = "Option::is_none")]
    house_number_additional: Option<String>,
    #[serde(rename = "Community")]
    community: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "PostalCode")]
    postal_code: String,
}

impl PropertyAddress {
    pub fn new(
        street: &str,
        house_number: &str,
        community: &str,
        city: &str,
        postal_code: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            street: STREET.require(street)?,
            house_number: HOUSE_NUMBER.require(house_number)?,
            house_number_additional: None,
            community: COMMUNITY.require(community)?,
            city: CITY.require(city)?,
            postal_code: POSTAL_CODE.require(postal_code)?,
        })
    }

    /// Suffix such as the `a` in `12a`. Empty text clears it.
    pub fn try_house_number_additional(mut self, additional: &str) -> Result<Self, ValidationError> {
        self.house_number_additional = HOUSE_NUMBER_ADDITIONAL.normalize(Some(additional))?;
        Ok(self)
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn house_number(&self) -> &str {
        &self.house_number
    }

    pub fn house_number_additional(&self) -> Option<&str> {
        self.house_number_additional.as_deref()
    }

    pub fn community(&self) -> &str {
        &self.community
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

/// A premise located in a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealEstateBp {
    #[serde(rename = "PropertyID")]
    pub property_id: PropertyId,
    #[serde(rename = "Address")]
    pub address: PropertyAddress,
}

/// Kind of a mobile premise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PremiseType {
    /// Vehicle, tent, market stall.
    #[serde(rename = "A")]
    MovableObject,
    /// Fixed object not registered as real estate, e.g. a kiosk.
    #[serde(rename = "B")]
    FixedObject,
    /// A single electronic device used at changing locations.
    #[serde(rename = "C")]
    IndividualDevice,
}

/// Where the premise is: exactly one of the two forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BpIdentifier {
    #[serde(rename = "RealEstateBP")]
    RealEstate(RealEstateBp),
    #[serde(rename = "PremiseType")]
    Mobile(PremiseType),
}

/// Marker for a premise that is being closed for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClosingTag {
    #[serde(rename = "Z")]
    Closed,
}

/// Supplier of the invoicing software: a Slovenian taxpayer or a foreign
/// company identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftwareSupplier {
    #[serde(rename = "TaxNumber", skip_serializing_if = "Option::is_none")]
    tax_number: Option<TaxNumber>,
    #[serde(rename = "NameForeign", skip_serializing_if = "Option::is_none")]
    name_foreign: Option<String>,
}

impl SoftwareSupplier {
    pub fn domestic(tax_number: TaxNumber) -> Self {
        Self {
            tax_number: Some(tax_number),
            name_foreign: None,
        }
    }

    /// Accepts `"12345678"` or `"SI12345678"`.
    pub fn try_domestic(tax_number: &str) -> Result<Self, ValidationError> {
        let tax_number = SUPPLIER_TAX_NUMBER
            .convert_from_string(Some(tax_number))?
            .ok_or(ValidationError::Null { field: "TaxNumber" })?;
        Ok(Self::domestic(tax_number))
    }

    pub fn foreign(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            tax_number: None,
            name_foreign: Some(NAME_FOREIGN.require(name)?),
        })
    }

    pub fn tax_number(&self) -> Option<TaxNumber> {
        self.tax_number
    }

    pub fn name_foreign(&self) -> Option<&str> {
        self.name_foreign.as_deref()
    }
}

/// A business premise registration (or closure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessPremise {
    #[serde(rename = "TaxNumber")]
    tax_number: TaxNumber,
    #[serde(rename = "BusinessPremiseID")]
    business_premise_id: BusinessPremiseId,
    #[serde(rename = "BPIdentifier")]
    bp_identifier: BpIdentifier,
    #[serde(rename = "ValidityDate")]
    validity_date: NaiveDate,
    #[serde(rename = "ClosingTag", skip_serializing_if = "Option::is_none")]
    closing_tag: Option<ClosingTag>,
    #[serde(rename = "SoftwareSupplier", skip_serializing_if = "Vec::is_empty")]
    software_suppliers: Vec<SoftwareSupplier>,
    #[serde(rename = "SpecialNotes", skip_serializing_if = "Option::is_none")]
    special_notes: Option<String>,
}

impl BusinessPremise {
    pub fn new(
        tax_number: TaxNumber,
        business_premise_id: BusinessPremiseId,
        bp_identifier: BpIdentifier,
        validity_date: NaiveDate,
    ) -> Self {
        Self {
            tax_number,
            business_premise_id,
            bp_identifier,
            validity_date,
            closing_tag: None,
            software_suppliers: Vec::new(),
            special_notes: None,
        }
    }

    pub fn with_software_supplier(mut self, supplier: SoftwareSupplier) -> Self {
        self.software_suppliers.push(supplier);
        self
    }

    pub fn try_special_notes(mut self, notes: &str) -> Result<Self, ValidationError> {
        self.special_notes = Some(SPECIAL_NOTES.require(notes)?);
        Ok(self)
    }

    /// Mark the premise as closed. The server treats this as final.
    pub fn closed(mut self) -> Self {
        self.closing_tag = Some(ClosingTag::Closed);
        self
    }

    pub fn tax_number(&self) -> TaxNumber {
        self.tax_number
    }

    pub fn business_premise_id(&self) -> &BusinessPremiseId {
        &self.business_premise_id
    }

    pub fn bp_identifier(&self) -> &BpIdentifier {
        &self.bp_identifier
    }

    pub fn validity_date(&self) -> NaiveDate {
        self.validity_date
    }

    pub fn closing_tag(&self) -> Option<ClosingTag> {
        self.closing_tag
    }

    pub fn software_suppliers(&self) -> &[SoftwareSupplier] {
        &self.software_suppliers
    }

    pub fn special_notes(&self) -> Option<&str> {
        self.special_notes.as_deref()
    }
}

/// The body of a premise registration. A missing header is filled in when
/// the request is prepared for sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessPremiseRequest {
    #[serde(rename = "Header", skip_serializing_if = "Option::is_none")]
    pub header: Option<FursHeader>,
    #[serde(rename = "BusinessPremise")]
    pub business_premise: BusinessPremise,
}

impl BusinessPremiseRequest {
    pub fn new(business_premise: BusinessPremise) -> Self {
        Self {
            header: None,
            business_premise,
        }
    }

    pub fn with_header(mut self, header: FursHeader) -> Self {
        self.header = Some(header);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn validity() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn real_estate() -> BpIdentifier {
        BpIdentifier::RealEstate(RealEstateBp {
            property_id: PropertyId::new(365, 12, 1).unwrap(),
            address: PropertyAddress::new("Dunajska cesta", "21", "Ljubljana", "Ljubljana", "1000")
                .unwrap()
                .try_house_number_additional("a")
                .unwrap(),
        })
    }

    #[test]
    fn real_estate_premise_wire_form() {
        let premise = BusinessPremise::new(
            TaxNumber::new(10_000_000).unwrap(),
            BusinessPremiseId::new("BP1").unwrap(),
            real_estate(),
            validity(),
        )
        .with_software_supplier(SoftwareSupplier::domestic(TaxNumber::new(87_654_321).unwrap()));

        assert_eq!(
            serde_json::to_value(&premise).unwrap(),
            json!({
                "TaxNumber": 10000000,
                "BusinessPremiseID": "BP1",
                "BPIdentifier": {
                    "RealEstateBP": {
                        "PropertyID": {
                            "CadastralNumber": 365,
                            "BuildingNumber": 12,
                            "BuildingSectionNumber": 1
                        },
                        "Address": {
                            "Street": "Dunajska cesta",
                            "HouseNumber": "21",
                            "HouseNumberAdditional": "a",
                            "Community": "Ljubljana",
                            "City": "Ljubljana",
                            "PostalCode": "1000"
                        }
                    }
                },
                "ValidityDate": "2024-01-01",
                "SoftwareSupplier": [{"TaxNumber": 87654321}]
            })
        );
    }

    #[test]
    fn mobile_premise_and_closing_tag() {
        let premise = BusinessPremise::new(
            TaxNumber::new(10_000_000).unwrap(),
            BusinessPremiseId::new("STALL7").unwrap(),
            BpIdentifier::Mobile(PremiseType::MovableObject),
            validity(),
        )
        .closed();

        let value = serde_json::to_value(&premise).unwrap();
        assert_eq!(value["BPIdentifier"], json!({"PremiseType": "A"}));
        assert_eq!(value["ClosingTag"], json!("Z"));
        assert!(value.get("SoftwareSupplier").is_none());
        assert!(value.get("SpecialNotes").is_none());
    }

    #[test]
    fn property_id_bounds() {
        assert!(PropertyId::new(9999, 99_999, 9999).is_ok());
        assert!(matches!(
            PropertyId::new(10_000, 1, 1),
            Err(ValidationError::OutOfRange {
                field: "CadastralNumber",
                ..
            })
        ));
        assert!(matches!(
            PropertyId::new(1, 100_000, 1),
            Err(ValidationError::OutOfRange {
                field: "BuildingNumber",
                ..
            })
        ));
    }

    #[test]
    fn postal_code_is_four_digits() {
        let err = PropertyAddress::new("Ulica", "1", "Maribor", "Maribor", "200").unwrap_err();
        assert!(matches!(err, ValidationError::Length { field: "PostalCode", .. }));
        let err = PropertyAddress::new("Ulica", "1", "Maribor", "Maribor", "2OOO").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCharacter {
                field: "PostalCode",
                ..
            }
        ));
    }

    #[test]
    fn empty_house_number_additional_becomes_absent() {
        let address = PropertyAddress::new("Ulica", "1", "Koper", "Koper", "6000")
            .unwrap()
            .try_house_number_additional("")
            .unwrap();
        assert_eq!(address.house_number_additional(), None);
    }

    #[test]
    fn foreign_supplier_by_name() {
        let supplier = SoftwareSupplier::foreign("Kassensysteme GmbH").unwrap();
        assert_eq!(
            serde_json::to_string(&supplier).unwrap(),
            r#"{"NameForeign":"Kassensysteme GmbH"}"#
        );
        assert!(SoftwareSupplier::foreign("").is_err());
    }

    #[test]
    fn prefixed_supplier_tax_number() {
        let supplier = SoftwareSupplier::try_domestic("SI87654321").unwrap();
        assert_eq!(supplier.tax_number().map(TaxNumber::value), Some(87_654_321));
        assert!(SoftwareSupplier::try_domestic("").is_err());
    }
}
