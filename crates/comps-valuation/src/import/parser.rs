use crate::quality::PropertyCompSet;
use crate::valuation::ComparableSale;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// One row of a comp export. Property columns are optional so the same layout
/// serves single-subject comp lists and whole-corpus dumps.
#[derive(Debug, Deserialize)]
pub(crate) struct CompRow {
    #[serde(default)]
    pub(crate) property_id: Option<String>,
    #[serde(default)]
    property_address: Option<String>,
    #[serde(default)]
    estimated_value: Option<i64>,
    #[serde(default)]
    avg_comp_sale: Option<i64>,
    address: String,
    #[serde(deserialize_with = "deserialize_sale_date")]
    sale_date: NaiveDate,
    sale_price: i64,
    living_area_sqft: u32,
    #[serde(default)]
    price_per_sqft: Option<i64>,
    bedrooms: u8,
    bathrooms: f64,
    distance_miles: f64,
    #[serde(default)]
    year_built: Option<i32>,
}

impl CompRow {
    pub(crate) fn into_sale(self) -> ComparableSale {
        ComparableSale {
            address: self.address,
            sale_date: self.sale_date,
            sale_price: self.sale_price,
            living_area_sqft: self.living_area_sqft,
            reported_price_per_sqft: self.price_per_sqft,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            distance_miles: self.distance_miles,
            year_built: self.year_built,
        }
    }

    /// Starts a new comp set from the property columns of this row.
    pub(crate) fn into_comp_set(mut self, id: String) -> PropertyCompSet {
        let address = self.property_address.take().unwrap_or_default();
        let estimated_value = self.estimated_value;
        let avg_comp_sale = self.avg_comp_sale;
        PropertyCompSet {
            id,
            address,
            estimated_value,
            avg_comp_sale,
            comps: vec![self.into_sale()],
        }
    }
}

pub(crate) fn parse_sale_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn deserialize_sale_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_sale_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "failed to parse sale date '{raw}' (expected YYYY-MM-DD or MM/DD/YY)"
        ))
    })
}

pub(crate) fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}
