use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A column of the export. Declaration order is the column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Phone,
    Website,
    ShortAddress,
    LongAddress,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Phone,
        Field::Website,
        Field::ShortAddress,
        Field::LongAddress,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Website => "website",
            Field::ShortAddress => "short_address",
            Field::LongAddress => "long_address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One business listing. Fields that couldn't be extracted are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<Field, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Values in column order, with `""` for absent fields.
    pub fn row(&self) -> impl Iterator<Item = &str> {
        Field::ALL.iter().map(|f| self.get(*f).unwrap_or(""))
    }
}

impl FromIterator<(Field, String)> for Record {
    fn from_iter<I: IntoIterator<Item = (Field, String)>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_fills_missing_fields_in_column_order() {
        let mut record = Record::new();
        record.insert(Field::ShortAddress, "Kraków");
        record.insert(Field::Name, "Tartak Nowak");

        let row: Vec<_> = record.row().collect();
        assert_eq!(row, vec!["Tartak Nowak", "", "", "Kraków", ""]);
    }

    #[test]
    fn serializes_as_object_in_column_order() {
        let record: Record = [
            (Field::LongAddress, "ul. Leśna 5".to_string()),
            (Field::Name, "Tartak".to_string()),
            (Field::Phone, "12 345 67 89".to_string()),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Tartak","phone":"12 345 67 89","long_address":"ul. Leśna 5"}"#
        );
    }
}
