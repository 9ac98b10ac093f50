/*
This file is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT

NOTE: Structures and functions for handling the Shapefile attribute table info
contained with the associated .dbf file.
*/
use std::fmt;

#[derive(Debug, Default, Clone)]
pub struct AttributeHeader {
    pub version: u8,
    pub year: u32,
    pub month: u8,
    pub day: u8,
    pub num_records: u32,
    pub num_fields: u32, // not actually stored in file but derived
    pub bytes_in_header: u16,
    pub bytes_in_record: u16,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DateData {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for DateData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Int(i32),
    Real(f64),
    Text(String),
    Date(DateData),
    Bool(bool),
    Null,
}

impl FieldData {
    pub fn get_as_string(&self) -> String {
        match self {
            FieldData::Int(v) => v.to_string(),
            FieldData::Real(v) => v.to_string(),
            FieldData::Text(v) => v.clone(),
            FieldData::Date(v) => v.to_string(),
            FieldData::Bool(v) => v.to_string(),
            FieldData::Null => String::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FieldDataType {
    Int,
    Real,
    Text,
    Date,
    Bool,
}

impl FieldDataType {
    pub fn to_char(&self) -> char {
        match self {
            FieldDataType::Int | FieldDataType::Real => 'N',
            FieldDataType::Text => 'C',
            FieldDataType::Date => 'D',
            FieldDataType::Bool => 'L',
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeField {
    pub name: String,
    pub field_type: char,
    pub field_length: u8,
    pub decimal_count: u8,
}

impl AttributeField {
    pub fn new<'a>(
        name: &'a str,
        field_type: FieldDataType,
        field_length: u8,
        decimal_count: u8,
    ) -> AttributeField {
        AttributeField {
            name: name.to_string(),
            field_type: field_type.to_char(),
            field_length,
            decimal_count,
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct ShapefileAttributes {
    pub header: AttributeHeader,
    pub fields: Vec<AttributeField>,
    data: Vec<Vec<FieldData>>,
    pub is_deleted: Vec<bool>,
}

impl ShapefileAttributes {
    pub fn add_field(&mut self, field: &AttributeField) {
        self.fields.push(field.clone());
        self.header.num_fields = self.fields.len() as u32;
        for rec in self.data.iter_mut() {
            rec.push(FieldData::Null);
        }
    }

    /// Adds a record. Short records are padded with nulls.
    pub fn add_record(&mut self, mut rec: Vec<FieldData>, deleted: bool) {
        rec.resize(self.fields.len().max(rec.len()), FieldData::Null);
        self.data.push(rec);
        self.is_deleted.push(deleted);
        self.header.num_records = self.data.len() as u32;
    }

    pub fn get_num_records(&self) -> usize {
        self.data.len()
    }

    pub fn get_record(&self, index: usize) -> Option<&Vec<FieldData>> {
        self.data.get(index)
    }

    /// Returns the value of a named field, or `FieldData::Null` when either
    /// the field or the record does not exist.
    pub fn get_value(&self, record_index: usize, field_name: &str) -> FieldData {
        match self.get_field_num(field_name) {
            Some(j) => self
                .data
                .get(record_index)
                .and_then(|rec| rec.get(j))
                .cloned()
                .unwrap_or(FieldData::Null),
            None => FieldData::Null,
        }
    }

    /// Field names are matched case-insensitively, as dBase stores them
    /// upper-cased by some writers.
    pub fn get_field_num(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn is_field_numeric(&self, index: usize) -> bool {
        match self.fields.get(index) {
            Some(field) => matches!(field.field_type, 'N' | 'F' | 'I' | 'O'),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AttributeField, FieldData, FieldDataType, ShapefileAttributes};

    #[test]
    fn test_named_field_lookup() {
        let mut atts = ShapefileAttributes::default();
        atts.add_field(&AttributeField::new("FID", FieldDataType::Int, 7u8, 0u8));
        atts.add_record(vec![FieldData::Int(1)], false);
        atts.add_field(&AttributeField::new("Name", FieldDataType::Text, 50u8, 0u8));
        atts.add_record(vec![FieldData::Int(2), FieldData::Text("tile_07".to_string())], false);

        assert_eq!(atts.get_num_records(), 2);
        assert_eq!(atts.header.num_fields, 2);
        assert_eq!(atts.get_value(0, "Name"), FieldData::Null);
        assert_eq!(atts.get_value(1, "NAME"), FieldData::Text("tile_07".to_string()));
        assert_eq!(atts.get_value(5, "Name"), FieldData::Null);
        assert_eq!(atts.get_value(1, "missing"), FieldData::Null);
        assert!(atts.is_field_numeric(0));
        assert!(!atts.is_field_numeric(1));
        assert_eq!(atts.get_value(1, "fid").get_as_string(), "2");
    }
}
