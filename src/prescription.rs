// mirath-rx/src/prescription.rs
//
// The message actually signed is never the display form: it is the
// canonical byte string below, so two semantically equal prescriptions sign
// and verify interchangeably.
//
// Canonical form: "MIRATH-RX-v1\0" header, then per field
// field_id(1) || len(4, LE) || utf8 value. Scalar fields are emitted in id
// order; medication records are nested length-prefixed tuples sorted by
// their encoded bytes, so insertion order cannot leak into the signature.

use std::error::Error;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const CANONICAL_HEADER: &[u8] = b"MIRATH-RX-v1\x00";

pub const FIELD_PATIENT_NAME: u8 = 0x01;
pub const FIELD_PATIENT_GIVEN_NAME: u8 = 0x02;
pub const FIELD_PATIENT_ID: u8 = 0x03;
pub const FIELD_PRESCRIBER_NAME: u8 = 0x04;
pub const FIELD_PRESCRIBER_GIVEN_NAME: u8 = 0x05;
pub const FIELD_PRESCRIBER_ID: u8 = 0x06;
pub const FIELD_DATE_ISSUED: u8 = 0x07;
pub const FIELD_MEDICATION: u8 = 0x08;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    MissingField(&'static str),
    UnknownFieldId(u8),
    Truncated,
}

impl fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CanonicalError::MissingField(name) => write!(f, "missing required field: {}", name),
            CanonicalError::UnknownFieldId(id) => write!(f, "unknown field id: {:#04x}", id),
            CanonicalError::Truncated => write!(f, "canonical form is truncated"),
        }
    }
}

impl Error for CanonicalError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub schedule: String,
    pub quantity: u32, // number of units dispensed
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prescription {
    pub patient_name: String,
    pub patient_given_name: String,
    pub patient_id: String,
    pub prescriber_name: String,
    pub prescriber_given_name: String,
    pub prescriber_id: String,
    pub date_issued: String, // ISO-8601
    pub medications: Vec<Medication>,
}

fn normalized(value: &str) -> String {
    value.nfc().collect()
}

fn push_field(out: &mut Vec<u8>, id: u8, value: &[u8]) {
    out.push(id);
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
}

fn push_scalar(
    out: &mut Vec<u8>,
    id: u8,
    value: &str,
    label: &'static str,
) -> Result<(), CanonicalError> {
    if value.trim().is_empty() {
        return Err(CanonicalError::MissingField(label));
    }
    push_field(out, id, normalized(value).as_bytes());
    Ok(())
}

fn push_segment(out: &mut Vec<u8>, value: &str) {
    let bytes = normalized(value).into_bytes();
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&bytes);
}

fn encode_medication(med: &Medication) -> Result<Vec<u8>, CanonicalError> {
    if med.name.trim().is_empty() {
        return Err(CanonicalError::MissingField("medication name"));
    }
    if med.dosage.trim().is_empty() {
        return Err(CanonicalError::MissingField("medication dosage"));
    }
    if med.schedule.trim().is_empty() {
        return Err(CanonicalError::MissingField("medication schedule"));
    }
    let mut record = Vec::new();
    push_segment(&mut record, &med.name);
    push_segment(&mut record, &med.dosage);
    push_segment(&mut record, &med.schedule);
    // Decimal, no leading zeros by construction
    push_segment(&mut record, &med.quantity.to_string());
    Ok(record)
}

impl Prescription {
    // Pure function: equal-under-normalization inputs produce byte-equal
    // output.
    pub fn canonicalize(&self) -> Result<Vec<u8>, CanonicalError> {
        let mut out = CANONICAL_HEADER.to_vec();
        push_scalar(&mut out, FIELD_PATIENT_NAME, &self.patient_name, "patient family name")?;
        push_scalar(
            &mut out,
            FIELD_PATIENT_GIVEN_NAME,
            &self.patient_given_name,
            "patient given name",
        )?;
        push_scalar(&mut out, FIELD_PATIENT_ID, &self.patient_id, "patient id")?;
        push_scalar(
            &mut out,
            FIELD_PRESCRIBER_NAME,
            &self.prescriber_name,
            "prescriber family name",
        )?;
        push_scalar(
            &mut out,
            FIELD_PRESCRIBER_GIVEN_NAME,
            &self.prescriber_given_name,
            "prescriber given name",
        )?;
        push_scalar(&mut out, FIELD_PRESCRIBER_ID, &self.prescriber_id, "prescriber id")?;
        push_scalar(&mut out, FIELD_DATE_ISSUED, &self.date_issued, "issue date")?;

        let mut records = self
            .medications
            .iter()
            .map(encode_medication)
            .collect::<Result<Vec<_>, _>>()?;
        records.sort();
        for record in &records {
            push_field(&mut out, FIELD_MEDICATION, record);
        }
        Ok(out)
    }
}

// Splits a canonical byte string back into (field_id, value) pairs.
// Unknown ids and truncated records are rejected; the pharmacist-side
// display runs on this.
pub fn parse_canonical(bytes: &[u8]) -> Result<Vec<(u8, Vec<u8>)>, CanonicalError> {
    let body = bytes
        .strip_prefix(CANONICAL_HEADER)
        .ok_or(CanonicalError::Truncated)?;
    let mut fields = Vec::new();
    let mut cursor = 0;
    while cursor < body.len() {
        let id = body[cursor];
        if !(FIELD_PATIENT_NAME..=FIELD_MEDICATION).contains(&id) {
            return Err(CanonicalError::UnknownFieldId(id));
        }
        if cursor + 5 > body.len() {
            return Err(CanonicalError::Truncated);
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&body[cursor + 1..cursor + 5]);
        let len = u32::from_le_bytes(len_bytes) as usize;
        if cursor + 5 + len > body.len() {
            return Err(CanonicalError::Truncated);
        }
        fields.push((id, body[cursor + 5..cursor + 5 + len].to_vec()));
        cursor += 5 + len;
    }
    Ok(fields)
}

// Splits a medication record back into its four segments.
pub fn parse_medication_record(record: &[u8]) -> Result<Vec<String>, CanonicalError> {
    let mut segments = Vec::with_capacity(4);
    let mut cursor = 0;
    while cursor < record.len() {
        if cursor + 4 > record.len() {
            return Err(CanonicalError::Truncated);
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&record[cursor..cursor + 4]);
        let len = u32::from_le_bytes(len_bytes) as usize;
        if cursor + 4 + len > record.len() {
            return Err(CanonicalError::Truncated);
        }
        let segment = String::from_utf8(record[cursor + 4..cursor + 4 + len].to_vec())
            .map_err(|_| CanonicalError::Truncated)?;
        segments.push(segment);
        cursor += 4 + len;
    }
    if segments.len() != 4 {
        return Err(CanonicalError::Truncated);
    }
    Ok(segments)
}
