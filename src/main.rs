// mirath-rx/src/main.rs
//
// Non-interactive walkthrough of the prescription workflow: a physician
// generates keys and signs a prescription's canonical form, a pharmacist
// verifies it, and the usual tamper cases are demonstrated.

use mirath_rx::crypto::{keygen, sign, verify};
use mirath_rx::params::{MirathI, MirathParams};
use mirath_rx::prescription::{
    parse_canonical, parse_medication_record, Medication, Prescription, FIELD_MEDICATION,
};

fn sample_prescription() -> Prescription {
    Prescription {
        patient_name: "Dupont".to_string(),
        patient_given_name: "Jean".to_string(),
        patient_id: "PAT-1984-0042".to_string(),
        prescriber_name: "Moreau".to_string(),
        prescriber_given_name: "Claire".to_string(),
        prescriber_id: "RPPS-10101".to_string(),
        date_issued: "2025-11-03".to_string(),
        medications: vec![
            Medication {
                name: "Amoxicilline".to_string(),
                dosage: "500mg".to_string(),
                schedule: "3x/day for 7 days".to_string(),
                quantity: 21,
            },
            Medication {
                name: "Paracetamol".to_string(),
                dosage: "1g".to_string(),
                schedule: "on pain, max 3x/day".to_string(),
                quantity: 12,
            },
        ],
    }
}

fn main() {
    println!("=== MIRATH-RX PRESCRIPTION AUTHENTICATION ===");
    println!(
        "Parameter set {} (tag {:#04x}): PK {}B, SK {}B, signature {}B",
        MirathI::NAME,
        MirathI::TAG,
        MirathI::PK_BYTES,
        MirathI::SK_BYTES,
        MirathI::SIG_BYTES
    );

    // --- Physician side ---
    println!("\n[PHYSICIAN] Generating keypair...");
    let (pk, sk) = keygen(MirathI::TAG).expect("keygen failed");
    println!("[PHYSICIAN] ✓ Public key:  {}...", &hex::encode(&pk)[..32]);

    let prescription = sample_prescription();
    let message = prescription
        .canonicalize()
        .expect("prescription is complete");
    println!(
        "[PHYSICIAN] Canonical form: {} bytes for {} medication(s)",
        message.len(),
        prescription.medications.len()
    );

    let signature = sign(&sk, &message).expect("signing failed");
    println!(
        "[PHYSICIAN] ✓ Signature: {} bytes, {}...",
        signature.len(),
        &hex::encode(&signature)[..32]
    );

    // --- Pharmacist side ---
    println!("\n[PHARMACIST] Checking authenticity...");
    let received = prescription.canonicalize().expect("prescription is complete");
    if verify(&pk, &received, &signature) {
        println!("[PHARMACIST] ✓ Signature valid, dispensing:");
        let fields = parse_canonical(&received).expect("canonical form parses");
        for (id, value) in &fields {
            if *id == FIELD_MEDICATION {
                let segments = parse_medication_record(value).expect("record parses");
                println!(
                    "[PHARMACIST]   - {} {} ({}), qty {}",
                    segments[0], segments[1], segments[2], segments[3]
                );
            }
        }
    } else {
        println!("[PHARMACIST] ✗ Signature INVALID (unexpected)");
    }

    // --- Tamper demonstrations ---
    println!("\n[TAMPER] Altered dosage...");
    let mut altered = sample_prescription();
    altered.medications[0].dosage = "5000mg".to_string();
    let altered_message = altered.canonicalize().expect("prescription is complete");
    let accepted = verify(&pk, &altered_message, &signature);
    println!(
        "[TAMPER] {} altered prescription",
        if accepted { "✗ ACCEPTED" } else { "✓ rejected" }
    );

    println!("[TAMPER] Flipped signature bit...");
    let mut mauled = signature.clone();
    let mid = mauled.len() / 2;
    mauled[mid] ^= 0x01;
    let accepted = verify(&pk, &message, &mauled);
    println!(
        "[TAMPER] {} mauled signature",
        if accepted { "✗ ACCEPTED" } else { "✓ rejected" }
    );

    println!("[TAMPER] Foreign key...");
    let (other_pk, _) = keygen(MirathI::TAG).expect("keygen failed");
    let accepted = verify(&other_pk, &message, &signature);
    println!(
        "[TAMPER] {} signature under a different physician's key",
        if accepted { "✗ ACCEPTED" } else { "✓ rejected" }
    );

    println!("\n=== DONE ===");
}
