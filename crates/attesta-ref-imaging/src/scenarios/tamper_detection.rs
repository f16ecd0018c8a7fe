//! Scenario 2: Tamper Detection
//!
//! Shows that any edit to a finalized proof is caught and localized.  The
//! proof from Scenario 1 is verified untouched, then three tampered copies
//! are verified: a flipped attribute hash, an edited prompt, and a rewritten
//! step hash.

use attesta_contracts::{error::AttestaResult, proof::Proof, verify::VerificationReport};
use attesta_verify::ProofVerifier;

use super::two_event_session::record_session;

/// A named mutation applied to a copy of a proof.
pub struct Tampering {
    pub description: &'static str,
    pub apply: fn(&mut Proof),
}

/// Replace the first hex character of `digest` with a different one.
pub fn flip_first_char(digest: &str) -> String {
    let replacement = if digest.starts_with('0') { '1' } else { '0' };
    digest
        .chars()
        .enumerate()
        .map(|(i, c)| if i == 0 { replacement } else { c })
        .collect()
}

/// The tamperings demonstrated by this scenario.
pub fn tamperings() -> Vec<Tampering> {
    vec![
        Tampering {
            description: "flip one character of v2's prompt hash",
            apply: |proof| {
                if let Some(hash) = proof.snapshots[1].attribute_hashes.get_mut("prompt") {
                    *hash = flip_first_char(hash);
                }
            },
        },
        Tampering {
            description: "edit v1's recorded prompt text",
            apply: |proof| proof.snapshots[0].prompt.push_str(" (edited)"),
        },
        Tampering {
            description: "rewrite v1's step hash",
            apply: |proof| {
                let step = flip_first_char(&proof.snapshots[0].step_hash);
                proof.snapshots[0].step_hash = step;
            },
        },
    ]
}

fn print_report(report: &VerificationReport) {
    if report.ok {
        println!("    result: VERIFIED");
        return;
    }
    println!("    result: FAILED ({} mismatch(es))", report.mismatches.len());
    for mismatch in &report.mismatches {
        println!("      - {}", mismatch.scope);
        println!("          expected {}", mismatch.expected);
        println!("          actual   {}", mismatch.actual);
    }
}

/// Run Scenario 2: Tamper Detection.
pub fn run_scenario() -> AttestaResult<()> {
    println!("=== Scenario 2: Tamper Detection ===");
    println!();

    let proof = record_session()?;
    let verifier = ProofVerifier::new();

    println!("  Untouched proof ({} snapshots)", proof.snapshots.len());
    print_report(&verifier.verify(&proof)?);
    println!();

    for tampering in tamperings() {
        let mut copy = proof.clone();
        (tampering.apply)(&mut copy);

        println!("  Tampering: {}", tampering.description);
        print_report(&verifier.verify(&copy)?);
        println!();
    }

    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use attesta_contracts::verify::DiscrepancyScope;

    use super::*;

    #[test]
    fn test_flip_first_char_changes_one_char() {
        assert_eq!(flip_first_char("abc"), "0bc");
        assert_eq!(flip_first_char("0bc"), "1bc");
    }

    /// A flipped attribute hash is reported for that snapshot and attribute,
    /// and nothing outside that snapshot is flagged.
    #[test]
    fn test_flipped_attribute_hash_is_localized() {
        let mut proof = record_session().unwrap();
        (tamperings()[0].apply)(&mut proof);

        let report = ProofVerifier::new().verify(&proof).unwrap();

        assert!(!report.ok);
        assert_eq!(
            report.mismatches[0].scope,
            DiscrepancyScope::Attribute {
                version_index: 2,
                attribute: "prompt".to_string()
            }
        );
        assert!(
            report.mismatches.iter().all(|m| matches!(
                m.scope,
                DiscrepancyScope::Attribute { version_index: 2, .. } | DiscrepancyScope::Step { version_index: 2 }
            )),
            "only v2 may be flagged: {:?}",
            report.mismatches
        );
    }

    #[test]
    fn test_every_tampering_is_detected() {
        let proof = record_session().unwrap();
        for tampering in tamperings() {
            let mut copy = proof.clone();
            (tampering.apply)(&mut copy);
            let report = ProofVerifier::new().verify(&copy).unwrap();
            assert!(!report.ok, "undetected: {}", tampering.description);
        }
    }

    #[test]
    fn test_run_scenario() {
        run_scenario().unwrap();
    }
}
