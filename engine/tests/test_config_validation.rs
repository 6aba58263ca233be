//! Configuration Validation Tests
//!
//! Every fatal configuration problem must be rejected when the process is
//! built, before any call is accepted.

use std::collections::BTreeMap;
use stochastic_translation_rs::{
    generate_template, ConfigError, NetworkError, Template, Terminator, TranscriptAffinity,
    TranscriptKey, Translation, TranslationConfig,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn key(operon: &str, gene: &str) -> TranscriptKey {
    TranscriptKey::new(operon, gene)
}

/// Two transcripts on one operon over a two-letter alphabet
fn small_config() -> TranslationConfig {
    let a = key("oAB", "eA");
    let b = key("oAB", "eB");
    TranslationConfig {
        sequences: BTreeMap::from([(a.clone(), "AGAG".to_string()), (b.clone(), "GGA".to_string())]),
        templates: BTreeMap::from([
            (a.clone(), generate_template(a.clone(), 4, &["eA"])),
            (b.clone(), generate_template(b.clone(), 3, &["eB"])),
        ]),
        transcript_affinities: vec![TranscriptAffinity::new(a, 1.0), TranscriptAffinity::new(b, 5.0)],
        transcript_order: None,
        elongation_rate: 5.0,
        polymerase_occlusion: 2,
        symbol_to_monomer: BTreeMap::from([
            ('A', "Alanine".to_string()),
            ('G', "Glycine".to_string()),
        ]),
        monomer_ids: vec!["Alanine".to_string(), "Glycine".to_string()],
        concentration_keys: Vec::new(),
        time_step: 1.0,
        rng_seed: 1,
    }
}

fn rejected(config: TranslationConfig) -> ConfigError {
    Translation::new(config).unwrap_err()
}

// ============================================================================
// Accepted
// ============================================================================

#[test]
fn test_default_and_small_configs_build() {
    assert!(Translation::new(TranslationConfig::default()).is_ok());
    assert!(Translation::new(small_config()).is_ok());
    assert!(small_config().check().is_ok());
}

#[test]
fn test_zero_affinity_is_allowed() {
    let mut config = small_config();
    config.transcript_affinities[0].affinity = 0.0;
    assert!(Translation::new(config).is_ok());
}

#[test]
fn test_default_process_exposes_protein_ids() {
    let process = Translation::new(TranslationConfig::default()).unwrap();
    assert_eq!(process.protein_ids(), ["eA", "eB", "eY", "eZ"]);
    assert_eq!(process.transcript_order().len(), 6);
    assert_eq!(process.time_step(), 1.0);
}

// ============================================================================
// Rates
// ============================================================================

#[test]
fn test_non_positive_elongation_rate_rejected() {
    for rate in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let mut config = small_config();
        config.elongation_rate = rate;
        assert!(matches!(
            rejected(config),
            ConfigError::InvalidElongationRate(_)
        ));
    }
}

#[test]
fn test_negative_time_step_rejected() {
    let mut config = small_config();
    config.time_step = -1.0;
    assert_eq!(rejected(config), ConfigError::InvalidTimeStep(-1.0));
}

#[test]
fn test_negative_affinity_rejected() {
    let mut config = small_config();
    config.transcript_affinities[1].affinity = -0.5;
    assert!(matches!(
        rejected(config),
        ConfigError::Affinity(NetworkError::InvalidAffinity { .. })
    ));
}

// ============================================================================
// Key sets and ordering
// ============================================================================

#[test]
fn test_empty_transcript_list_rejected() {
    let config = TranslationConfig {
        sequences: BTreeMap::new(),
        templates: BTreeMap::new(),
        transcript_affinities: Vec::new(),
        ..small_config()
    };
    assert_eq!(rejected(config), ConfigError::NoTranscripts);
}

#[test]
fn test_duplicate_transcript_rejected() {
    let mut config = small_config();
    config
        .transcript_affinities
        .push(TranscriptAffinity::new(key("oAB", "eA"), 2.0));
    assert_eq!(
        rejected(config),
        ConfigError::DuplicateTranscript(key("oAB", "eA"))
    );
}

#[test]
fn test_malformed_key_rejected() {
    let mut config = small_config();
    config.transcript_affinities[0].transcript = key("", "eA");
    assert!(matches!(rejected(config), ConfigError::MalformedKey(_)));
}

#[test]
fn test_affinity_without_sequence_rejected() {
    let mut config = small_config();
    config.sequences.remove(&key("oAB", "eB"));
    assert_eq!(
        rejected(config),
        ConfigError::MissingSequence(key("oAB", "eB"))
    );
}

#[test]
fn test_affinity_without_template_rejected() {
    let mut config = small_config();
    config.templates.remove(&key("oAB", "eA"));
    assert_eq!(
        rejected(config),
        ConfigError::MissingTemplate(key("oAB", "eA"))
    );
}

#[test]
fn test_sequence_without_affinity_rejected() {
    let mut config = small_config();
    config.sequences.insert(key("oC", "eC"), "AAA".to_string());
    assert_eq!(
        rejected(config),
        ConfigError::UnexpectedSequence(key("oC", "eC"))
    );
}

#[test]
fn test_template_without_affinity_rejected() {
    let mut config = small_config();
    config
        .templates
        .insert(key("oC", "eC"), generate_template(key("oC", "eC"), 3, &["eC"]));
    assert_eq!(
        rejected(config),
        ConfigError::UnexpectedTemplate(key("oC", "eC"))
    );
}

#[test]
fn test_order_must_be_permutation() {
    let mut missing = small_config();
    missing.transcript_order = Some(vec![key("oAB", "eA")]);
    assert_eq!(rejected(missing), ConfigError::OrderMismatch);

    let mut repeated = small_config();
    repeated.transcript_order = Some(vec![key("oAB", "eA"), key("oAB", "eA")]);
    assert_eq!(rejected(repeated), ConfigError::OrderMismatch);

    let mut foreign = small_config();
    foreign.transcript_order = Some(vec![key("oAB", "eA"), key("oC", "eC")]);
    assert_eq!(rejected(foreign), ConfigError::OrderMismatch);

    let mut permuted = small_config();
    permuted.transcript_order = Some(vec![key("oAB", "eB"), key("oAB", "eA")]);
    let process = Translation::new(permuted).unwrap();
    assert_eq!(process.transcript_order()[0], key("oAB", "eB"));
}

// ============================================================================
// Alphabet and templates
// ============================================================================

#[test]
fn test_unknown_symbol_rejected() {
    let mut config = small_config();
    config.sequences.insert(key("oAB", "eA"), "AGXG".to_string());
    assert_eq!(
        rejected(config),
        ConfigError::UnknownSymbol {
            key: key("oAB", "eA"),
            symbol: 'X'
        }
    );
}

#[test]
fn test_alphabet_monomer_must_be_tracked() {
    let mut config = small_config();
    config.monomer_ids = vec!["Alanine".to_string()];
    assert!(matches!(
        rejected(config),
        ConfigError::UnknownMonomer { symbol: 'G', .. }
    ));
}

#[test]
fn test_duplicate_monomer_rejected() {
    let mut config = small_config();
    config.monomer_ids.push("Alanine".to_string());
    assert_eq!(
        rejected(config),
        ConfigError::DuplicateMonomer("Alanine".to_string())
    );
}

#[test]
fn test_template_label_must_match_key() {
    let mut config = small_config();
    config.templates.insert(
        key("oAB", "eA"),
        generate_template(key("oAB", "eB"), 4, &["eA"]),
    );
    assert!(matches!(
        rejected(config),
        ConfigError::TemplateIdMismatch { .. }
    ));
}

#[test]
fn test_bad_terminators_rejected() {
    let a = key("oAB", "eA");
    let with_terminators = |terminators: Vec<Terminator>| {
        let mut config = small_config();
        config.templates.insert(
            a.clone(),
            Template {
                id: a.clone(),
                terminators,
            },
        );
        config
    };
    let stop = |position: usize, strength: f64| Terminator {
        position,
        strength,
        products: vec!["eA".to_string()],
    };

    assert_eq!(
        rejected(with_terminators(Vec::new())),
        ConfigError::NoTerminators(a.clone())
    );
    assert!(matches!(
        rejected(with_terminators(vec![stop(0, 1.0)])),
        ConfigError::TerminatorPosition { position: 0, .. }
    ));
    assert!(matches!(
        rejected(with_terminators(vec![stop(5, 1.0)])),
        ConfigError::TerminatorPosition { position: 5, length: 4, .. }
    ));
    assert!(matches!(
        rejected(with_terminators(vec![stop(3, 1.0), stop(2, 1.0)])),
        ConfigError::TerminatorPosition { position: 2, .. }
    ));
    assert!(matches!(
        rejected(with_terminators(vec![stop(2, -1.0), stop(4, 1.0)])),
        ConfigError::TerminatorStrength { .. }
    ));
    assert!(Translation::new(with_terminators(vec![stop(2, 1.0), stop(4, 1.0)])).is_ok());
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_json_config_round_trip() {
    let config = small_config();
    let json = serde_json::to_string(&config).unwrap();

    assert!(json.contains("\"oAB:eA\""));
    assert_eq!(TranslationConfig::from_json(&json).unwrap(), config);
}

#[test]
fn test_json_unknown_field_rejected() {
    let err = TranslationConfig::from_json(r#"{"elongation_rate": 5.0, "speed": 1}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_json_malformed_key_rejected() {
    let err = TranslationConfig::from_json(
        r#"{"transcript_affinities": [{"transcript": "no-separator", "affinity": 1.0}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
