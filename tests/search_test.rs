use std::collections::BTreeSet;

use serde::Serialize;

use lumen::{DocId, Engine, EngineConfig, Record, SearchOptions};

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Icd {
    code: String,
    desc: String,
}

fn icd(code: &str, desc: &str) -> Icd {
    Icd {
        code: code.into(),
        desc: desc.into(),
    }
}

fn ids<T>(records: &[Record<T>]) -> Vec<DocId> {
    records.iter().map(|r| r.id).collect()
}

#[test]
fn test_icd_scenario() -> lumen::Result<()> {
    let engine = Engine::new(EngineConfig::default())?;
    let diabetes = engine.insert(icd(
        "O24410",
        "Gestational diabetes mellitus in pregnancy, diet controlled",
    ))?;
    let cholera = engine.insert(icd("A000", "Cholera due to Vibrio cholerae"))?;

    let found = engine.search("diabetes pregnancy", &SearchOptions::exact(20));
    assert_eq!(ids(&found), vec![diabetes.id]);
    assert_eq!(found[0].payload.code, "O24410");

    let found = engine.search("cholera", &SearchOptions::exact(20));
    assert_eq!(ids(&found), vec![cholera.id]);

    assert!(engine.search("zzz", &SearchOptions::exact(20)).is_empty());
    Ok(())
}

#[test]
fn test_exact_excludes_partial_matches() -> lumen::Result<()> {
    let engine = Engine::new(EngineConfig::default())?;
    let both = engine.insert(icd("X1", "alpha beta"))?;
    engine.insert(icd("X2", "alpha only"))?;

    assert_eq!(ids(&engine.exact_match("a b alpha beta", 0)), Vec::<DocId>::new());
    assert_eq!(ids(&engine.exact_match("Alpha, BETA!", 0)), vec![both.id]);
    Ok(())
}

#[test]
fn test_any_mode_is_superset_of_exact_mode() -> lumen::Result<()> {
    let engine = Engine::new(EngineConfig::default())?;
    let corpus = [
        "acute bronchitis due to streptococcus",
        "acute pharyngitis",
        "chronic bronchitis",
        "streptococcal sepsis",
        "acute kidney failure",
        "bronchitis not specified as acute or chronic",
    ];
    for (i, desc) in corpus.iter().enumerate() {
        engine.insert(icd(&format!("J{i}"), desc))?;
    }

    for query in ["acute bronchitis", "chronic", "acute failure kidney", "sepsis acute"] {
        let exact: BTreeSet<DocId> =
            ids(&engine.search(query, &SearchOptions::exact(0))).into_iter().collect();
        let any: BTreeSet<DocId> =
            ids(&engine.search(query, &SearchOptions::any(0))).into_iter().collect();
        assert!(exact.is_subset(&any), "{query}: {exact:?} not within {any:?}");
    }
    Ok(())
}

#[test]
fn test_results_are_deterministic_and_limited() -> lumen::Result<()> {
    let engine = Engine::new(EngineConfig::default())?;
    for i in 0..30 {
        engine.insert(icd(&format!("R{i}"), "recurring symptom"))?;
    }

    let first = ids(&engine.search_default("symptom"));
    let second = ids(&engine.search_default("symptom"));
    assert_eq!(first.len(), 20);
    assert_eq!(first, second);
    assert!(first.is_sorted());

    assert_eq!(engine.search("symptom", &SearchOptions::exact(0)).len(), 30);
    assert_eq!(engine.search("symptom", &SearchOptions::exact(3)).len(), 3);
    Ok(())
}

#[test]
fn test_queries_without_tokens_match_nothing() -> lumen::Result<()> {
    let engine = Engine::new(EngineConfig::default())?;
    engine.insert(icd("A000", "Cholera"))?;

    assert!(engine.search("", &SearchOptions::any(0)).is_empty());
    assert!(engine.search("?!...", &SearchOptions::any(0)).is_empty());
    assert!(engine.search("the and of", &SearchOptions::any(0)).is_empty());
    Ok(())
}

#[test]
fn test_allow_list_config_limits_searchable_fields() -> lumen::Result<()> {
    let config = EngineConfig::from_json(r#"{"index_fields": ["desc"]}"#)?;
    let engine = Engine::new(config)?;
    engine.insert(icd("A000", "Cholera"))?;

    assert_eq!(engine.exact_match("cholera", 0).len(), 1);
    assert!(engine.exact_match("a000", 0).is_empty());
    Ok(())
}

#[test]
fn test_custom_stop_words() -> lumen::Result<()> {
    let config = EngineConfig::builder().stop_words(["cholera"]).build();
    let engine = Engine::new(config)?;
    engine.insert(icd("A000", "Cholera and the vibrio"))?;

    assert!(engine.exact_match("cholera", 0).is_empty());
    assert_eq!(engine.exact_match("the", 0).len(), 1);
    Ok(())
}
