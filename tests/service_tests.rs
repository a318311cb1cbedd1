use faraid::engine::{InheritanceService, Method};
use faraid::forward::SurplusPolicy;
use faraid::fraction::frac;
use faraid::heirs::{FactSet, HeirClass, HeirInstance, Violation};
use faraid::{ConfigManager, EngineConfig, FaraidError};

#[test]
fn test_husband_and_wife_are_rejected() {
    let facts = FactSet::new().with(HeirClass::Husband, 1).with(HeirClass::Wife, 1);
    for method in [Method::ForwardChaining, Method::DempsterShafer, Method::Both] {
        match InheritanceService::default().calculate(&facts, method) {
            Err(FaraidError::InvalidInput(violations)) => {
                assert!(violations.contains(&Violation::HusbandAndWife));
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
    }
}

#[test]
fn test_unknown_and_negative_entries_are_reported_together() {
    let facts = FactSet::from_raw(vec![("son", 1), ("uncle", 1), ("daughter", -1)]);
    let err = InheritanceService::default().calculate(&facts, Method::Both).unwrap_err();
    let violations = err.violations();
    assert!(violations.contains(&Violation::UnsupportedClass { key: "uncle".to_string() }));
    assert!(violations.contains(&Violation::NegativeCount { class: HeirClass::Daughter, count: -1 }));
}

#[test]
fn test_oversized_family_is_rejected_before_computing() {
    let facts = FactSet::new()
        .with(HeirClass::Mother, 1)
        .with(HeirClass::Brother, i64::from(u32::MAX))
        .with(HeirClass::Sister, 1);
    let err = InheritanceService::default().calculate(&facts, Method::Both).unwrap_err();
    assert!(err
        .violations()
        .iter()
        .any(|v| matches!(v, Violation::TooMany { class: HeirClass::Brother, .. })));
}

#[test]
fn test_empty_family_is_rejected() {
    let err = InheritanceService::default().calculate(&FactSet::new(), Method::Both).unwrap_err();
    assert_eq!(err.violations(), &[Violation::Empty]);
}

#[test]
fn test_both_methods_are_compared() {
    let facts = FactSet::new()
        .with(HeirClass::Son, 2)
        .with(HeirClass::Daughter, 1)
        .with(HeirClass::Wife, 1)
        .with(HeirClass::Mother, 1);
    let outcome = InheritanceService::default().calculate(&facts, Method::Both).unwrap();

    let forward = outcome.forward.unwrap();
    assert_eq!(forward.fraction_of(&HeirInstance::single(HeirClass::Wife)), frac(1, 8));
    assert!(forward.explanation().contains("Total rules applied"));

    let evidential = outcome.evidential.unwrap();
    assert!(evidential.analysis().contains("Frame of discernment"));

    let comparison = outcome.comparison.unwrap();
    assert_eq!(comparison.rows.len(), 5);
    assert_eq!(comparison.common_heirs, 5);
    assert!(comparison.agrees());
}

#[test]
fn test_surplus_policy_flows_through_service() {
    let config = EngineConfig {
        surplus: SurplusPolicy::ReturnToSharers,
        ..EngineConfig::default()
    };
    let facts = FactSet::new().with(HeirClass::Daughter, 1);
    let outcome = InheritanceService::new(config).calculate(&facts, Method::Both).unwrap();

    let daughter = HeirInstance::single(HeirClass::Daughter);
    assert_eq!(outcome.forward.unwrap().fraction_of(&daughter), frac(1, 1));
    assert_eq!(outcome.evidential.unwrap().fraction_of(&daughter), Some(frac(1, 1)));
}

#[tokio::test]
async fn test_service_from_saved_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("faraid.json");
    let manager = ConfigManager::new(path);
    manager
        .save(&EngineConfig {
            surplus: SurplusPolicy::ReturnToSharers,
            ..EngineConfig::default()
        })
        .await
        .unwrap();

    let service = InheritanceService::new(manager.load().await.unwrap());
    assert_eq!(service.config().surplus, SurplusPolicy::ReturnToSharers);
    let outcome = service
        .calculate(&FactSet::new().with(HeirClass::Husband, 1), Method::ForwardChaining)
        .unwrap();
    assert_eq!(outcome.forward.unwrap().total_distributed, frac(1, 1));
}
